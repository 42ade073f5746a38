use sea_orm::{ActiveValue::NotSet, sea_query::Expr};

use super::Page;
use crate::{
  entity::kill,
  prelude::*,
  sync::reconcile::{self, BATCH, Changes},
  tapi::model::KillEntry,
};

pub const PAGE_SIZE: u64 = 200;

pub struct Kills<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Kills<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn cursor(&self, conn: &impl ConnectionTrait) -> Result<i64> {
    let max: Option<Option<i64>> = kill::Entity::find()
      .select_only()
      .column_as(Expr::col(kill::Column::Timestamp).max(), "max")
      .into_tuple()
      .one(conn)
      .await?;
    Ok(max.flatten().unwrap_or(0))
  }

  pub async fn append(&self, entries: &[KillEntry]) -> Result<Changes> {
    let txn = self.db.begin().await?;
    let cursor = self.cursor(&txn).await?;

    let models: Vec<_> = reconcile::fresh(cursor, entries)
      .map(|entry| kill::ActiveModel {
        id: NotSet,
        killer_uuid: Set(entry.killer_uuid.clone()),
        killer_name: Set(entry.killer_name.clone()),
        victim_uuid: Set(entry.victim_uuid.clone()),
        victim_name: Set(entry.victim_name.clone()),
        death_message: Set(entry.death_message.clone()),
        weapon_json: Set(entry.weapon.as_ref().map(|w| w.to_string())),
        timestamp: Set(entry.timestamp),
      })
      .collect();

    for chunk in models.chunks(BATCH) {
      kill::Entity::insert_many(chunk.to_vec())
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(Changes { written: models.len() as u64, removed: 0 })
  }

  pub async fn page(&self, page: Page) -> Result<Vec<kill::Model>> {
    let query = kill::Entity::find().limit(PAGE_SIZE);

    let mut kills = match page {
      Page::Latest => query.order_by_desc(kill::Column::Id).all(self.db).await?,
      Page::Before(id) => {
        query
          .filter(kill::Column::Id.lt(id))
          .order_by_desc(kill::Column::Id)
          .all(self.db)
          .await?
      }
      Page::After(id) => {
        return Ok(
          query
            .filter(kill::Column::Id.gt(id))
            .order_by_asc(kill::Column::Id)
            .all(self.db)
            .await?,
        );
      }
    };

    kills.reverse();
    Ok(kills)
  }

  pub async fn count(&self) -> Result<u64> {
    Ok(kill::Entity::find().count(self.db).await?)
  }

  /// Number of distinct values logged in `column`.
  pub async fn distinct(&self, column: kill::Column) -> Result<u64> {
    let count = kill::Entity::find()
      .select_only()
      .column(column)
      .distinct()
      .count(self.db)
      .await?;
    Ok(count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test::live_db;

  fn kill(timestamp: i64) -> KillEntry {
    KillEntry {
      killer_uuid: "p1".into(),
      killer_name: "Alice".into(),
      victim_uuid: "p2".into(),
      victim_name: "Bob".into(),
      death_message: Some("Bob was slain by Alice".into()),
      weapon: Some(json::json!({ "type": "DIAMOND_SWORD" })),
      timestamp,
    }
  }

  #[tokio::test]
  async fn only_newer_kills_are_appended() {
    let db = live_db().await;
    let sv = Kills::new(&db);

    assert_eq!(sv.append(&[kill(10), kill(20)]).await.unwrap().written, 2);
    assert_eq!(sv.append(&[kill(10), kill(20)]).await.unwrap().written, 0);
    assert_eq!(sv.append(&[kill(20), kill(30)]).await.unwrap().written, 1);

    let stored = sv.page(Page::Latest).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(
      stored[0].weapon_json.as_deref(),
      Some(r#"{"type":"DIAMOND_SWORD"}"#)
    );
  }

  #[tokio::test]
  async fn counts_distinct_participants() {
    let db = live_db().await;
    let sv = Kills::new(&db);

    let mut revenge = kill(30);
    revenge.killer_uuid = "p2".into();
    revenge.victim_uuid = "p1".into();
    sv.append(&[kill(10), kill(20), revenge]).await.unwrap();

    assert_eq!(sv.distinct(kill::Column::KillerUuid).await.unwrap(), 2);
    assert_eq!(sv.distinct(kill::Column::VictimUuid).await.unwrap(), 2);
    assert_eq!(sv.count().await.unwrap(), 3);
  }
}
