use sea_orm::{ActiveValue::NotSet, sea_query::Expr};

use super::Page;
use crate::{
  entity::chat,
  prelude::*,
  sync::reconcile::{self, BATCH, Changes},
  tapi::model::ChatEntry,
};

/// Rows per chat page of the read API.
pub const PAGE_SIZE: u64 = 200;

pub struct Chat<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Chat<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Timestamp of the newest stored message, `0` for an empty log.
  pub async fn cursor(&self, conn: &impl ConnectionTrait) -> Result<i64> {
    let max: Option<Option<i64>> = chat::Entity::find()
      .select_only()
      .column_as(Expr::col(chat::Column::Timestamp).max(), "max")
      .into_tuple()
      .one(conn)
      .await?;
    Ok(max.flatten().unwrap_or(0))
  }

  /// Appends messages newer than the stored ones, the remote resends its
  /// recent history on every poll.
  pub async fn append(&self, entries: &[ChatEntry]) -> Result<Changes> {
    let txn = self.db.begin().await?;
    let cursor = self.cursor(&txn).await?;

    let models: Vec<_> = reconcile::fresh(cursor, entries)
      .filter(|entry| !entry.is_protocol_noise())
      .map(|entry| chat::ActiveModel {
        id: NotSet,
        sender: Set(entry.sender.clone()),
        sender_uuid: Set(entry.sender_uuid.clone()),
        message: Set(entry.message.clone()),
        timestamp: Set(entry.timestamp),
        kind: Set(entry.kind.clone()),
      })
      .collect();

    for chunk in models.chunks(BATCH) {
      chat::Entity::insert_many(chunk.to_vec())
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(Changes { written: models.len() as u64, removed: 0 })
  }

  /// Up to [`PAGE_SIZE`] messages in ascending id order.
  pub async fn page(&self, page: Page) -> Result<Vec<chat::Model>> {
    let query = chat::Entity::find().limit(PAGE_SIZE);

    let mut messages = match page {
      Page::Latest => query.order_by_desc(chat::Column::Id).all(self.db).await?,
      Page::Before(id) => {
        query
          .filter(chat::Column::Id.lt(id))
          .order_by_desc(chat::Column::Id)
          .all(self.db)
          .await?
      }
      Page::After(id) => {
        return Ok(
          query
            .filter(chat::Column::Id.gt(id))
            .order_by_asc(chat::Column::Id)
            .all(self.db)
            .await?,
        );
      }
    };

    messages.reverse();
    Ok(messages)
  }

  pub async fn count(&self) -> Result<u64> {
    Ok(chat::Entity::find().count(self.db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test::live_db;

  fn said(message: &str, timestamp: i64) -> ChatEntry {
    ChatEntry {
      sender: Some("Alice".into()),
      sender_uuid: Some("p1".into()),
      message: message.into(),
      timestamp,
      kind: Some("chat".into()),
    }
  }

  #[tokio::test]
  async fn resent_history_is_not_duplicated() {
    let db = live_db().await;
    let sv = Chat::new(&db);

    let batch = [said("a", 100), said("b", 200)];
    assert_eq!(sv.append(&batch).await.unwrap().written, 2);
    assert_eq!(sv.append(&batch).await.unwrap().written, 0);

    let batch = [said("a", 100), said("b", 200), said("c", 300)];
    assert_eq!(sv.append(&batch).await.unwrap().written, 1);
    assert_eq!(sv.count().await.unwrap(), 3);
    assert_eq!(sv.cursor(&db).await.unwrap(), 300);
  }

  #[tokio::test]
  async fn entries_at_or_before_cursor_are_dropped() {
    let db = live_db().await;
    let sv = Chat::new(&db);

    sv.append(&[said("first", 500)]).await.unwrap();
    let changes =
      sv.append(&[said("late", 400), said("same ms", 500)]).await.unwrap();

    assert_eq!(changes.written, 0);
    assert_eq!(sv.count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn playerlist_sentinel_is_never_stored() {
    let db = live_db().await;
    let sv = Chat::new(&db);

    let changes = sv
      .append(&[said("PlayerList", 100), said("playerlist", 200), said("hi", 300)])
      .await
      .unwrap();

    assert_eq!(changes.written, 1);
    let stored = sv.page(Page::Latest).await.unwrap();
    assert_eq!(stored[0].message, "hi");
  }

  #[tokio::test]
  async fn pages_are_ascending() {
    let db = live_db().await;
    let sv = Chat::new(&db);

    let batch: Vec<_> = (1..=250).map(|ts| said("m", ts)).collect();
    sv.append(&batch).await.unwrap();

    let latest = sv.page(Page::Latest).await.unwrap();
    assert_eq!(latest.len(), PAGE_SIZE as usize);
    assert_eq!(latest.first().unwrap().id, 51);
    assert_eq!(latest.last().unwrap().id, 250);

    let older = sv.page(Page::Before(51)).await.unwrap();
    assert_eq!(older.len(), 50);
    assert_eq!(older.last().unwrap().id, 50);

    let newer = sv.page(Page::After(240)).await.unwrap();
    let ids: Vec<_> = newer.iter().map(|m| m.id).collect();
    assert_eq!(ids, (241..=250).collect::<Vec<_>>());
  }
}
