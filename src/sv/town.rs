use sea_orm::sea_query::OnConflict;

use crate::{
  entity::town,
  prelude::*,
  sync::reconcile::{self, BATCH, Changes},
  tapi::model::TownData,
};

pub struct Towns<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Towns<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Makes the stored towns match the snapshot exactly: towns gone upstream
  /// are deleted, every other town is overwritten.
  pub async fn reconcile(
    &self,
    snapshot: &BTreeMap<String, TownData>,
  ) -> Result<Changes> {
    let txn = self.db.begin().await?;

    let stored = self.ids(&txn).await?;

    let mut removed = 0;
    for chunk in reconcile::vanished(stored, snapshot).chunks(BATCH) {
      removed += town::Entity::delete_many()
        .filter(town::Column::Uuid.is_in(chunk.iter().cloned()))
        .exec(&txn)
        .await?
        .rows_affected;
    }
    if removed > 0 {
      info!("Removed {removed} towns no longer present in the API");
    }

    let models: Vec<_> = snapshot
      .iter()
      .map(|(uuid, data)| town::ActiveModel {
        uuid: Set(uuid.clone()),
        name: Set(data.name.clone()),
        mayor: Set(data.mayor.clone()),
        founder: Set(data.founder.clone()),
        balance: Set(data.balance),
        nation: Set(data.nation.clone()),
        nation_name: Set(data.nation_name.clone()),
        founded: Set(data.founded),
        resident_tax_percent: Set(data.resident_tax),
        is_active: Set(data.is_active),
        claimed_chunks: Set(data.claimed_chunks),
        color_hex: Set(data.color_hex.clone()),
        tag: Set(data.tag.clone()),
        board: Set(data.board.clone()),
        spawn_loc_x: Set(data.spawn_loc_x),
        spawn_loc_z: Set(data.spawn_loc_z),
        spawn_loc_y: Set(data.spawn_loc_y),
      })
      .collect();

    for chunk in models.chunks(BATCH) {
      town::Entity::insert_many(chunk.to_vec())
        .on_conflict(upsert())
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(Changes { written: models.len() as u64, removed })
  }

  pub async fn all(&self) -> Result<Vec<town::Model>> {
    let towns =
      town::Entity::find().order_by_asc(town::Column::Name).all(self.db).await?;
    Ok(towns)
  }

  pub async fn ids(&self, conn: &impl ConnectionTrait) -> Result<Vec<String>> {
    let ids = town::Entity::find()
      .select_only()
      .column(town::Column::Uuid)
      .order_by_asc(town::Column::Uuid)
      .into_tuple()
      .all(conn)
      .await?;
    Ok(ids)
  }
}

fn upsert() -> OnConflict {
  use town::Column::*;

  OnConflict::column(Uuid)
    .update_columns([
      Name,
      Mayor,
      Founder,
      Balance,
      Nation,
      NationName,
      Founded,
      ResidentTaxPercent,
      IsActive,
      ClaimedChunks,
      ColorHex,
      Tag,
      Board,
      SpawnLocX,
      SpawnLocZ,
      SpawnLocY,
    ])
    .to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test::live_db;

  fn snapshot(towns: &[(&str, &str, f64)]) -> BTreeMap<String, TownData> {
    towns
      .iter()
      .map(|&(uuid, name, balance)| {
        (uuid.to_string(), TownData {
          name: name.into(),
          balance,
          ..TownData::default()
        })
      })
      .collect()
  }

  #[tokio::test]
  async fn store_matches_snapshot_exactly() {
    let db = live_db().await;
    let sv = Towns::new(&db);

    sv.reconcile(&snapshot(&[("A", "a", 1.0), ("B", "b", 1.0), ("C", "c", 1.0)]))
      .await
      .unwrap();

    let changes = sv
      .reconcile(&snapshot(&[("B", "b2", 7.5), ("D", "d", 0.0)]))
      .await
      .unwrap();
    assert_eq!(changes, Changes { written: 2, removed: 2 });

    assert_eq!(sv.ids(&db).await.unwrap(), vec!["B", "D"]);

    let b = town::Entity::find_by_id("B").one(&db).await.unwrap().unwrap();
    assert_eq!(b.name, "b2");
    assert_eq!(b.balance, 7.5);
  }

  #[tokio::test]
  async fn same_snapshot_twice_is_idempotent() {
    let db = live_db().await;
    let sv = Towns::new(&db);
    let towns = snapshot(&[("A", "a", 1.0), ("B", "b", 2.0)]);

    sv.reconcile(&towns).await.unwrap();
    let first = sv.all().await.unwrap();
    let changes = sv.reconcile(&towns).await.unwrap();

    assert_eq!(changes.removed, 0);
    assert_eq!(sv.all().await.unwrap(), first);
  }

  #[tokio::test]
  async fn empty_snapshot_purges_everything() {
    let db = live_db().await;
    let sv = Towns::new(&db);

    sv.reconcile(&snapshot(&[("A", "a", 1.0)])).await.unwrap();
    sv.reconcile(&BTreeMap::new()).await.unwrap();

    assert!(sv.ids(&db).await.unwrap().is_empty());
  }
}
