//! Player statistics, stored in their own database

use sea_orm::sea_query::OnConflict;

use crate::{
  entity::stat,
  prelude::*,
  sync::reconcile::{self, BATCH},
};

pub struct Stats<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Stats<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Upserts the flattened stats of one player. Keys the remote stops
  /// reporting are kept.
  pub async fn record(&self, player: &str, stats: &json::Value) -> Result<u64> {
    let models: Vec<_> = reconcile::flatten_stats(stats)
      .into_iter()
      .map(|flat| stat::ActiveModel {
        player_uuid: Set(player.to_string()),
        category: Set(flat.category),
        stat_key: Set(flat.key),
        stat_value: Set(flat.value),
      })
      .collect();

    let txn = self.db.begin().await?;
    for chunk in models.chunks(BATCH) {
      stat::Entity::insert_many(chunk.to_vec())
        .on_conflict(
          OnConflict::columns([
            stat::Column::PlayerUuid,
            stat::Column::Category,
            stat::Column::StatKey,
          ])
          .update_column(stat::Column::StatValue)
          .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
    }
    txn.commit().await?;

    Ok(models.len() as u64)
  }

  /// Highest values of one stat, best first.
  pub async fn leaderboard(
    &self,
    category: &str,
    key: &str,
    limit: u64,
  ) -> Result<Vec<(String, i64)>> {
    let rows = stat::Entity::find()
      .select_only()
      .column(stat::Column::PlayerUuid)
      .column(stat::Column::StatValue)
      .filter(stat::Column::Category.eq(category))
      .filter(stat::Column::StatKey.eq(key))
      .order_by_desc(stat::Column::StatValue)
      .limit(limit)
      .into_tuple()
      .all(self.db)
      .await?;
    Ok(rows)
  }

  /// Every player's value of one stat.
  pub async fn values(
    &self,
    category: &str,
    key: &str,
  ) -> Result<HashMap<String, i64>> {
    let rows: Vec<(String, i64)> = stat::Entity::find()
      .select_only()
      .column(stat::Column::PlayerUuid)
      .column(stat::Column::StatValue)
      .filter(stat::Column::Category.eq(category))
      .filter(stat::Column::StatKey.eq(key))
      .into_tuple()
      .all(self.db)
      .await?;
    Ok(rows.into_iter().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test::stats_db;

  #[tokio::test]
  async fn nested_stats_are_flattened_and_upserted() {
    let db = stats_db().await;
    let sv = Stats::new(&db);

    sv.record(
      "p1",
      &json::json!({
        "general": { "DEATHS": 3 },
        "mob": { "KILL_ENTITY": { "FROG": 2 } },
      }),
    )
    .await
    .unwrap();

    let rows: Vec<_> = stat::Entity::find()
      .filter(stat::Column::PlayerUuid.eq("p1"))
      .order_by_asc(stat::Column::StatKey)
      .all(&db)
      .await
      .unwrap()
      .into_iter()
      .map(|s| (s.category, s.stat_key, s.stat_value))
      .collect();
    assert_eq!(
      rows,
      vec![
        ("general".to_string(), "DEATHS".to_string(), 3),
        ("mob".to_string(), "KILL_ENTITY:FROG".to_string(), 2),
      ]
    );
  }

  #[tokio::test]
  async fn stale_keys_persist_and_values_overwrite() {
    let db = stats_db().await;
    let sv = Stats::new(&db);

    sv.record("p1", &json::json!({ "general": { "DEATHS": 3, "JUMP": 9 } }))
      .await
      .unwrap();
    sv.record("p1", &json::json!({ "general": { "DEATHS": 4 } }))
      .await
      .unwrap();

    let values = sv.values("general", "DEATHS").await.unwrap();
    assert_eq!(values["p1"], 4);
    assert_eq!(sv.values("general", "JUMP").await.unwrap()["p1"], 9);
  }

  #[tokio::test]
  async fn leaderboard_is_sorted_and_limited() {
    let db = stats_db().await;
    let sv = Stats::new(&db);

    for (player, deaths) in [("p1", 5), ("p2", 12), ("p3", 1)] {
      sv.record(player, &json::json!({ "general": { "DEATHS": deaths } }))
        .await
        .unwrap();
    }

    let top = sv.leaderboard("general", "DEATHS", 2).await.unwrap();
    assert_eq!(top, vec![("p2".to_string(), 12), ("p1".to_string(), 5)]);
  }
}
