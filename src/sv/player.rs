use sea_orm::sea_query::{Expr, OnConflict};

use crate::{
  entity::player,
  prelude::*,
  sync::reconcile::{BATCH, Changes},
  tapi::model::PlayerData,
};

pub struct Players<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Players<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Upserts every online player and zeroes the session of everyone else.
  ///
  /// `afk_duration` of absent players is kept as is. Players are never
  /// removed.
  pub async fn reconcile(
    &self,
    online: &BTreeMap<String, PlayerData>,
    seen_at: i64,
  ) -> Result<Changes> {
    let txn = self.db.begin().await?;

    let models: Vec<_> = online
      .iter()
      .map(|(uuid, data)| player::ActiveModel {
        uuid: Set(uuid.clone()),
        name: Set(data.name.clone()),
        online_duration: Set(data.online_duration.max(0)),
        afk_duration: Set(data.afk_duration.max(0)),
        balance: Set(data.balance),
        title: Set(data.title.clone()),
        town: Set(data.town.clone()),
        town_name: Set(data.town_name.clone()),
        nation: Set(data.nation.clone()),
        nation_name: Set(data.nation_name.clone()),
        bio: Set(data.bio.clone()),
        first_joined: Set(data.first_joined),
        last_online: Set(Some(seen_at)),
      })
      .collect();

    for chunk in models.chunks(BATCH) {
      player::Entity::insert_many(chunk.to_vec())
        .on_conflict(upsert())
        .exec_without_returning(&txn)
        .await?;
    }

    let mut offline = player::Entity::update_many()
      .col_expr(player::Column::OnlineDuration, Expr::value(0i64))
      .filter(player::Column::OnlineDuration.ne(0i64));
    if !online.is_empty() {
      offline =
        offline.filter(player::Column::Uuid.is_not_in(online.keys().cloned()));
    }
    let reset = offline.exec(&txn).await?.rows_affected;

    txn.commit().await?;

    debug!("Upserted {} players, reset {reset} sessions", models.len());
    Ok(Changes { written: models.len() as u64, removed: 0 })
  }

  pub async fn by_id(&self, uuid: &str) -> Result<Option<player::Model>> {
    Ok(player::Entity::find_by_id(uuid).one(self.db).await?)
  }

  pub async fn all(&self) -> Result<Vec<player::Model>> {
    Ok(player::Entity::find().all(self.db).await?)
  }

  pub async fn ids(&self) -> Result<Vec<String>> {
    let ids = player::Entity::find()
      .select_only()
      .column(player::Column::Uuid)
      .into_tuple()
      .all(self.db)
      .await?;
    Ok(ids)
  }

  /// `uuid -> name` for the given players, unknown ids are left out.
  pub async fn names(
    &self,
    uuids: impl IntoIterator<Item = String>,
  ) -> Result<HashMap<String, String>> {
    let rows: Vec<(String, String)> = player::Entity::find()
      .select_only()
      .column(player::Column::Uuid)
      .column(player::Column::Name)
      .filter(player::Column::Uuid.is_in(uuids))
      .into_tuple()
      .all(self.db)
      .await?;
    Ok(rows.into_iter().collect())
  }

  pub async fn count(&self) -> Result<u64> {
    Ok(player::Entity::find().count(self.db).await?)
  }

  pub async fn count_online(&self) -> Result<u64> {
    let count = player::Entity::find()
      .filter(player::Column::OnlineDuration.gt(0i64))
      .count(self.db)
      .await?;
    Ok(count)
  }

  pub async fn count_seen_since(&self, since: i64) -> Result<u64> {
    let count = player::Entity::find()
      .filter(player::Column::LastOnline.gte(since))
      .count(self.db)
      .await?;
    Ok(count)
  }
}

fn upsert() -> OnConflict {
  use player::Column::*;

  OnConflict::column(Uuid)
    .update_columns([
      Name,
      OnlineDuration,
      AfkDuration,
      Balance,
      Title,
      Town,
      TownName,
      Nation,
      NationName,
      Bio,
      FirstJoined,
    ])
    // `last_online` only moves forward
    .value(
      LastOnline,
      Expr::cust(
        r#"MAX(COALESCE("players"."last_online", 0), "excluded"."last_online")"#,
      ),
    )
    .to_owned()
}
