use sea_orm::sea_query::OnConflict;

use crate::{
  entity::nation,
  prelude::*,
  sync::reconcile::{self, BATCH, Changes},
  tapi::model::NationData,
};

pub struct Nations<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Nations<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Same shape as the town reconcile, over the `nations` table.
  pub async fn reconcile(
    &self,
    snapshot: &BTreeMap<String, NationData>,
  ) -> Result<Changes> {
    let txn = self.db.begin().await?;

    let stored: Vec<String> = nation::Entity::find()
      .select_only()
      .column(nation::Column::Uuid)
      .into_tuple()
      .all(&txn)
      .await?;

    let mut removed = 0;
    for chunk in reconcile::vanished(stored, snapshot).chunks(BATCH) {
      removed += nation::Entity::delete_many()
        .filter(nation::Column::Uuid.is_in(chunk.iter().cloned()))
        .exec(&txn)
        .await?
        .rows_affected;
    }
    if removed > 0 {
      info!("Removed {removed} nations no longer present in the API");
    }

    let models: Vec<_> = snapshot
      .iter()
      .map(|(uuid, data)| nation::ActiveModel {
        uuid: Set(uuid.clone()),
        name: Set(data.name.clone()),
        leader: Set(data.leader.clone()),
        capitol_town: Set(data.capitol_town.clone()),
        capitol_town_name: Set(data.capitol_town_name.clone()),
        balance: Set(data.balance),
        town_tax_dollars: Set(data.town_tax_dollars),
        founded: Set(data.founded),
        color_hex: Set(data.color_hex.clone()),
        tag: Set(data.tag.clone()),
        board: Set(data.board.clone()),
      })
      .collect();

    for chunk in models.chunks(BATCH) {
      nation::Entity::insert_many(chunk.to_vec())
        .on_conflict(
          OnConflict::column(nation::Column::Uuid)
            .update_columns([
              nation::Column::Name,
              nation::Column::Leader,
              nation::Column::CapitolTown,
              nation::Column::CapitolTownName,
              nation::Column::Balance,
              nation::Column::TownTaxDollars,
              nation::Column::Founded,
              nation::Column::ColorHex,
              nation::Column::Tag,
              nation::Column::Board,
            ])
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(Changes { written: models.len() as u64, removed })
  }

  pub async fn all(&self) -> Result<Vec<nation::Model>> {
    let nations = nation::Entity::find()
      .order_by_asc(nation::Column::Name)
      .all(self.db)
      .await?;
    Ok(nations)
  }
}
