//! Player statistic entity, lives in the statistics database

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_statistics")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub player_uuid: String,
  /// e.g. `general`, `mob`, `item`
  #[sea_orm(primary_key, auto_increment = false)]
  pub category: String,
  /// e.g. `DEATHS` or `KILL_ENTITY:FROG`
  #[sea_orm(primary_key, auto_increment = false)]
  pub stat_key: String,
  pub stat_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
