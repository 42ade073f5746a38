//! Kill entity - append-only log ordered by upstream timestamp

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kills")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub killer_uuid: String,
  pub killer_name: String,
  pub victim_uuid: String,
  pub victim_name: String,
  pub death_message: Option<String>,
  /// Raw weapon json as sent upstream
  pub weapon_json: Option<String>,
  pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
