//! Chat entity - append-only log ordered by upstream timestamp

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub sender: Option<String>,
  pub sender_uuid: Option<String>,
  pub message: String,
  pub timestamp: i64,
  #[sea_orm(column_name = "type")]
  #[serde(rename = "type")]
  pub kind: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
