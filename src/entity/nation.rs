use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nations")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub uuid: String,
  pub name: String,
  pub leader: Option<String>,
  pub capitol_town: Option<String>,
  pub capitol_town_name: Option<String>,
  pub balance: f64,
  pub town_tax_dollars: f64,
  pub founded: Option<i64>,
  pub color_hex: String,
  pub tag: Option<String>,
  pub board: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
