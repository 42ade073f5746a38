use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "towns")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub uuid: String,
  pub name: String,
  pub mayor: Option<String>,
  pub founder: Option<String>,
  pub balance: f64,
  pub nation: Option<String>,
  pub nation_name: Option<String>,
  pub founded: Option<i64>,
  pub resident_tax_percent: f64,
  pub is_active: bool,
  pub claimed_chunks: i64,
  pub color_hex: Option<String>,
  pub tag: Option<String>,
  pub board: Option<String>,
  pub spawn_loc_x: f64,
  pub spawn_loc_z: f64,
  pub spawn_loc_y: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
