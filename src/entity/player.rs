//! Player entity - one row per uuid ever seen online

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub uuid: String,
  pub name: String,
  /// Seconds of the current session, zero while offline
  pub online_duration: i64,
  pub afk_duration: i64,
  pub balance: Option<f64>,
  pub title: Option<String>,
  pub town: Option<String>,
  pub town_name: Option<String>,
  pub nation: Option<String>,
  pub nation_name: Option<String>,
  pub bio: Option<String>,
  pub first_joined: Option<i64>,
  /// Epoch millis of the last pass that saw the player online
  pub last_online: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
