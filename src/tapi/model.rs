//! Payloads of the remote API feeds
//!
//! Every field the remote may omit is defaulted, a partially filled entry is
//! still stored.

use serde::Deserialize;

use crate::prelude::*;

#[derive(Debug, Default, Deserialize)]
pub struct OnlinePlayers {
  #[serde(default)]
  pub online_players: BTreeMap<String, PlayerData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerData {
  pub name: String,
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
}

#[derive(Debug, Default, Deserialize)]
pub struct Towny {
  #[serde(default)]
  pub towns: BTreeMap<String, TownData>,
  #[serde(default)]
  pub nations: BTreeMap<String, NationData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TownData {
  pub name: String,
  pub mayor: Option<String>,
  pub founder: Option<String>,
  pub balance: f64,
  pub nation: Option<String>,
  pub nation_name: Option<String>,
  pub founded: Option<i64>,
  /// Stored as `resident_tax_percent`
  pub resident_tax: f64,
  pub is_active: bool,
  pub claimed_chunks: i64,
  pub color_hex: Option<String>,
  pub tag: Option<String>,
  pub board: Option<String>,
  pub spawn_loc_x: f64,
  pub spawn_loc_z: f64,
  pub spawn_loc_y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NationData {
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

impl Default for NationData {
  fn default() -> Self {
    Self {
      name: String::new(),
      leader: None,
      capitol_town: None,
      capitol_town_name: None,
      balance: 0.0,
      town_tax_dollars: 0.0,
      founded: None,
      color_hex: String::from("000000"),
      tag: None,
      board: None,
    }
  }
}

/// Entry of an append-only upstream log, ordered by its millisecond timestamp.
pub trait Stamped {
  fn timestamp(&self) -> i64;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatEntry {
  pub sender: Option<String>,
  pub sender_uuid: Option<String>,
  pub message: String,
  pub timestamp: i64,
  #[serde(rename = "type")]
  pub kind: Option<String>,
}

impl ChatEntry {
  /// The remote echoes its own `playerlist` polling into the chat history.
  pub fn is_protocol_noise(&self) -> bool {
    self.message.eq_ignore_ascii_case("playerlist")
  }
}

impl Stamped for ChatEntry {
  fn timestamp(&self) -> i64 {
    self.timestamp
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KillEntry {
  pub killer_uuid: String,
  pub killer_name: String,
  pub victim_uuid: String,
  pub victim_name: String,
  pub death_message: Option<String>,
  pub weapon: Option<json::Value>,
  pub timestamp: i64,
}

impl Stamped for KillEntry {
  fn timestamp(&self) -> i64 {
    self.timestamp
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
  pub weather: json::Value,
  pub world_time_24h: json::Value,
  pub day: json::Value,
  pub system_time: json::Value,
  pub tapi_version: json::Value,
  pub tapi_build: json::Value,
}

impl ServerInfo {
  /// `(variable, value)` pairs to store, absent fields are left untouched.
  pub fn variables(&self) -> Vec<(&'static str, String)> {
    [
      ("weather", &self.weather),
      ("world_time_24h", &self.world_time_24h),
      ("day", &self.day),
      ("system_time", &self.system_time),
      ("tapi_version", &self.tapi_version),
      ("tapi_build", &self.tapi_build),
    ]
    .into_iter()
    .filter_map(|(name, value)| Some((name, utils::scalar_text(value)?)))
    .collect()
  }
}
