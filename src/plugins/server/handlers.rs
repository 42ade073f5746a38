use std::{cmp::Ordering, io, sync::Arc};

use axum::{
  Json,
  body::Body,
  extract::{Path, Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::{
  entity::{chat, kill, player},
  prelude::*,
  state::AppState,
  sv::{Page, status::Freshness},
  sync::skins::{self, SkinKind},
};

const LEADERBOARD_SIZE: u64 = 500;

pub async fn root() -> &'static str {
  "ok"
}

pub async fn status(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Freshness>> {
  Ok(Json(app.sv().status.freshness(app.config.stale_after).await?))
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
  Online,
  Afk,
  Offline,
}

impl Presence {
  fn of(player: &player::Model) -> Self {
    match (player.online_duration > 0, player.afk_duration > 0) {
      (true, false) => Presence::Online,
      (true, true) => Presence::Afk,
      (false, _) => Presence::Offline,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PlayerRes {
  pub uuid: String,
  pub name: String,
  pub online_duration: i64,
  pub afk_duration: i64,
  pub first_joined: Option<i64>,
  pub bio: Option<String>,
  pub last_online: Option<i64>,
  pub status: Presence,
}

/// Online players first (shortest session first), then afk, then offline,
/// the latter two by most recently seen.
fn roster_order(a: &PlayerRes, b: &PlayerRes) -> Ordering {
  a.status.cmp(&b.status).then_with(|| match a.status {
    Presence::Online => a.online_duration.cmp(&b.online_duration),
    Presence::Afk | Presence::Offline => b.last_online.cmp(&a.last_online),
  })
}

pub async fn players(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<PlayerRes>>> {
  let mut players: Vec<_> = app
    .sv()
    .players
    .all()
    .await?
    .into_iter()
    .map(|player| PlayerRes {
      status: Presence::of(&player),
      uuid: player.uuid,
      name: player.name,
      online_duration: player.online_duration,
      afk_duration: player.afk_duration,
      first_joined: player.first_joined,
      bio: player.bio,
      last_online: player.last_online,
    })
    .collect();

  players.sort_by(roster_order);
  Ok(Json(players))
}

#[derive(Debug, Serialize)]
pub struct PlayersMiscRes {
  pub total_players: u64,
  pub active_players: u64,
}

pub async fn players_misc(
  State(app): State<Arc<AppState>>,
) -> Result<Json<PlayersMiscRes>> {
  let sv = app.sv();
  let since = utils::now_millis() - utils::millis(app.config.active_window);

  Ok(Json(PlayersMiscRes {
    total_players: sv.players.count().await?,
    active_players: sv.players.count_seen_since(since).await?,
  }))
}

pub async fn uuid_to_name(
  State(app): State<Arc<AppState>>,
  Path(uuid): Path<String>,
) -> Result<String> {
  let player = app.sv().players.by_id(&uuid).await?;
  player.map(|player| player.name).ok_or(Error::PlayerNotFound)
}

pub async fn player_skin(
  State(app): State<Arc<AppState>>,
  Path(uuid): Path<String>,
) -> Result<Response> {
  skin(&app, SkinKind::Body, &uuid).await
}

pub async fn player_face(
  State(app): State<Arc<AppState>>,
  Path(uuid): Path<String>,
) -> Result<Response> {
  skin(&app, SkinKind::Face, &uuid).await
}

async fn skin(app: &AppState, kind: SkinKind, uuid: &str) -> Result<Response> {
  let path =
    skins::path(&app.config.skins, kind, uuid).ok_or(Error::PlayerNotFound)?;

  let file = match tokio::fs::File::open(&path).await {
    Ok(file) => file,
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      return Err(Error::PlayerNotFound);
    }
    Err(err) => return Err(err.into()),
  };

  let body = Body::from_stream(ReaderStream::new(file));
  Ok(([(header::CONTENT_TYPE, "image/png")], body).into_response())
}

#[derive(Debug, Serialize)]
pub struct TownRes {
  pub uuid: String,
  pub name: String,
  pub town_color: Option<String>,
  pub nation: Option<String>,
  pub nation_name: Option<String>,
  pub nation_color: Option<String>,
  pub mayor: Option<String>,
  pub founded: Option<i64>,
  pub balance: f64,
  pub claimed_chunks: i64,
  pub is_active: bool,
  pub spawn_x: f64,
  pub spawn_z: f64,
  pub spawn_y: f64,
}

pub async fn towns(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<TownRes>>> {
  let sv = app.sv();
  let colors: HashMap<_, _> = sv
    .nations
    .all()
    .await?
    .into_iter()
    .map(|nation| (nation.uuid, nation.color_hex))
    .collect();

  let towns = sv
    .towns
    .all()
    .await?
    .into_iter()
    .map(|town| TownRes {
      nation_color: town
        .nation
        .as_ref()
        .and_then(|id| colors.get(id))
        .cloned(),
      uuid: town.uuid,
      name: town.name,
      town_color: town.color_hex,
      nation: town.nation,
      nation_name: town.nation_name,
      mayor: town.mayor,
      founded: town.founded,
      balance: town.balance,
      claimed_chunks: town.claimed_chunks,
      is_active: town.is_active,
      spawn_x: town.spawn_loc_x,
      spawn_z: town.spawn_loc_z,
      spawn_y: town.spawn_loc_y,
    })
    .collect();

  Ok(Json(towns))
}

#[derive(Debug, Serialize)]
pub struct TownsMiscRes {
  pub active_towns: usize,
  pub total_towns: usize,
  pub active_nations: usize,
  pub total_nations: usize,
  /// Town and nation banks together
  pub total_money: f64,
}

pub async fn towns_misc(
  State(app): State<Arc<AppState>>,
) -> Result<Json<TownsMiscRes>> {
  let sv = app.sv();
  let towns = sv.towns.all().await?;
  let nations = sv.nations.all().await?;

  let active: Vec<_> = towns.iter().filter(|town| town.is_active).collect();
  let active_nations = nations
    .iter()
    .filter(|nation| {
      active.iter().any(|town| town.nation.as_ref() == Some(&nation.uuid))
    })
    .count();

  let total_money = towns.iter().map(|town| town.balance).sum::<f64>()
    + nations.iter().map(|nation| nation.balance).sum::<f64>();

  Ok(Json(TownsMiscRes {
    active_towns: active.len(),
    total_towns: towns.len(),
    active_nations,
    total_nations: nations.len(),
    total_money,
  }))
}

pub async fn nations(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<crate::entity::nation::Model>>> {
  Ok(Json(app.sv().nations.all().await?))
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
  pub oldest_message_id: Option<i32>,
  pub newest_message_id: Option<i32>,
}

pub async fn chat_messages(
  State(app): State<Arc<AppState>>,
  Query(query): Query<ChatQuery>,
) -> Result<Json<Vec<chat::Model>>> {
  let page = Page::new(query.oldest_message_id, query.newest_message_id);
  Ok(Json(app.sv().chat.page(page).await?))
}

#[derive(Debug, Serialize)]
pub struct ChatMiscRes {
  pub messages_logged: u64,
  pub days_elapsed: Option<i64>,
  pub world_weather: Option<String>,
  pub world_time: Option<String>,
}

pub async fn chat_misc(
  State(app): State<Arc<AppState>>,
) -> Result<Json<ChatMiscRes>> {
  let sv = app.sv();
  let mut vars =
    sv.variables.many(&["day", "weather", "world_time_24h"]).await?;

  Ok(Json(ChatMiscRes {
    messages_logged: sv.chat.count().await?,
    days_elapsed: vars.get("day").and_then(|day| day.parse().ok()),
    world_weather: vars.remove("weather"),
    world_time: vars.remove("world_time_24h"),
  }))
}

#[derive(Debug, Deserialize)]
pub struct KillQuery {
  pub oldest_kill_id: Option<i32>,
  pub newest_kill_id: Option<i32>,
}

pub async fn kill_history(
  State(app): State<Arc<AppState>>,
  Query(query): Query<KillQuery>,
) -> Result<Json<Vec<kill::Model>>> {
  let page = Page::new(query.oldest_kill_id, query.newest_kill_id);
  Ok(Json(app.sv().kills.page(page).await?))
}

#[derive(Debug, Serialize)]
pub struct KillsMiscRes {
  pub total_kills: u64,
  pub unique_killers: u64,
  pub unique_victims: u64,
}

pub async fn kills_misc(
  State(app): State<Arc<AppState>>,
) -> Result<Json<KillsMiscRes>> {
  let kills = app.sv().kills;

  Ok(Json(KillsMiscRes {
    total_kills: kills.count().await?,
    unique_killers: kills.distinct(kill::Column::KillerUuid).await?,
    unique_victims: kills.distinct(kill::Column::VictimUuid).await?,
  }))
}

/// How a raw `general` statistic is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatUnit {
  Count,
  /// Game ticks shown as hours
  Hours,
  /// Centimeters shown as kilometers
  Kilometers,
}

impl StatUnit {
  fn of(stat: &str) -> Option<Self> {
    match stat {
      "DEATHS"
      | "PLAYER_KILLS"
      | "ANIMALS_BRED"
      | "CAKE_SLICES_EATEN"
      | "CRAFTING_TABLE_INTERACTION"
      | "TRADED_WITH_VILLAGER"
      | "SLEEP_IN_BED"
      | "FISH_CAUGHT" => Some(StatUnit::Count),
      "TIME_SINCE_DEATH" | "TOTAL_WORLD_TIME" => Some(StatUnit::Hours),
      "PIG_ONE_CM" => Some(StatUnit::Kilometers),
      _ => None,
    }
  }

  fn label(self) -> &'static str {
    match self {
      StatUnit::Count => "quantity",
      StatUnit::Hours => "hours",
      StatUnit::Kilometers => "kilometers",
    }
  }

  fn render(self, value: i64) -> json::Value {
    match self {
      StatUnit::Count => value.into(),
      StatUnit::Hours => utils::ticks_to_hours(value).into(),
      StatUnit::Kilometers => utils::cm_to_km(value).into(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardRes {
  pub units: &'static str,
  pub leaderboard: Vec<Ranked>,
}

#[derive(Debug, Serialize)]
pub struct Ranked {
  pub uuid: String,
  pub name: String,
  pub value: json::Value,
}

async fn rank(
  app: &AppState,
  rows: Vec<(String, json::Value)>,
) -> Result<Vec<Ranked>> {
  let mut names =
    app.sv().players.names(rows.iter().map(|(uuid, _)| uuid.clone())).await?;

  Ok(
    rows
      .into_iter()
      .map(|(uuid, value)| Ranked {
        name: names.remove(&uuid).unwrap_or_else(|| String::from("Unknown")),
        uuid,
        value,
      })
      .collect(),
  )
}

pub async fn general_leaderboard(
  State(app): State<Arc<AppState>>,
  Path(stat): Path<String>,
) -> Result<Json<LeaderboardRes>> {
  let stat = stat.to_uppercase();
  let unit =
    StatUnit::of(&stat).ok_or_else(|| Error::UnknownStat(stat.clone()))?;

  let rows = app
    .sv()
    .stats
    .leaderboard("general", &stat, LEADERBOARD_SIZE)
    .await?
    .into_iter()
    .map(|(uuid, value)| (uuid, unit.render(value)))
    .collect();

  Ok(Json(LeaderboardRes {
    units: unit.label(),
    leaderboard: rank(&app, rows).await?,
  }))
}

pub async fn custom_stat(
  State(app): State<Arc<AppState>>,
  Path(stat): Path<String>,
) -> Result<Json<LeaderboardRes>> {
  let stat = stat.to_uppercase();
  match stat.as_str() {
    "PLAYTIME_DEATH_RATIO" => {
      let rows = playtime_death_ratio(&app).await?;
      Ok(Json(LeaderboardRes {
        units: "avg. hours per death",
        leaderboard: rank(&app, rows).await?,
      }))
    }
    _ => Err(Error::UnknownStat(stat)),
  }
}

/// Hours played per death, players without deaths rank by playtime alone.
async fn playtime_death_ratio(
  app: &AppState,
) -> Result<Vec<(String, json::Value)>> {
  let stats = app.sv().stats;
  let playtime = stats.values("general", "TOTAL_WORLD_TIME").await?;
  let deaths = stats.values("general", "DEATHS").await?;

  let mut ratios: Vec<_> = playtime
    .into_iter()
    .map(|(uuid, ticks)| {
      let hours = ticks as f64 / 20.0 / 60.0 / 60.0;
      let ratio = match deaths.get(&uuid).copied().unwrap_or(0) {
        0 => hours,
        deaths => hours / deaths as f64,
      };
      (uuid, ratio)
    })
    .collect();

  ratios.sort_by(|(a_uuid, a), (b_uuid, b)| {
    b.total_cmp(a).then_with(|| a_uuid.cmp(b_uuid))
  });

  Ok(
    ratios
      .into_iter()
      .map(|(uuid, ratio)| (uuid, format!("{ratio:.1}").into()))
      .collect(),
  )
}
