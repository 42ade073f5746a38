//! One synchronization pass over the remote feeds

pub mod reconcile;
pub mod skins;

use std::{fmt, time::Instant};

use serde::de::DeserializeOwned;

use crate::{
  prelude::*,
  state::AppState,
  sync::{reconcile::Changes, skins::SkinKind},
  tapi::{
    Feed, Snapshot,
    model::{ChatEntry, KillEntry, OnlinePlayers, ServerInfo, Towny},
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Synced(Changes),
  /// Remote answered with this status, the feed was left untouched
  Skipped(u16),
}

#[derive(Debug, Clone)]
pub struct Report {
  pub feeds: Vec<(Feed, Outcome)>,
  pub elapsed: Duration,
}

impl Report {
  fn total(&self) -> Changes {
    let mut total = Changes::default();
    for (_, outcome) in &self.feeds {
      if let Outcome::Synced(changes) = outcome {
        total.written += changes.written;
        total.removed += changes.removed;
      }
    }
    total
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let total = self.total();
    let skipped = self
      .feeds
      .iter()
      .filter(|(_, outcome)| matches!(outcome, Outcome::Skipped(_)))
      .count();
    write!(
      f,
      "{} feeds ({skipped} skipped), {} rows written, {} removed in {:?}",
      self.feeds.len(),
      total.written,
      total.removed,
      self.elapsed
    )
  }
}

/// Pulls every feed once, in order, and merges it into the live database.
///
/// A 502 aborts the remaining feeds. Feeds answered with any other non-200
/// status are skipped and keep their previous freshness.
pub async fn pass(app: &AppState) -> Result<Report> {
  let started = Instant::now();
  let mut feeds = Vec::with_capacity(Feed::PASS.len());

  for feed in Feed::PASS {
    let outcome = match app.source.fetch(&feed).await? {
      Snapshot::Ready(payload) => {
        Outcome::Synced(sync_feed(app, &feed, payload).await?)
      }
      Snapshot::Empty(status) => {
        warn!("Failed to fetch `{feed}`: HTTP {status}");
        Outcome::Skipped(status)
      }
      Snapshot::GatewayDown => return Err(Error::GatewayDown(feed.name())),
    };
    feeds.push((feed, outcome));
  }

  if let Some(skins) = &app.skins {
    match app.sv().players.ids().await {
      Ok(uuids) => {
        for kind in SkinKind::ALL {
          if let Err(err) = skins.refresh(kind, &uuids).await {
            warn!("Failed to refresh {} skins: {err}", kind.name());
          }
        }
      }
      Err(err) => warn!("Failed to list players for skins: {err}"),
    }
  }

  Ok(Report { feeds, elapsed: started.elapsed() })
}

async fn sync_feed(
  app: &AppState,
  feed: &Feed,
  payload: json::Value,
) -> Result<Changes> {
  let sv = app.sv();
  let started = Instant::now();

  let changes = match feed {
    Feed::Players => {
      let players: OnlinePlayers = decode(feed, payload)?;
      sv.players.reconcile(&players.online_players, utils::now_millis()).await?
    }
    Feed::Chat => {
      sv.chat.append(&decode::<Vec<ChatEntry>>(feed, payload)?).await?
    }
    Feed::Kills => {
      sv.kills.append(&decode::<Vec<KillEntry>>(feed, payload)?).await?
    }
    Feed::Towns => {
      sv.towns.reconcile(&decode::<Towny>(feed, payload)?.towns).await?
    }
    Feed::Nations => {
      sv.nations.reconcile(&decode::<Towny>(feed, payload)?.nations).await?
    }
    Feed::ServerInfo => {
      let variables = decode::<ServerInfo>(feed, payload)?.variables();
      let written = variables.len() as u64;
      sv.variables.set_many(variables).await?;
      Changes { written, removed: 0 }
    }
    Feed::PlayerStats(uuid) => {
      let written = sv.stats.record(uuid, &payload).await?;
      Changes { written, removed: 0 }
    }
  };

  if let Some(variable) = feed.freshness_variable() {
    sv.variables.touch(variable).await?;
  }

  debug!("Synced `{feed}` in {:?}: {changes:?}", started.elapsed());
  Ok(changes)
}

/// Records the statistics of every online player into the stats database.
pub async fn stats_pass(app: &AppState) -> Result<Report> {
  let started = Instant::now();

  let online: OnlinePlayers = match app.source.fetch(&Feed::Players).await? {
    Snapshot::Ready(payload) => decode(&Feed::Players, payload)?,
    Snapshot::Empty(status) => {
      warn!("Failed to fetch online players for stats: HTTP {status}");
      return Ok(Report {
        feeds: vec![(Feed::Players, Outcome::Skipped(status))],
        elapsed: started.elapsed(),
      });
    }
    Snapshot::GatewayDown => {
      return Err(Error::GatewayDown(Feed::Players.name()));
    }
  };

  let mut feeds = Vec::with_capacity(online.online_players.len());
  for (uuid, player) in &online.online_players {
    let feed = Feed::PlayerStats(uuid.clone());
    let outcome = match app.source.fetch(&feed).await? {
      Snapshot::Ready(payload) => {
        let changes = sync_feed(app, &feed, payload).await?;
        debug!("Updated player stats for {} ({uuid})", player.name);
        Outcome::Synced(changes)
      }
      Snapshot::Empty(404) => {
        info!("Player {uuid} went offline before their stats were fetched");
        Outcome::Skipped(404)
      }
      Snapshot::Empty(status) => {
        warn!("Failed to fetch stats for {uuid}: HTTP {status}");
        Outcome::Skipped(status)
      }
      Snapshot::GatewayDown => return Err(Error::GatewayDown(feed.name())),
    };
    feeds.push((feed, outcome));
  }

  app.sv().variables.touch("last_stats_update").await?;
  Ok(Report { feeds, elapsed: started.elapsed() })
}

fn decode<T: DeserializeOwned>(feed: &Feed, payload: json::Value) -> Result<T> {
  json::from_value(payload)
    .map_err(|source| Error::Payload { feed: feed.name(), source })
}

#[cfg(test)]
pub(crate) mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::tapi::Source;

  /// Serves canned snapshots by feed path, `404` for anything else.
  #[derive(Default)]
  pub struct FakeSource {
    responses: HashMap<String, Snapshot>,
    pub calls: Mutex<Vec<String>>,
  }

  impl Report {
    fn outcome(&self, feed: &Feed) -> Option<Outcome> {
      self.feeds.iter().find(|(f, _)| f == feed).map(|(_, outcome)| *outcome)
    }
  }

  impl FakeSource {
    pub fn with(mut self, path: &str, snapshot: Snapshot) -> Self {
      self.responses.insert(path.to_string(), snapshot);
      self
    }

    pub fn ready(self, path: &str, payload: json::Value) -> Self {
      self.with(path, Snapshot::Ready(payload))
    }

    fn calls(&self) -> Vec<String> {
      self.calls.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl Source for FakeSource {
    async fn fetch(&self, feed: &Feed) -> Result<Snapshot> {
      self.calls.lock().unwrap().push(feed.to_string());
      let snapshot = self.responses.get(&feed.path()).cloned();
      Ok(snapshot.unwrap_or(Snapshot::Empty(404)))
    }
  }

  fn healthy() -> FakeSource {
    FakeSource::default()
      .ready(
        "/online_players",
        json::json!({ "online_players": {
          "u1": { "name": "Steve", "online_duration": 60 },
          "u2": { "name": "Alex" },
        }}),
      )
      .ready(
        "/chat_history",
        json::json!([
          { "sender": "Steve", "message": "hi", "timestamp": 10, "type": "chat" },
          { "message": "playerlist", "timestamp": 11 },
        ]),
      )
      .ready(
        "/kill_history",
        json::json!([{
          "killer_uuid": "u1", "killer_name": "Steve",
          "victim_uuid": "u2", "victim_name": "Alex",
          "weapon": { "type": "IRON_SWORD" }, "timestamp": 5,
        }]),
      )
      .ready(
        "/towny",
        json::json!({
          "towns": { "t1": { "name": "Town", "nation": "n1" } },
          "nations": { "n1": { "name": "Nation" } },
        }),
      )
      .ready(
        "/server_info",
        json::json!({ "weather": "Clear", "day": 12, "world_time_24h": "06:00" }),
      )
  }

  async fn state(source: FakeSource) -> (Arc<FakeSource>, AppState) {
    let source = Arc::new(source);
    (source.clone(), AppState::memory(source).await)
  }

  #[tokio::test]
  async fn healthy_pass_syncs_every_feed() {
    let (source, app) = state(healthy()).await;

    let report = pass(&app).await.unwrap();
    assert_eq!(
      source.calls(),
      ["players", "chat", "kills", "towns", "nations", "server_info"]
    );
    assert_eq!(
      report.outcome(&Feed::Chat),
      Some(Outcome::Synced(Changes { written: 1, removed: 0 }))
    );

    let sv = app.sv();
    assert_eq!(sv.players.count_online().await.unwrap(), 1);
    assert_eq!(sv.kills.count().await.unwrap(), 1);
    assert_eq!(sv.towns.ids(&app.db).await.unwrap(), ["t1"]);

    let vars = sv
      .variables
      .many(&["weather", "day", "last_nations_update"])
      .await
      .unwrap();
    assert_eq!(vars["weather"], "Clear");
    assert_eq!(vars["day"], "12");
    assert!(vars["last_nations_update"].parse::<i64>().unwrap() > 0);
  }

  #[tokio::test]
  async fn second_pass_appends_nothing() {
    let (_, app) = state(healthy()).await;

    pass(&app).await.unwrap();
    let report = pass(&app).await.unwrap();

    assert_eq!(
      report.outcome(&Feed::Kills),
      Some(Outcome::Synced(Changes::default()))
    );
    assert_eq!(app.sv().chat.count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn gateway_down_aborts_remaining_feeds() {
    let source = healthy().with("/kill_history", Snapshot::GatewayDown);
    let (source, app) = state(source).await;

    let err = pass(&app).await.unwrap_err();
    assert!(matches!(err, Error::GatewayDown("kills")));
    assert!(err.is_retryable());
    assert_eq!(source.calls(), ["players", "chat", "kills"]);

    let sv = app.sv();
    assert!(sv.variables.millis("last_chat_update").await.unwrap() > 0);
    assert_eq!(sv.variables.millis("last_towns_update").await.unwrap(), 0);
    assert!(sv.towns.ids(&app.db).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn empty_feed_is_skipped_without_touching_freshness() {
    let source = healthy().with("/chat_history", Snapshot::Empty(503));
    let (_, app) = state(source).await;

    let report = pass(&app).await.unwrap();
    assert_eq!(report.outcome(&Feed::Chat), Some(Outcome::Skipped(503)));

    let sv = app.sv();
    assert_eq!(sv.variables.millis("last_chat_update").await.unwrap(), 0);
    assert!(sv.variables.millis("last_kills_update").await.unwrap() > 0);
    assert_eq!(sv.kills.count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn malformed_payload_fails_the_pass() {
    let source =
      healthy().ready("/chat_history", json::json!({ "not": "a list" }));
    let (_, app) = state(source).await;

    let err = pass(&app).await.unwrap_err();
    assert!(matches!(err, Error::Payload { feed: "chat", .. }));
    assert!(!err.is_retryable());
  }

  #[tokio::test]
  async fn stats_pass_skips_players_that_left() {
    let source = healthy().ready(
      "/full_player_stats/u1",
      json::json!({ "general": { "DEATHS": 2 } }),
    );
    let (source, app) = state(source).await;

    let report = stats_pass(&app).await.unwrap();
    assert_eq!(
      source.calls(),
      ["players", "player_stats(u1)", "player_stats(u2)"]
    );
    assert_eq!(
      report.outcome(&Feed::PlayerStats("u2".into())),
      Some(Outcome::Skipped(404))
    );

    let sv = app.sv();
    assert_eq!(sv.stats.values("general", "DEATHS").await.unwrap()["u1"], 2);
    assert!(sv.variables.millis("last_stats_update").await.unwrap() > 0);
  }

  #[tokio::test]
  async fn stats_pass_aborts_on_gateway_down() {
    let source = healthy().with("/online_players", Snapshot::GatewayDown);
    let (_, app) = state(source).await;

    assert!(matches!(
      stats_pass(&app).await,
      Err(Error::GatewayDown("players"))
    ));
    let stamped = app.sv().variables.millis("last_stats_update").await;
    assert_eq!(stamped.unwrap(), 0);
  }
}
