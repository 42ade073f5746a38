//! Client of the remote game-server API

pub mod model;

use std::fmt;

use reqwest::{Client, StatusCode};

use crate::prelude::*;

/// One logical upstream data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feed {
  Players,
  Chat,
  Kills,
  Towns,
  Nations,
  ServerInfo,
  PlayerStats(String),
}

impl Feed {
  /// Feeds of one sync pass, in the order they are pulled.
  pub const PASS: [Feed; 6] = [
    Feed::Players,
    Feed::Chat,
    Feed::Kills,
    Feed::Towns,
    Feed::Nations,
    Feed::ServerInfo,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Feed::Players => "players",
      Feed::Chat => "chat",
      Feed::Kills => "kills",
      Feed::Towns => "towns",
      Feed::Nations => "nations",
      Feed::ServerInfo => "server_info",
      Feed::PlayerStats(_) => "player_stats",
    }
  }

  pub fn path(&self) -> String {
    match self {
      Feed::Players => "/online_players".into(),
      Feed::Chat => "/chat_history".into(),
      Feed::Kills => "/kill_history".into(),
      // towns and nations share one endpoint but sync independently
      Feed::Towns | Feed::Nations => "/towny".into(),
      Feed::ServerInfo => "/server_info".into(),
      Feed::PlayerStats(uuid) => format!("/full_player_stats/{uuid}"),
    }
  }

  /// Variable holding the completion time of the last successful sync.
  pub fn freshness_variable(&self) -> Option<&'static str> {
    match self {
      Feed::Players => Some("last_players_update"),
      Feed::Chat => Some("last_chat_update"),
      Feed::Kills => Some("last_kills_update"),
      Feed::Towns => Some("last_towns_update"),
      Feed::Nations => Some("last_nations_update"),
      Feed::ServerInfo => Some("last_server_info_update"),
      Feed::PlayerStats(_) => None,
    }
  }
}

impl fmt::Display for Feed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Feed::PlayerStats(uuid) => write!(f, "player_stats({uuid})"),
      feed => f.write_str(feed.name()),
    }
  }
}

/// Classified outcome of a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
  Ready(json::Value),
  /// Any status besides 200 and 502
  Empty(u16),
  /// 502, upstream is most likely restarting
  GatewayDown,
}

#[async_trait]
pub trait Source: Send + Sync {
  /// One bounded GET. Transport failures are returned as errors, never
  /// folded into a [`Snapshot`].
  async fn fetch(&self, feed: &Feed) -> Result<Snapshot>;
}

pub struct Tapi {
  client: Client,
  base_url: String,
}

impl Tapi {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("tapi-sync/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self { client, base_url: base_url.into() })
  }

  pub fn url(&self, feed: &Feed) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), feed.path())
  }
}

#[async_trait]
impl Source for Tapi {
  async fn fetch(&self, feed: &Feed) -> Result<Snapshot> {
    let response = self.client.get(self.url(feed)).send().await?;
    debug!("Got response from TAPI for `{feed}`: {}", response.status());

    match response.status() {
      StatusCode::OK => Ok(Snapshot::Ready(response.json().await?)),
      StatusCode::BAD_GATEWAY => Ok(Snapshot::GatewayDown),
      status => Ok(Snapshot::Empty(status.as_u16())),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::net::SocketAddr;

  use axum::{Json, Router, http::StatusCode as Code, routing::get};

  use super::*;

  async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
  }

  #[test]
  fn feeds_map_to_paths() {
    assert_eq!(Feed::Players.path(), "/online_players");
    assert_eq!(Feed::Towns.path(), Feed::Nations.path());
    assert_eq!(Feed::PlayerStats("u1".into()).path(), "/full_player_stats/u1");
    assert_eq!(Feed::PlayerStats("u1".into()).freshness_variable(), None);
  }

  #[tokio::test]
  async fn classifies_responses() {
    let router = Router::new()
      .route(
        "/api/online_players",
        get(|| async { Json(json::json!({ "online_players": {} })) }),
      )
      .route("/api/towny", get(|| async { Code::BAD_GATEWAY }))
      .route("/api/server_info", get(|| async { Code::SERVICE_UNAVAILABLE }));
    let addr = serve(router).await;

    let tapi =
      Tapi::new(format!("http://{addr}/api/"), Duration::from_secs(5)).unwrap();

    assert_eq!(
      tapi.fetch(&Feed::Players).await.unwrap(),
      Snapshot::Ready(json::json!({ "online_players": {} }))
    );
    assert_eq!(tapi.fetch(&Feed::Towns).await.unwrap(), Snapshot::GatewayDown);
    assert_eq!(tapi.fetch(&Feed::ServerInfo).await.unwrap(), Snapshot::Empty(503));
    assert_eq!(tapi.fetch(&Feed::Chat).await.unwrap(), Snapshot::Empty(404));
  }

  #[tokio::test]
  async fn connection_failures_are_retryable_errors() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let tapi =
      Tapi::new(format!("http://{addr}/api"), Duration::from_secs(5)).unwrap();
    let err = tapi.fetch(&Feed::Players).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_retryable());
  }
}
