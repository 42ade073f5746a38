mod handlers;

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, http::HeaderValue, routing::get};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

/// Read API over the synced store, without middleware.
pub fn routes() -> Router<Arc<AppState>> {
  Router::new()
    .route("/api", get(handlers::root))
    .route("/api/status", get(handlers::status))
    .route("/api/players", get(handlers::players))
    .route("/api/players_misc", get(handlers::players_misc))
    .route("/api/uuid_to_name/{uuid}", get(handlers::uuid_to_name))
    .route("/api/player_skin/{uuid}", get(handlers::player_skin))
    .route("/api/player_face/{uuid}", get(handlers::player_face))
    .route("/api/towns", get(handlers::towns))
    .route("/api/towns_misc", get(handlers::towns_misc))
    .route("/api/nations", get(handlers::nations))
    .route("/api/chat_messages", get(handlers::chat_messages))
    .route("/api/chat_misc", get(handlers::chat_misc))
    .route("/api/kill_history", get(handlers::kill_history))
    .route("/api/kills_misc", get(handlers::kills_misc))
    .route(
      "/api/get_general_leaderboard/{stat}",
      get(handlers::general_leaderboard),
    )
    .route("/api/get_custom_stat/{stat}", get(handlers::custom_stat))
}

fn cors(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
  let origin = match origin {
    Some(origin) => AllowOrigin::exact(
      HeaderValue::from_str(origin).context("Invalid CORS_ORIGIN")?,
    ),
    None => AllowOrigin::from(Any),
  };
  Ok(
    CorsLayer::new()
      .allow_origin(origin)
      .allow_methods(Any)
      .allow_headers(Any),
  )
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let config = &app.config.server;

    let router = routes()
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(cors(config.cors_origin.as_deref())?),
      )
      .with_state(app.clone())
      .into_make_service_with_connect_info::<SocketAddr>();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP Server listening on {addr}");

    let limiter = async {
      loop {
        time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}
