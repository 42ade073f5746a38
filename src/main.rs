//! TAPI sync - mirrors a game server's remote API into SQLite
//!
//! Architecture:
//! - SeaORM for both databases (SQLite)
//! - Reqwest for the remote API and skin renders
//! - Axum for the read API with rate limiting
//! - Teloxide for staleness alerts
//! - Tokio for async runtime

mod config;
mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod sv;
mod sync;
mod tapi;
mod utils;

use std::sync::Arc;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{config::Config, plugins::App, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "tapi_sync=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  info!("Starting TAPI sync v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config).await?);

  if std::env::args().nth(1).as_deref() == Some("once") {
    return once(&app).await;
  }

  App::new()
    .register(plugins::sync::Syncer)
    .register(plugins::stats::StatsUpdater)
    .register(plugins::server::Plugin)
    .register(plugins::watchdog::Watchdog)
    .run(app)
    .await;

  tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
  info!("Shutting down");
  Ok(())
}

/// A single sync pass and stats pass, for cron-style deployments.
async fn once(app: &AppState) -> anyhow::Result<()> {
  let report = sync::pass(app).await.context("Sync pass failed")?;
  info!("Sync pass done: {report}");

  let report = sync::stats_pass(app).await.context("Stats pass failed")?;
  info!("Stats pass done: {report}");

  Ok(())
}
