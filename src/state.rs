use std::sync::Arc;

use migration::{Migrator, StatsMigrator};

use crate::{
  config::Config,
  prelude::*,
  sv,
  sync::skins::SkinCache,
  tapi::{Source, Tapi},
};

pub struct Services<'a> {
  pub players: sv::Players<'a>,
  pub towns: sv::Towns<'a>,
  pub nations: sv::Nations<'a>,
  pub chat: sv::Chat<'a>,
  pub kills: sv::Kills<'a>,
  pub variables: sv::Variables<'a>,
  pub status: sv::Status<'a>,
  /// Backed by the stats database
  pub stats: sv::Stats<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub stats_db: DatabaseConnection,
  pub source: Arc<dyn Source>,
  pub skins: Option<SkinCache>,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let source = Tapi::new(config.tapi_url.clone(), config.request_timeout)
      .context("Failed to build TAPI client")?;
    Self::with_source(config, Arc::new(source)).await
  }

  pub async fn with_source(
    config: Config,
    source: Arc<dyn Source>,
  ) -> anyhow::Result<Self> {
    info!("Connecting to databases...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;
    let stats_db = Database::connect(&config.stats_database_url)
      .await
      .context("Failed to connect to stats database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;
    StatsMigrator::up(&stats_db, None)
      .await
      .context("Failed to run stats migrations")?;

    let skins = if config.skins.enabled {
      Some(
        SkinCache::new(&config.skins, config.request_timeout)
          .context("Failed to build skin client")?,
      )
    } else {
      None
    };

    Ok(Self { db, stats_db, source, skins, config })
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      players: sv::Players::new(&self.db),
      towns: sv::Towns::new(&self.db),
      nations: sv::Nations::new(&self.db),
      chat: sv::Chat::new(&self.db),
      kills: sv::Kills::new(&self.db),
      variables: sv::Variables::new(&self.db),
      status: sv::Status::new(&self.db),
      stats: sv::Stats::new(&self.stats_db),
    }
  }
}

#[cfg(test)]
impl AppState {
  /// Both databases in memory, skins disabled.
  pub async fn memory(source: Arc<dyn Source>) -> Self {
    let mut config = Config::default();
    config.database_url = String::from("sqlite::memory:");
    config.stats_database_url = String::from("sqlite::memory:");
    config.skins.enabled = false;

    Self::with_source(config, source).await.unwrap()
  }
}
