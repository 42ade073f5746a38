//! Runtime configuration, read from the environment (and `.env`)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

use crate::sync::skins::SkinKind;

#[derive(Debug, Clone)]
pub struct Config {
  /// Versioned base url of the remote API, without trailing slash
  pub tapi_url: String,
  pub database_url: String,
  pub stats_database_url: String,

  pub sync_interval: Duration,
  pub stats_interval: Duration,
  /// Delay before a new pass once a pass failed
  pub retry_delay: Duration,
  pub request_timeout: Duration,

  /// Freshness variables older than this report `stale`
  pub stale_after: Duration,
  /// Players seen within this window count as active
  pub active_window: Duration,

  pub skins: SkinConfig,
  pub server: ServerConfig,
  pub watchdog: WatchdogConfig,
}

#[derive(Debug, Clone)]
pub struct SkinConfig {
  pub enabled: bool,
  pub ttl: Duration,
  pub body_url: String,
  pub body_dir: PathBuf,
  pub face_url: String,
  pub face_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub port: u16,
  pub cors_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WatchdogConfig {
  pub token: Option<String>,
  pub chat_id: Option<i64>,
  pub interval: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      tapi_url: String::from("http://127.0.0.1:1850/api"),
      database_url: String::from("sqlite:teaw.db?mode=rwc"),
      stats_database_url: String::from("sqlite:stats.db?mode=rwc"),

      sync_interval: Duration::from_secs(2),
      stats_interval: Duration::from_secs(15),
      retry_delay: Duration::from_secs(30),
      request_timeout: Duration::from_secs(20),

      stale_after: Duration::from_secs(5 * 60),
      active_window: Duration::from_secs(14 * 24 * 3600),

      skins: SkinConfig::default(),
      server: ServerConfig { port: 1851, cors_origin: None },
      watchdog: WatchdogConfig {
        token: None,
        chat_id: None,
        interval: Duration::from_secs(60),
      },
    }
  }
}

impl Default for SkinConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl: Duration::from_secs(8 * 3600),
      body_url: String::from(
        "https://starlightskins.lunareclipse.studio/render/ultimate/{uuid}/full?capeEnabled=false",
      ),
      body_dir: PathBuf::from("./db/player_body_skins"),
      face_url: String::from("https://mc-heads.net/avatar/{uuid}/8"),
      face_dir: PathBuf::from("./db/player_face_skins"),
    }
  }
}

impl SkinConfig {
  pub fn dir(&self, kind: SkinKind) -> &PathBuf {
    match kind {
      SkinKind::Body => &self.body_dir,
      SkinKind::Face => &self.face_dir,
    }
  }

  pub fn url(&self, kind: SkinKind, uuid: &str) -> String {
    let template = match kind {
      SkinKind::Body => &self.body_url,
      SkinKind::Face => &self.face_url,
    };
    template.replace("{uuid}", uuid)
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let mut config = Self::default();

    if let Some(url) = var("TAPI_URL") {
      config.tapi_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = var("DATABASE_URL") {
      config.database_url = url;
    }
    if let Some(url) = var("STATS_DATABASE_URL") {
      config.stats_database_url = url;
    }

    duration("SYNC_INTERVAL", &mut config.sync_interval)?;
    duration("STATS_INTERVAL", &mut config.stats_interval)?;
    duration("RETRY_DELAY", &mut config.retry_delay)?;
    duration("REQUEST_TIMEOUT", &mut config.request_timeout)?;
    duration("STALE_AFTER", &mut config.stale_after)?;
    duration("ACTIVE_WINDOW", &mut config.active_window)?;

    let skins = &mut config.skins;
    parsed("SKINS_ENABLED", &mut skins.enabled)?;
    duration("SKIN_TTL", &mut skins.ttl)?;
    if let Some(url) = var("BODY_SKIN_URL") {
      skins.body_url = url;
    }
    if let Some(dir) = var("BODY_SKINS_DIR") {
      skins.body_dir = dir.into();
    }
    if let Some(url) = var("FACE_SKIN_URL") {
      skins.face_url = url;
    }
    if let Some(dir) = var("FACE_SKINS_DIR") {
      skins.face_dir = dir.into();
    }

    parsed("PORT", &mut config.server.port)?;
    config.server.cors_origin = var("CORS_ORIGIN");

    config.watchdog.token = var("TELOXIDE_TOKEN");
    config.watchdog.chat_id = var("ALERT_CHAT_ID")
      .map(|id| id.parse().context("Invalid ALERT_CHAT_ID format"))
      .transpose()?;
    duration("WATCH_INTERVAL", &mut config.watchdog.interval)?;

    Ok(config)
  }
}

fn var(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn duration(key: &str, slot: &mut Duration) -> anyhow::Result<()> {
  if let Some(raw) = var(key) {
    *slot = humantime::parse_duration(raw.trim())
      .with_context(|| format!("Invalid duration in {key}: `{raw}`"))?;
  }
  Ok(())
}

fn parsed<T>(key: &str, slot: &mut T) -> anyhow::Result<()>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  if let Some(raw) = var(key) {
    *slot =
      raw.trim().parse().with_context(|| format!("Invalid {key}: `{raw}`"))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn skin_urls_substitute_uuid() {
    let skins = SkinConfig::default();
    assert_eq!(
      skins.url(SkinKind::Face, "abc"),
      "https://mc-heads.net/avatar/abc/8"
    );
    assert!(skins.url(SkinKind::Body, "abc").contains("/abc/full"));
  }

  #[test]
  fn durations_use_humantime() {
    let mut slot = Duration::ZERO;
    // SAFETY: single test touching this variable
    unsafe { env::set_var("TAPI_SYNC_TEST_INTERVAL", "1m 30s") };
    duration("TAPI_SYNC_TEST_INTERVAL", &mut slot).unwrap();
    assert_eq!(slot, Duration::from_secs(90));
  }
}
