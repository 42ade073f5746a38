//! Write-through file cache of rendered player skins

use std::{
  path::{Path, PathBuf},
  time::SystemTime,
};

use reqwest::{Client, StatusCode};
use tokio::fs;
use uuid::Uuid;

use crate::{config::SkinConfig, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkinKind {
  Body,
  Face,
}

impl SkinKind {
  pub const ALL: [SkinKind; 2] = [SkinKind::Body, SkinKind::Face];

  pub fn name(self) -> &'static str {
    match self {
      SkinKind::Body => "body",
      SkinKind::Face => "face",
    }
  }
}

pub struct SkinCache {
  client: Client,
  config: SkinConfig,
}

impl SkinCache {
  pub fn new(config: &SkinConfig, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, config: config.clone() })
  }

  pub fn path(&self, kind: SkinKind, uuid: &str) -> Option<PathBuf> {
    path(&self.config, kind, uuid)
  }

  /// Downloads every missing or expired skin of `kind`, returns how many
  /// files were written.
  pub async fn refresh(
    &self,
    kind: SkinKind,
    uuids: &[String],
  ) -> Result<usize> {
    fs::create_dir_all(self.config.dir(kind)).await?;

    let mut written = 0;
    for uuid in uuids {
      let Some(path) = self.path(kind, uuid) else {
        debug!("Skipping {} skin of non-uuid player `{uuid}`", kind.name());
        continue;
      };
      if is_fresh(&path, self.config.ttl).await {
        continue;
      }

      let response =
        self.client.get(self.config.url(kind, uuid)).send().await?;
      if response.status() != StatusCode::OK {
        warn!(
          "Failed to fetch {} skin for {uuid}: HTTP {}",
          kind.name(),
          response.status()
        );
        continue;
      }

      fs::write(&path, response.bytes().await?).await?;
      debug!("Updated {} skin for {uuid}", kind.name());
      written += 1;
    }

    Ok(written)
  }
}

/// `<dir>/<uuid>.png`, `None` for anything that is not a uuid.
pub fn path(
  config: &SkinConfig,
  kind: SkinKind,
  uuid: &str,
) -> Option<PathBuf> {
  let uuid = Uuid::parse_str(uuid).ok()?;
  Some(config.dir(kind).join(format!("{}.png", uuid.hyphenated())))
}

async fn is_fresh(path: &Path, ttl: Duration) -> bool {
  let Ok(meta) = fs::metadata(path).await else {
    return false;
  };
  meta
    .modified()
    .ok()
    .and_then(|modified| SystemTime::now().duration_since(modified).ok())
    .is_some_and(|age| age < ttl)
}

#[cfg(test)]
mod tests {
  use std::{
    net::SocketAddr,
    sync::{
      Arc,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use axum::{Router, extract::Path as UrlPath, http::StatusCode, routing::get};

  use super::*;

  const STEVE: &str = "8667ba71-b85a-4004-af54-457a9734eed7";
  const ALEX: &str = "ec561538-f3fd-461d-aff5-086b22154bce";

  async fn serve(hits: Arc<AtomicUsize>) -> SocketAddr {
    let router = Router::new().route(
      "/skins/{uuid}",
      get(move |UrlPath(uuid): UrlPath<String>| {
        let hits = hits.clone();
        async move {
          hits.fetch_add(1, Ordering::SeqCst);
          if uuid == ALEX {
            Err(StatusCode::NOT_FOUND)
          } else {
            Ok(b"\x89PNG".to_vec())
          }
        }
      }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
  }

  fn config(addr: SocketAddr, dir: &Path) -> SkinConfig {
    SkinConfig {
      enabled: true,
      ttl: Duration::from_secs(3600),
      body_url: format!("http://{addr}/skins/{{uuid}}"),
      body_dir: dir.join("body"),
      face_url: format!("http://{addr}/skins/{{uuid}}"),
      face_dir: dir.join("face"),
    }
  }

  #[tokio::test]
  async fn fresh_files_are_not_refetched() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = serve(hits.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let cache =
      SkinCache::new(&config(addr, dir.path()), Duration::from_secs(5)).unwrap();

    let uuids = vec![STEVE.to_string()];
    assert_eq!(cache.refresh(SkinKind::Face, &uuids).await.unwrap(), 1);
    assert_eq!(cache.refresh(SkinKind::Face, &uuids).await.unwrap(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let path = cache.path(SkinKind::Face, STEVE).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
  }

  #[tokio::test]
  async fn expired_files_are_refetched() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = serve(hits.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(addr, dir.path());
    config.ttl = Duration::ZERO;
    let cache = SkinCache::new(&config, Duration::from_secs(5)).unwrap();

    let uuids = vec![STEVE.to_string()];
    cache.refresh(SkinKind::Body, &uuids).await.unwrap();
    cache.refresh(SkinKind::Body, &uuids).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn failures_and_bad_ids_are_skipped() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = serve(hits.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let cache =
      SkinCache::new(&config(addr, dir.path()), Duration::from_secs(5)).unwrap();

    let uuids =
      vec![ALEX.to_string(), "../etc/passwd".to_string(), STEVE.to_string()];
    assert_eq!(cache.refresh(SkinKind::Body, &uuids).await.unwrap(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(!cache.path(SkinKind::Body, ALEX).unwrap().exists());
  }
}
