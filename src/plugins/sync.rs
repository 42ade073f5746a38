use std::sync::Arc;

use super::backoff;
use crate::{prelude::*, state::AppState, sync};

/// Runs a sync pass every `SYNC_INTERVAL`.
pub struct Syncer;

#[async_trait]
impl super::Plugin for Syncer {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let interval = app.config.sync_interval;
    let retry = app.config.retry_delay;

    loop {
      match sync::pass(&app).await {
        Ok(report) => {
          debug!("Sync pass done: {report}");
          time::sleep(interval).await;
        }
        Err(err) => backoff("Sync", &err, retry).await,
      }
    }
  }
}
