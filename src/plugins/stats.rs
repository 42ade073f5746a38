use std::sync::Arc;

use super::backoff;
use crate::{prelude::*, state::AppState, sync};

/// Records online players' statistics every `STATS_INTERVAL`.
pub struct StatsUpdater;

#[async_trait]
impl super::Plugin for StatsUpdater {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let interval = app.config.stats_interval;
    let retry = app.config.retry_delay;

    loop {
      match sync::stats_pass(&app).await {
        Ok(report) => {
          info!("Stats pass done: {report}");
          time::sleep(interval).await;
        }
        Err(err) => backoff("Stats", &err, retry).await,
      }
    }
  }
}
