use serde::Serialize;

use crate::{prelude::*, sv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
  Ok,
  Stale,
}

/// Freshness report consumed by `/api/status` and the watchdog.
#[derive(Debug, Clone, Serialize)]
pub struct Freshness {
  pub status: Health,
  pub online_players: u64,
  /// Minutes since the last players sync
  pub last_players_update_age: i64,
  /// Minutes since the last chat sync
  pub last_chat_update_age: i64,
}

pub struct Status<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Status<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn freshness(&self, stale_after: Duration) -> Result<Freshness> {
    let variables = sv::Variables::new(self.db);
    let players_update = variables.millis("last_players_update").await?;
    let chat_update = variables.millis("last_chat_update").await?;
    let online_players = sv::Players::new(self.db).count_online().await?;

    let now = utils::now_millis();
    let last_players_update_age = utils::age_minutes(now, players_update);
    let last_chat_update_age = utils::age_minutes(now, chat_update);

    let limit = (stale_after.as_secs() / 60) as i64;
    let stale =
      last_players_update_age >= limit || last_chat_update_age >= limit;
    let status = if stale { Health::Stale } else { Health::Ok };

    Ok(Freshness {
      status,
      online_players,
      last_players_update_age,
      last_chat_update_age,
    })
  }
}
