//! Staleness alerts over Telegram

use std::sync::Arc;

use teloxide::{
  Bot,
  payloads::SendMessageSetters,
  requests::Requester,
  types::{ChatId, ParseMode},
};

use crate::{
  prelude::*,
  state::AppState,
  sv::status::{Freshness, Health},
};

pub struct Watchdog;

#[async_trait]
impl super::Plugin for Watchdog {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let config = &app.config.watchdog;
    let notifier = match (&config.token, config.chat_id) {
      (Some(token), Some(chat_id)) => {
        Notifier::Telegram(Bot::new(token), ChatId(chat_id))
      }
      _ => {
        warn!("TELOXIDE_TOKEN or ALERT_CHAT_ID not set, alerts go to the log");
        Notifier::Log
      }
    };

    let limit = (app.config.stale_after.as_secs() / 60) as i64;
    let mut alerts = Alerts::default();

    loop {
      let freshness = app.sv().status.freshness(app.config.stale_after).await;
      let messages = match freshness {
        Ok(freshness) => alerts.check(&freshness, limit),
        Err(err) => alerts.unreachable(&err),
      };

      for message in messages {
        notifier.send(&message).await;
      }

      time::sleep(config.interval).await;
    }
  }
}

enum Notifier {
  Telegram(Bot, ChatId),
  Log,
}

impl Notifier {
  async fn send(&self, text: &str) {
    match self {
      Notifier::Telegram(bot, chat_id) => {
        if let Err(err) =
          bot.send_message(*chat_id, text).parse_mode(ParseMode::Html).await
        {
          error!("Failed to send alert: {err}");
        }
      }
      Notifier::Log => warn!("ALERT: {text}"),
    }
  }
}

/// Each alert fires once, then stays quiet until its condition clears.
#[derive(Debug, Default)]
struct Alerts {
  players: bool,
  chat: bool,
  status: bool,
  store: bool,
}

impl Alerts {
  fn check(&mut self, freshness: &Freshness, limit: i64) -> Vec<String> {
    self.store = false;

    let players = freshness.last_players_update_age;
    let chat = freshness.last_chat_update_age;
    [
      raise(
        &mut self.players,
        players >= limit,
        format!("⚠️ Player updates are stale (<b>{players}</b> min old)"),
      ),
      raise(
        &mut self.chat,
        chat >= limit,
        format!("⚠️ Chat updates are stale (<b>{chat}</b> min old)"),
      ),
      raise(
        &mut self.status,
        freshness.status != Health::Ok,
        String::from("❌ Status is <code>stale</code>, check the updaters"),
      ),
    ]
    .into_iter()
    .flatten()
    .collect()
  }

  fn unreachable(&mut self, err: &Error) -> Vec<String> {
    let message = format!("❗️ Failed to read sync status: {err}");
    raise(&mut self.store, true, message).into_iter().collect()
  }
}

fn raise(flag: &mut bool, condition: bool, message: String) -> Option<String> {
  let fire = condition && !*flag;
  *flag = condition;
  fire.then_some(message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn freshness(players: i64, chat: i64) -> Freshness {
    let status =
      if players < 5 && chat < 5 { Health::Ok } else { Health::Stale };
    Freshness {
      status,
      online_players: 3,
      last_players_update_age: players,
      last_chat_update_age: chat,
    }
  }

  #[test]
  fn alerts_fire_once_until_recovered() {
    let mut alerts = Alerts::default();

    assert!(alerts.check(&freshness(0, 0), 5).is_empty());

    let fired = alerts.check(&freshness(0, 7), 5);
    assert_eq!(fired.len(), 2);
    assert!(fired[0].contains("Chat updates are stale (<b>7</b>"));

    assert!(alerts.check(&freshness(0, 8), 5).is_empty());
    assert!(alerts.check(&freshness(0, 0), 5).is_empty());
    assert_eq!(alerts.check(&freshness(0, 9), 5).len(), 2);
  }

  #[test]
  fn unreachable_store_alerts_once() {
    let mut alerts = Alerts::default();
    let err = Error::Database(sea_orm::DbErr::Custom("locked".into()));

    assert_eq!(alerts.unreachable(&err).len(), 1);
    assert!(alerts.unreachable(&err).is_empty());

    alerts.check(&freshness(0, 0), 5);
    assert_eq!(alerts.unreachable(&err).len(), 1);
  }
}
