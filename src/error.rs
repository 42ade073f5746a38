//! Error types of the sync service

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("Upstream returned 502 for `{0}`, is the server restarting?")]
  GatewayDown(&'static str),

  #[error("Malformed `{feed}` payload: {source}")]
  Payload {
    feed: &'static str,
    #[source]
    source: json::Error,
  },

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Player not found")]
  PlayerNotFound,

  #[error("Invalid stat key `{0}`")]
  UnknownStat(String),

}

impl Error {
  /// Upstream is unreachable or restarting, a later pass will likely succeed.
  pub fn is_retryable(&self) -> bool {
    match self {
      Error::GatewayDown(_) => true,
      Error::Transport(err) => err.is_connect() || err.is_timeout(),
      _ => false,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::PlayerNotFound => (StatusCode::NOT_FOUND, "player not found"),
      Error::UnknownStat(_) => (StatusCode::BAD_REQUEST, "invalid stat key"),
      _ => {
        tracing::error!("Internal error while serving request: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
      }
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
