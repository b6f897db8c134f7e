//! Error type for `senseable-store-sqlite`.

use senseable_core::user::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] senseable_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// Raised inside a transaction on the connection thread.
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column held a value outside its expected domain.
  #[error("unexpected value in column {column}: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("email address already registered: {0}")]
  EmailTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
