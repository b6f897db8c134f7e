//! Error types for `senseable-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("tag phrase must not be empty")]
  EmptyPhrase,

  #[error("name must not be empty")]
  EmptyName,

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("unknown familiarity level: {0:?}")]
  UnknownFamiliarity(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
