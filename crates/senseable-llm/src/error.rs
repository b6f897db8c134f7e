//! Error type for `senseable-llm`.
//!
//! These errors never reach an HTTP caller; [`crate::Rephraser`] logs them
//! and degrades to the fallback text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no model API key configured")]
  MissingApiKey,

  #[error("model request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model API returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("malformed model response: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("model response contained no text")]
  EmptyResponse,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
