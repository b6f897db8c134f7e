//! Rephrase history: an append-only log of every rephrase attempt.
//!
//! Versions are scoped to a `(user, original text)` pair rather than being
//! globally unique. A fresh rephrase always records version 1; only a
//! regenerate counts what is already there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Maximum number of rows returned by a history listing.
pub const HISTORY_LIMIT: usize = 50;

/// One recorded rephrase. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RephraseHistory {
  #[serde(rename = "id")]
  pub history_id:     i64,
  pub user_id:        UserId,
  pub original_text:  String,
  pub rephrased_text: String,
  pub version:        u32,
  pub created_at:     DateTime<Utc>,
}

/// How the version number of a new history row is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMode {
  /// Always version 1, whatever history already exists for the text.
  Fresh,
  /// One past the number of rows already recorded for the same text.
  Regenerate,
}

impl VersionMode {
  /// The version to assign given `prior` existing rows for the pair.
  pub fn next_version(self, prior: u32) -> u32 {
    match self {
      Self::Fresh => 1,
      Self::Regenerate => prior + 1,
    }
  }
}

/// Input to [`crate::store::ProfileStore::record_rephrase`].
#[derive(Debug, Clone)]
pub struct NewRephrase {
  pub user_id:        UserId,
  pub original_text:  String,
  pub rephrased_text: String,
  pub mode:           VersionMode,
}
