//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexicographic order matches chronological
//! order. Map-valued preference fields are stored as compact JSON.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use senseable_core::{
  history::RephraseHistory,
  preference::{ColorPalette, Preference},
  tag::{FamiliarityLevel, Tag},
  user::{User, UserId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the columns keep, so a value handed
/// back from an insert equals the one read later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── FamiliarityLevel ────────────────────────────────────────────────────────

pub fn encode_familiarity(level: FamiliarityLevel) -> &'static str { level.into() }

pub fn decode_familiarity(s: &str) -> Result<FamiliarityLevel> {
  FamiliarityLevel::parse(s).map_err(|_| Error::UnknownValue {
    column: "familiarity_level",
    value:  s.to_owned(),
  })
}

// ─── JSON maps ───────────────────────────────────────────────────────────────

pub fn encode_palette(p: &ColorPalette) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn encode_object(
  m: &serde_json::Map<String, serde_json::Value>,
) -> Result<String> {
  Ok(serde_json::to_string(m)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:    i64,
  pub name:       String,
  pub email:      Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, name, email, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    self.user_id,
      name:       self.name,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `preferences` row.
pub struct RawPreference {
  pub preference_id:        i64,
  pub user_id:              UserId,
  pub accessibility_need:   Option<String>,
  pub reading_level:        Option<String>,
  pub preferred_complexity: Option<String>,
  pub color_palette:        Option<String>,
  pub other_preferences:    Option<String>,
}

impl RawPreference {
  pub const COLUMNS: &'static str = "preference_id, user_id, accessibility_need, \
     reading_level, preferred_complexity, color_palette, other_preferences";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      preference_id:        row.get(0)?,
      user_id:              row.get(1)?,
      accessibility_need:   row.get(2)?,
      reading_level:        row.get(3)?,
      preferred_complexity: row.get(4)?,
      color_palette:        row.get(5)?,
      other_preferences:    row.get(6)?,
    })
  }

  pub fn into_preference(self) -> Result<Preference> {
    let color_palette = self
      .color_palette
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;
    let other_preferences = self
      .other_preferences
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;

    Ok(Preference {
      preference_id: self.preference_id,
      user_id: self.user_id,
      accessibility_need: self.accessibility_need,
      reading_level: self.reading_level,
      preferred_complexity: self.preferred_complexity,
      color_palette,
      other_preferences,
    })
  }
}

/// Raw values read directly from a `tags` row.
pub struct RawTag {
  pub tag_id:            i64,
  pub user_id:           UserId,
  pub phrase:            String,
  pub familiarity_level: String,
  pub created_at:        String,
}

impl RawTag {
  pub const COLUMNS: &'static str =
    "tag_id, user_id, phrase, familiarity_level, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tag_id:            row.get(0)?,
      user_id:           row.get(1)?,
      phrase:            row.get(2)?,
      familiarity_level: row.get(3)?,
      created_at:        row.get(4)?,
    })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      tag_id:            self.tag_id,
      user_id:           self.user_id,
      phrase:            self.phrase,
      familiarity_level: decode_familiarity(&self.familiarity_level)?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `rephrase_history` row.
pub struct RawHistory {
  pub history_id:     i64,
  pub user_id:        UserId,
  pub original_text:  String,
  pub rephrased_text: String,
  pub version:        i64,
  pub created_at:     String,
}

impl RawHistory {
  pub const COLUMNS: &'static str =
    "history_id, user_id, original_text, rephrased_text, version, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:     row.get(0)?,
      user_id:        row.get(1)?,
      original_text:  row.get(2)?,
      rephrased_text: row.get(3)?,
      version:        row.get(4)?,
      created_at:     row.get(5)?,
    })
  }

  pub fn into_history(self) -> Result<RephraseHistory> {
    let version = u32::try_from(self.version).map_err(|_| Error::UnknownValue {
      column: "version",
      value:  self.version.to_string(),
    })?;
    Ok(RephraseHistory {
      history_id: self.history_id,
      user_id: self.user_id,
      original_text: self.original_text,
      rephrased_text: self.rephrased_text,
      version,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
