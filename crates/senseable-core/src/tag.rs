//! Vocabulary tags: phrases a user has marked with how well they know them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::{Error, Result, user::UserId};

/// How well a user knows a tagged phrase. Stored and serialised in
/// kebab-case (`"not-familiar"`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FamiliarityLevel {
  NotFamiliar,
  SomewhatFamiliar,
  Familiar,
}

impl FamiliarityLevel {
  /// Whether phrases at this level should be simplified or explained.
  pub fn is_unfamiliar(self) -> bool { self == Self::NotFamiliar }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownFamiliarity(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  #[serde(rename = "id")]
  pub tag_id:            i64,
  pub user_id:           UserId,
  pub phrase:            String,
  pub familiarity_level: FamiliarityLevel,
  pub created_at:        DateTime<Utc>,
}

/// Input to [`crate::store::ProfileStore::create_tag`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
  #[serde(alias = "userId")]
  pub user_id:           UserId,
  pub phrase:            String,
  #[serde(alias = "familiarityLevel")]
  pub familiarity_level: FamiliarityLevel,
}

impl NewTag {
  pub fn validate(&self) -> Result<()> {
    if self.phrase.is_empty() {
      return Err(Error::EmptyPhrase);
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPatch {
  pub phrase:            Option<String>,
  #[serde(alias = "familiarityLevel")]
  pub familiarity_level: Option<FamiliarityLevel>,
}

impl TagPatch {
  pub fn validate(&self) -> Result<()> {
    match &self.phrase {
      Some(p) if p.is_empty() => Err(Error::EmptyPhrase),
      _ => Ok(()),
    }
  }

  pub fn apply(&self, tag: &mut Tag) {
    if let Some(phrase) = &self.phrase {
      tag.phrase = phrase.clone();
    }
    if let Some(level) = self.familiarity_level {
      tag.familiarity_level = level;
    }
  }
}

/// The part of a tag the rephrase pipeline cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedPhrase {
  pub phrase: String,
  pub level:  FamiliarityLevel,
}

impl From<&Tag> for TaggedPhrase {
  fn from(tag: &Tag) -> Self {
    Self { phrase: tag.phrase.clone(), level: tag.familiarity_level }
  }
}

impl TaggedPhrase {
  pub fn new(phrase: impl Into<String>, level: FamiliarityLevel) -> Self {
    Self { phrase: phrase.into(), level }
  }
}
