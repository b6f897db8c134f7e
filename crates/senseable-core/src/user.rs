//! Users, the identity every preference, tag and history row hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, preference::PreferencePatch};

/// Store-assigned integer identity of a user.
pub type UserId = i64;

/// A registered user. Profile edits only ever touch `name` and `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "id")]
  pub user_id:    UserId,
  pub name:       String,
  pub email:      Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ProfileStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:  String,
  pub email: Option<String>,
}

impl NewUser {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    if let Some(email) = &self.email {
      validate_email(email)?;
    }
    Ok(())
  }
}

/// Partial update of a user's profile; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub name:  Option<String>,
  pub email: Option<String>,
}

impl UserPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name
      && name.trim().is_empty()
    {
      return Err(Error::EmptyName);
    }
    if let Some(email) = &self.email {
      validate_email(email)?;
    }
    Ok(())
  }

  pub fn apply(&self, user: &mut User) {
    if let Some(name) = &self.name {
      user.name = name.clone();
    }
    if let Some(email) = &self.email {
      user.email = Some(email.clone());
    }
  }
}

/// Registration payload: a name, an optional email, and optional
/// demographic answers from the sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
  pub name:                     String,
  pub email:                    Option<String>,
  pub age_range:                Option<String>,
  pub gender:                   Option<String>,
  pub country:                  Option<String>,
  pub language_preference:      Option<String>,
  pub accessibility_needs:      Option<Vec<String>>,
  pub other_accessibility_text: Option<String>,
  pub additional_support:       Option<String>,
}

impl Registration {
  pub fn new_user(&self) -> NewUser {
    NewUser { name: self.name.clone(), email: self.email.clone() }
  }

  /// Starting preferences for a user who answered any of the demographic
  /// questions (age range, gender or country). The answers themselves are
  /// kept under `other_preferences`.
  pub fn initial_preferences(&self) -> Option<PreferencePatch> {
    if self.age_range.is_none() && self.gender.is_none() && self.country.is_none() {
      return None;
    }

    let profile = serde_json::json!({
      "ageRange":               self.age_range,
      "gender":                 self.gender,
      "country":                self.country,
      "languagePreference":     self.language_preference,
      "accessibilityNeeds":     self.accessibility_needs.clone().unwrap_or_default(),
      "otherAccessibilityText": self.other_accessibility_text,
      "additionalSupport":      self.additional_support,
    });

    Some(PreferencePatch {
      accessibility_need:   Some("none".into()),
      reading_level:        Some("intermediate".into()),
      preferred_complexity: Some("moderate".into()),
      color_palette:        None,
      other_preferences:    profile.as_object().cloned(),
    })
  }
}

/// A deliberately loose address check: one `@` with a non-empty local part
/// and a dotted domain.
pub fn validate_email(email: &str) -> Result<()> {
  let invalid = || Error::InvalidEmail(email.to_owned());
  let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
  if local.is_empty()
    || domain.contains('@')
    || email.chars().any(char::is_whitespace)
  {
    return Err(invalid());
  }
  match domain.split_once('.') {
    Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !tld.ends_with('.') => Ok(()),
    _ => Err(invalid()),
  }
}
