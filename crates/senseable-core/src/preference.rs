//! Accessibility preferences, at most one record per user.
//!
//! Preferences are created lazily: the first update for a user inserts the
//! row, later updates merge a [`PreferencePatch`] into it field by field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Highlight colours keyed by familiarity level, e.g. `"not-familiar"`.
pub type ColorPalette = BTreeMap<String, String>;

/// A user's accessibility profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preference {
  #[serde(rename = "id")]
  pub preference_id:        i64,
  pub user_id:              UserId,
  /// Coarse support category, e.g. `"dyslexia"` or `"low-vision"`.
  pub accessibility_need:   Option<String>,
  pub reading_level:        Option<String>,
  pub preferred_complexity: Option<String>,
  pub color_palette:        Option<ColorPalette>,
  pub other_preferences:    Option<serde_json::Map<String, serde_json::Value>>,
}

/// Partial preference update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencePatch {
  pub accessibility_need:   Option<String>,
  pub reading_level:        Option<String>,
  pub preferred_complexity: Option<String>,
  pub color_palette:        Option<ColorPalette>,
  pub other_preferences:    Option<serde_json::Map<String, serde_json::Value>>,
}

impl PreferencePatch {
  /// Merge the supplied fields into `pref`.
  pub fn apply(&self, pref: &mut Preference) {
    if let Some(v) = &self.accessibility_need {
      pref.accessibility_need = Some(v.clone());
    }
    if let Some(v) = &self.reading_level {
      pref.reading_level = Some(v.clone());
    }
    if let Some(v) = &self.preferred_complexity {
      pref.preferred_complexity = Some(v.clone());
    }
    if let Some(v) = &self.color_palette {
      pref.color_palette = Some(v.clone());
    }
    if let Some(v) = &self.other_preferences {
      pref.other_preferences = Some(v.clone());
    }
  }

  pub fn is_empty(&self) -> bool { self == &Self::default() }
}
