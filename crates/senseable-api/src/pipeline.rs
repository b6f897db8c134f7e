//! The rephrase pipeline: profile lookup, prompt, model call, suggestions,
//! history write.
//!
//! The store is never borrowed across the model call; each store access is
//! its own short transaction, so a slow model never holds a database lock.

use senseable_core::{
  history::{NewRephrase, VersionMode},
  preference::Preference,
  prompt::{PromptInput, build_prompt},
  store::ProfileStore,
  suggestion::{Suggestion, extract_suggestions},
  tag::TaggedPhrase,
  user::{User, UserId},
};
use senseable_llm::Rephraser;
use serde::Serialize;

use crate::error::ApiError;

/// Everything about a user the prompt depends on.
#[derive(Debug, Clone)]
pub struct Profile {
  pub user:       User,
  pub preference: Option<Preference>,
  pub tagged:     Vec<TaggedPhrase>,
}

/// Body of a rephrase or regenerate response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RephraseOutcome {
  pub rephrased_text: String,
  pub suggestions:    Vec<Suggestion>,
  pub version:        u32,
}

/// Load the user, their preferences (if any) and their tags.
pub async fn load_profile<S>(store: &S, user_id: UserId) -> Result<Profile, ApiError>
where
  S: ProfileStore,
{
  let user = store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

  let preference = store.get_preferences(user_id).await.map_err(ApiError::store)?;
  let tagged = store
    .list_tags(user_id)
    .await
    .map_err(ApiError::store)?
    .iter()
    .map(TaggedPhrase::from)
    .collect();

  Ok(Profile { user, preference, tagged })
}

/// Rephrase `text` for `user_id` and append the result to their history.
///
/// `mode` decides the stored version: [`VersionMode::Fresh`] always records
/// version 1, [`VersionMode::Regenerate`] records one more than the number
/// of rows already stored for this user and text. Suggestions are only
/// produced when the model actually answered.
pub async fn run<S>(
  store: &S,
  rephraser: &Rephraser,
  text: String,
  user_id: UserId,
  mode: VersionMode,
) -> Result<RephraseOutcome, ApiError>
where
  S: ProfileStore,
{
  let profile = load_profile(store, user_id).await?;
  let prompt = build_prompt(&PromptInput::new(
    &text,
    profile.preference.as_ref(),
    &profile.tagged,
  ));

  let rephrasing = rephraser.rephrase(&text, &prompt).await;
  tracing::debug!(
    user_id,
    fallback = rephrasing.is_fallback(),
    chars = rephrasing.text().chars().count(),
    raw = rephrasing.raw(),
    "rephrasing produced"
  );
  let suggestions = if rephrasing.is_fallback() {
    Vec::new()
  } else {
    extract_suggestions(&text, &profile.tagged)
  };

  let record = store
    .record_rephrase(NewRephrase {
      user_id: profile.user.user_id,
      original_text: text,
      rephrased_text: rephrasing.into_text(),
      mode,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    user_id,
    version = record.version,
    suggestions = suggestions.len(),
    ?mode,
    "rephrase recorded"
  );

  Ok(RephraseOutcome {
    rephrased_text: record.rephrased_text,
    suggestions,
    version: record.version,
  })
}
