//! Handlers for `/rephrase` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/rephrase` | Body: `{"text":"...","userId":1}`. Always version 1 |
//! | `POST` | `/rephrase/regenerate` | Same body. Version = rows for this user and text + 1 |
//! | `GET`  | `/rephrase/history/{user_id}` | Newest first, at most 50 |

use axum::{
  Json,
  extract::{Path, State},
};
use senseable_core::{
  history::{RephraseHistory, VersionMode},
  store::ProfileStore,
  user::UserId,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::CurrentUser,
  error::ApiError,
  pipeline::{self, RephraseOutcome},
};

#[derive(Debug, Deserialize)]
pub struct RephraseBody {
  pub text:    String,
  #[serde(rename = "userId", alias = "user_id")]
  pub user_id: UserId,
}

async fn respond<S>(
  state: AppState<S>,
  caller: UserId,
  body: RephraseBody,
  mode: VersionMode,
) -> Result<Json<RephraseOutcome>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  tracing::debug!(caller, user_id = body.user_id, ?mode, "rephrase requested");
  let outcome = pipeline::run(
    state.store.as_ref(),
    state.rephraser.as_ref(),
    body.text,
    body.user_id,
    mode,
  )
  .await?;
  Ok(Json(outcome))
}

/// `POST /rephrase`
pub async fn rephrase<S>(
  State(state): State<AppState<S>>,
  CurrentUser(caller): CurrentUser,
  Json(body): Json<RephraseBody>,
) -> Result<Json<RephraseOutcome>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  respond(state, caller, body, VersionMode::Fresh).await
}

/// `POST /rephrase/regenerate`
pub async fn regenerate<S>(
  State(state): State<AppState<S>>,
  CurrentUser(caller): CurrentUser,
  Json(body): Json<RephraseBody>,
) -> Result<Json<RephraseOutcome>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  respond(state, caller, body, VersionMode::Regenerate).await
}

/// `GET /rephrase/history/{user_id}`
pub async fn history<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(user_id): Path<UserId>,
) -> Result<Json<Vec<RephraseHistory>>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  let rows = state.store.list_history(user_id).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}
