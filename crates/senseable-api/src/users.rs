//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/register` | No auth. Returns `{user, token}` |
//! | `POST` | `/users/login` | No auth. Body: `{"email": "..."}` |
//! | `GET`  | `/users/profile/{user_id}` | 404 if not found |
//! | `PUT`  | `/users/profile/{user_id}` | Partial update; 409 on a taken email |
//! | `GET`  | `/users/preferences/{user_id}` | 404 if none set |
//! | `PUT`  | `/users/preferences/{user_id}` | Creates the row if absent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use senseable_core::{
  preference::{Preference, PreferencePatch},
  store::ProfileStore,
  user::{Registration, User, UserId, UserPatch},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{CurrentUser, issue_token},
  error::ApiError,
};

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct Session {
  pub user:  User,
  pub token: String,
}

/// 409 if `email` already belongs to someone other than `except`.
async fn ensure_email_free<S>(
  store: &S,
  email: &str,
  except: Option<UserId>,
) -> Result<(), ApiError>
where
  S: ProfileStore,
{
  let owner = store.find_user_by_email(email).await.map_err(ApiError::store)?;
  match owner {
    Some(user) if Some(user.user_id) != except => {
      Err(ApiError::Conflict(format!("email {email} is already registered")))
    }
    _ => Ok(()),
  }
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /users/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Registration>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  let input = body.new_user();
  input.validate()?;
  if let Some(email) = &input.email {
    ensure_email_free(state.store.as_ref(), email, None).await?;
  }

  let user = state.store.create_user(input).await.map_err(ApiError::store)?;
  if let Some(patch) = body.initial_preferences() {
    state
      .store
      .upsert_preferences(user.user_id, patch)
      .await
      .map_err(ApiError::store)?;
  }

  let token = issue_token(state.store.as_ref(), user.user_id).await?;
  tracing::info!(user_id = user.user_id, "user registered");
  Ok((StatusCode::CREATED, Json(Session { user, token })))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email: String,
}

/// `POST /users/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Session>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  let user = state
    .store
    .find_user_by_email(body.email.trim())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

  let token = issue_token(state.store.as_ref(), user.user_id).await?;
  Ok(Json(Session { user, token }))
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /users/profile/{user_id}`
pub async fn get_profile<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(user_id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// `PUT /users/profile/{user_id}`
pub async fn update_profile<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(user_id): Path<UserId>,
  Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  patch.validate()?;
  if let Some(email) = &patch.email {
    ensure_email_free(state.store.as_ref(), email, Some(user_id)).await?;
  }

  state
    .store
    .update_user(user_id, patch)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

// ─── Preferences ──────────────────────────────────────────────────────────────

/// `GET /users/preferences/{user_id}`
pub async fn get_preferences<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(user_id): Path<UserId>,
) -> Result<Json<Preference>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  state
    .store
    .get_preferences(user_id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Preferences not found".into()))
}

/// `PUT /users/preferences/{user_id}`
pub async fn update_preferences<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(user_id): Path<UserId>,
  Json(patch): Json<PreferencePatch>,
) -> Result<Json<Preference>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  if state.store.get_user(user_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound("User not found".into()));
  }

  let pref = state
    .store
    .upsert_preferences(user_id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(pref))
}
