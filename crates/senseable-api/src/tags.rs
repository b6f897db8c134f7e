//! Handlers for `/tags` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/tags` | Body: `{"userId":1,"phrase":"...","familiarity_level":"not-familiar"}` |
//! | `GET`    | `/tags/{user_id}` | Oldest first; empty for unknown users |
//! | `PUT`    | `/tags/{tag_id}` | Partial update; 404 if not found |
//! | `DELETE` | `/tags/{tag_id}` | 404 if not found |
//! | `GET`    | `/tags/suggestions/{phrase}` | Canned alternatives for one phrase |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use senseable_core::{
  store::ProfileStore,
  suggestion::{Suggestion, phrase_suggestion},
  tag::{NewTag, Tag, TagPatch},
  user::UserId,
};
use serde_json::{Value, json};

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /tags`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(caller): CurrentUser,
  Json(body): Json<NewTag>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  body.validate()?;
  if state.store.get_user(body.user_id).await.map_err(ApiError::store)?.is_none() {
    return Err(ApiError::NotFound("User not found".into()));
  }

  let tag = state.store.create_tag(body).await.map_err(ApiError::store)?;
  tracing::debug!(caller, tag_id = tag.tag_id, user_id = tag.user_id, "tag created");
  Ok((StatusCode::CREATED, Json(tag)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /tags/{user_id}`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  let tags = state.store.list_tags(user_id).await.map_err(ApiError::store)?;
  Ok(Json(tags))
}

// ─── Update / delete ──────────────────────────────────────────────────────────

/// `PUT /tags/{tag_id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(tag_id): Path<i64>,
  Json(patch): Json<TagPatch>,
) -> Result<Json<Tag>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  patch.validate()?;
  state
    .store
    .update_tag(tag_id, patch)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Tag not found".into()))
}

/// `DELETE /tags/{tag_id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _caller: CurrentUser,
  Path(tag_id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  S: ProfileStore + Clone + 'static,
{
  if !state.store.delete_tag(tag_id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("Tag not found".into()));
  }
  Ok(Json(json!({ "message": "Tag deleted successfully" })))
}

// ─── Suggestions ──────────────────────────────────────────────────────────────

/// `GET /tags/suggestions/{phrase}`
pub async fn suggestions(_caller: CurrentUser, Path(phrase): Path<String>) -> Json<Suggestion> {
  Json(phrase_suggestion(&phrase))
}
