//! Bearer-token issuing and the [`CurrentUser`] extractor.
//!
//! Tokens are 32 random bytes, URL-safe base64 encoded. Only their SHA-256
//! digest is persisted. A resolved token yields a user id that handlers
//! trust as-is; no handler checks that the caller owns the ids it names.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use rand_core::{OsRng, RngCore as _};
use senseable_core::{store::ProfileStore, user::UserId};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

/// The user id carried by a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

/// Hex SHA-256 of a token, as stored.
pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Mint a token for `user_id`, persist its digest, and return the token.
pub async fn issue_token<S>(store: &S, user_id: UserId) -> Result<String, ApiError>
where
  S: ProfileStore,
{
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  let token = B64.encode(bytes);

  store
    .store_token(user_id, hash_token(&token))
    .await
    .map_err(ApiError::store)?;
  Ok(token)
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or(ApiError::Unauthorized("authorization header missing"))?
    .to_str()
    .map_err(|_| ApiError::Unauthorized("invalid authorization header"))?;

  value
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(ApiError::Unauthorized("invalid authorization header"))
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: ProfileStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let digest = hash_token(bearer_token(&parts.headers)?);
    let user_id = state
      .store
      .resolve_token(digest)
      .await
      .map_err(ApiError::store)?
      .ok_or(ApiError::Unauthorized("invalid or expired token"))?;
    Ok(CurrentUser(user_id))
  }
}
