//! JSON REST API for SenseAble.
//!
//! Exposes an axum [`Router`] backed by any [`ProfileStore`] and a shared
//! [`Rephraser`]. Everything under `/api` except registration and login
//! requires `Authorization: Bearer <token>`.

pub mod auth;
pub mod error;
pub mod pipeline;
pub mod rephrase;
pub mod tags;
pub mod users;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::HeaderValue,
  routing::{get, post},
};
use senseable_core::store::ProfileStore;
use senseable_llm::{ModelConfig, Rephraser};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SENSEABLE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// Browser origins allowed to call the API.
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
  #[serde(default)]
  pub model:        ModelConfig,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("senseable.db") }
fn default_cors_origins() -> Vec<String> {
  vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()]
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         default_host(),
      port:         default_port(),
      store_path:   default_store_path(),
      cors_origins: default_cors_origins(),
      model:        ModelConfig::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ProfileStore> {
  pub store:     Arc<S>,
  pub rephraser: Arc<Rephraser>,
  pub config:    Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Routes mounted under `/api`.
pub fn api_router<S>() -> Router<AppState<S>>
where
  S: ProfileStore + Clone + 'static,
{
  Router::new()
    // Users
    .route("/users/register", post(users::register::<S>))
    .route("/users/login", post(users::login::<S>))
    .route(
      "/users/profile/{user_id}",
      get(users::get_profile::<S>).put(users::update_profile::<S>),
    )
    .route(
      "/users/preferences/{user_id}",
      get(users::get_preferences::<S>).put(users::update_preferences::<S>),
    )
    // Tags. `{id}` is a user id for GET and a tag id for PUT/DELETE.
    .route("/tags", post(tags::create::<S>))
    .route("/tags/suggestions/{phrase}", get(tags::suggestions))
    .route(
      "/tags/{id}",
      get(tags::list::<S>).put(tags::update::<S>).delete(tags::delete::<S>),
    )
    // Rephrasing
    .route("/rephrase", post(rephrase::rephrase::<S>))
    .route("/rephrase/regenerate", post(rephrase::regenerate::<S>))
    .route("/rephrase/history/{user_id}", get(rephrase::history::<S>))
}

/// Build the full application [`Router`]: banner, health check, `/api`,
/// request tracing and CORS.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ProfileStore + Clone + 'static,
{
  let cors = cors_layer(&state.config.cors_origins);
  Router::new()
    .route("/", get(root))
    .route("/health", get(health))
    .nest("/api", api_router::<S>())
    .with_state(state)
    .layer(TraceLayer::new_for_http())
    .layer(cors)
}

/// CORS for the configured origins. Methods and headers mirror the
/// preflight request so `Authorization` is accepted alongside credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
  let origins: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = %o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods(AllowMethods::mirror_request())
    .allow_headers(AllowHeaders::mirror_request())
    .allow_credentials(true)
}

async fn root() -> Json<Value> {
  Json(json!({
    "message": "Welcome to SenseAble API",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

async fn health() -> Json<Value> { Json(json!({ "status": "healthy" })) }

#[cfg(test)]
mod tests;
