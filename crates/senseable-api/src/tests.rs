//! End-to-end tests: router + in-memory SQLite store, driven with `oneshot`.

use std::sync::{Arc, Mutex};

use axum::{
  Json, Router,
  body::Body,
  extract::State,
  http::{Request, StatusCode, header},
  response::Response,
  routing::post,
};
use senseable_llm::{ModelConfig, Rephraser};
use senseable_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt as _;

use super::*;

async fn make_state(rephraser: Rephraser) -> AppState<SqliteStore> {
  AppState {
    store:     Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    rephraser: Arc::new(rephraser),
    config:    Arc::new(ServerConfig::default()),
  }
}

async fn oneshot_raw(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  router(state.clone()).oneshot(req).await.unwrap()
}

async fn call(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let res = oneshot_raw(state, method, uri, token, body).await;
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, json)
}

/// Register a user and return `(id, token)`.
async fn register(state: &AppState<SqliteStore>, body: Value) -> (i64, String) {
  let (status, json) = call(state, "POST", "/api/users/register", None, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{json}");
  (json["user"]["id"].as_i64().unwrap(), json["token"].as_str().unwrap().to_owned())
}

/// A stand-in chat-completions endpoint that always answers `content` and
/// records the prompts it receives.
async fn fake_model(content: &'static str) -> (Rephraser, Arc<Mutex<Vec<String>>>) {
  #[derive(Clone)]
  struct Fake {
    content: &'static str,
    prompts: Arc<Mutex<Vec<String>>>,
  }

  async fn completions(State(fake): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default().to_owned();
    fake.prompts.lock().unwrap().push(prompt);
    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": fake.content } }] }))
  }

  let fake = Fake { content, prompts: Arc::default() };
  let prompts = fake.prompts.clone();
  let app = Router::new()
    .route("/v1/chat/completions", post(completions))
    .with_state(fake);
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

  let rephraser = Rephraser::from_config(&ModelConfig {
    api_key: Some("test-key".into()),
    base_url: format!("http://{addr}/v1"),
    timeout_secs: 5,
    ..Default::default()
  });
  (rephraser, prompts)
}

// ── Service endpoints ─────────────────────────────────────────────────────────

#[tokio::test]
async fn banner_and_health_need_no_token() {
  let state = make_state(Rephraser::disabled()).await;

  let (status, json) = call(&state, "GET", "/", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["message"], "Welcome to SenseAble API");

  let (status, json) = call(&state, "GET", "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json, json!({ "status": "healthy" }));
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn protected_routes_reject_missing_or_unknown_tokens() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, _) = register(&state, json!({ "name": "Ada" })).await;

  let res = oneshot_raw(&state, "GET", &format!("/api/users/profile/{id}"), None, None).await;
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

  let (status, json) =
    call(&state, "GET", &format!("/api/users/profile/{id}"), Some("nope"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(json["error"].is_string());

  let (status, _) = call(
    &state,
    "POST",
    "/api/rephrase",
    None,
    Some(json!({ "text": "hi", "userId": id })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(state.store.list_history(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn login_issues_a_working_token() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, _) = register(&state, json!({ "name": "Ada", "email": "ada@example.com" })).await;

  let (status, json) = call(
    &state,
    "POST",
    "/api/users/login",
    None,
    Some(json!({ "email": "ada@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["user"]["id"], id);
  let token = json["token"].as_str().unwrap();

  let (status, json) =
    call(&state, "GET", &format!("/api/users/profile/{id}"), Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["email"], "ada@example.com");

  let (status, _) = call(
    &state,
    "POST",
    "/api/users/login",
    None,
    Some(json!({ "email": "nobody@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Users and preferences ─────────────────────────────────────────────────────

#[tokio::test]
async fn register_with_demographics_seeds_preferences() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(
    &state,
    json!({
      "name": "Grace",
      "ageRange": "25-34",
      "country": "UK",
      "accessibilityNeeds": ["dyslexia"]
    }),
  )
  .await;

  let (status, json) =
    call(&state, "GET", &format!("/api/users/preferences/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["user_id"], id);
  assert_eq!(json["accessibility_need"], "none");
  assert_eq!(json["reading_level"], "intermediate");
  assert_eq!(json["preferred_complexity"], "moderate");
  assert_eq!(json["other_preferences"]["ageRange"], "25-34");
  assert_eq!(json["other_preferences"]["accessibilityNeeds"], json!(["dyslexia"]));
}

#[tokio::test]
async fn register_without_demographics_has_no_preferences() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Linus" })).await;

  let (status, json) =
    call(&state, "GET", &format!("/api/users/preferences/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(json["error"], "Preferences not found");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let state = make_state(Rephraser::disabled()).await;
  let (_, token) = register(&state, json!({ "name": "A", "email": "a@example.com" })).await;
  let (other, _) = register(&state, json!({ "name": "B", "email": "b@example.com" })).await;

  let (status, _) = call(
    &state,
    "POST",
    "/api/users/register",
    None,
    Some(json!({ "name": "C", "email": "a@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = call(
    &state,
    "PUT",
    &format!("/api/users/profile/{other}"),
    Some(&token),
    Some(json!({ "email": "a@example.com" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_registration_is_a_bad_request() {
  let state = make_state(Rephraser::disabled()).await;
  let (status, json) = call(
    &state,
    "POST",
    "/api/users/register",
    None,
    Some(json!({ "name": "X", "email": "not-an-email" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(json["error"].is_string());
}

#[tokio::test]
async fn profile_update_is_partial() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada", "email": "ada@example.com" })).await;

  let (status, json) = call(
    &state,
    "PUT",
    &format!("/api/users/profile/{id}"),
    Some(&token),
    Some(json!({ "name": "Ada L." })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["name"], "Ada L.");
  assert_eq!(json["email"], "ada@example.com");

  let (status, _) =
    call(&state, "GET", "/api/users/profile/9999", Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preference_upsert_merges_partial_updates() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;
  let uri = format!("/api/users/preferences/{id}");

  let (status, first) = call(
    &state,
    "PUT",
    &uri,
    Some(&token),
    Some(json!({ "reading_level": "basic", "accessibility_need": "dyslexia" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, second) = call(
    &state,
    "PUT",
    &uri,
    Some(&token),
    Some(json!({ "preferred_complexity": "simple" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(second["id"], first["id"]);
  assert_eq!(second["reading_level"], "basic");
  assert_eq!(second["accessibility_need"], "dyslexia");
  assert_eq!(second["preferred_complexity"], "simple");

  let (status, _) = call(
    &state,
    "PUT",
    "/api/users/preferences/4242",
    Some(&token),
    Some(json!({ "reading_level": "basic" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Tags ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tag_lifecycle() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;

  let (status, tag) = call(
    &state,
    "POST",
    "/api/tags",
    Some(&token),
    Some(json!({ "userId": id, "phrase": "latency", "familiarity_level": "not-familiar" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(tag["familiarity_level"], "not-familiar");
  let tag_id = tag["id"].as_i64().unwrap();

  let (status, list) = call(&state, "GET", &format!("/api/tags/{id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(list.as_array().unwrap().len(), 1);

  let (status, updated) = call(
    &state,
    "PUT",
    &format!("/api/tags/{tag_id}"),
    Some(&token),
    Some(json!({ "familiarity_level": "familiar" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["phrase"], "latency");
  assert_eq!(updated["familiarity_level"], "familiar");

  let (status, json) =
    call(&state, "DELETE", &format!("/api/tags/{tag_id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["message"], "Tag deleted successfully");

  let (status, _) =
    call(&state, "DELETE", &format!("/api/tags/{tag_id}"), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = call(
    &state,
    "PUT",
    &format!("/api/tags/{tag_id}"),
    Some(&token),
    Some(json!({ "phrase": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_for_unknown_user_or_level_is_rejected() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;

  let (status, _) = call(
    &state,
    "POST",
    "/api/tags",
    Some(&token),
    Some(json!({ "userId": 777, "phrase": "x", "familiarity_level": "familiar" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = call(
    &state,
    "POST",
    "/api/tags",
    Some(&token),
    Some(json!({ "userId": id, "phrase": "x", "familiarity_level": "expert" })),
  )
  .await;
  assert!(status.is_client_error());
  assert!(state.store.list_tags(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn standalone_phrase_suggestion() {
  let state = make_state(Rephraser::disabled()).await;
  let (_, token) = register(&state, json!({ "name": "Ada" })).await;

  let (status, json) =
    call(&state, "GET", "/api/tags/suggestions/quick", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["phrase"], "quick");
  assert_eq!(json["alternatives"].as_array().unwrap().len(), 3);
  assert_eq!(json["position"], json!({ "start": 0, "end": 5 }));
}

// ── Rephrasing ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rephrase_without_model_falls_back_at_version_one() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;
  state
    .store
    .create_tag(senseable_core::tag::NewTag {
      user_id:           id,
      phrase:            "quick".into(),
      familiarity_level: senseable_core::tag::FamiliarityLevel::NotFamiliar,
    })
    .await
    .unwrap();

  for _ in 0..2 {
    let (status, json) = call(
      &state,
      "POST",
      "/api/rephrase",
      Some(&token),
      Some(json!({ "text": "The quick brown fox", "userId": id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rephrased_text"], "[Simplified] The quick brown fox");
    assert_eq!(json["suggestions"], json!([]));
    assert_eq!(json["version"], 1);
  }

  let (_, history) =
    call(&state, "GET", &format!("/api/rephrase/history/{id}"), Some(&token), None).await;
  let rows = history.as_array().unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r["version"] == 1));
}

#[tokio::test]
async fn regenerate_is_count_plus_one() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;
  let body = json!({ "text": "Some words", "user_id": id });

  for _ in 0..3 {
    call(&state, "POST", "/api/rephrase", Some(&token), Some(body.clone())).await;
  }

  let (status, json) =
    call(&state, "POST", "/api/rephrase/regenerate", Some(&token), Some(body.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["version"], 4);

  let (_, json) =
    call(&state, "POST", "/api/rephrase/regenerate", Some(&token), Some(body)).await;
  assert_eq!(json["version"], 5);

  let (_, history) =
    call(&state, "GET", &format!("/api/rephrase/history/{id}"), Some(&token), None).await;
  let versions: Vec<i64> =
    history.as_array().unwrap().iter().map(|r| r["version"].as_i64().unwrap()).collect();
  assert_eq!(versions, vec![5, 4, 1, 1, 1]);
}

#[tokio::test]
async fn rephrase_for_unknown_user_is_not_found() {
  let state = make_state(Rephraser::disabled()).await;
  let (_, token) = register(&state, json!({ "name": "Ada" })).await;

  for uri in ["/api/rephrase", "/api/rephrase/regenerate"] {
    let (status, json) = call(
      &state,
      "POST",
      uri,
      Some(&token),
      Some(json!({ "text": "hello", "userId": 31337 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "User not found");
  }
  assert!(state.store.list_history(31337).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_text_gets_the_fallback() {
  let state = make_state(Rephraser::disabled()).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;

  let (status, body) = call(
    &state,
    "POST",
    "/api/rephrase",
    Some(&token),
    Some(json!({ "text": "", "userId": id })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["rephrased_text"], "[Simplified] ");
  assert_eq!(body["version"], 1);

  let history = state.store.list_history(id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].original_text, "");
}

#[tokio::test]
async fn model_answer_carries_suggestions_and_personalised_prompt() {
  let (rephraser, prompts) = fake_model("A fast brown fox.").await;
  let state = make_state(rephraser).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;

  call(
    &state,
    "PUT",
    &format!("/api/users/preferences/{id}"),
    Some(&token),
    Some(json!({ "accessibility_need": "dyslexia", "reading_level": "basic" })),
  )
  .await;
  for (phrase, level) in [("quick", "not-familiar"), ("fox", "familiar"), ("zebra", "not-familiar")] {
    call(
      &state,
      "POST",
      "/api/tags",
      Some(&token),
      Some(json!({ "userId": id, "phrase": phrase, "familiarity_level": level })),
    )
    .await;
  }

  let (status, json) = call(
    &state,
    "POST",
    "/api/rephrase",
    Some(&token),
    Some(json!({ "text": "The quick brown fox", "userId": id })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["rephrased_text"], "A fast brown fox.");
  assert_eq!(json["version"], 1);

  // Every tag that occurs in the original counts, whatever its level.
  let suggestions = json["suggestions"].as_array().unwrap();
  assert_eq!(suggestions.len(), 2);
  assert_eq!(suggestions[0]["phrase"], "quick");
  assert_eq!(suggestions[0]["position"], json!({ "start": 4, "end": 9 }));
  assert_eq!(suggestions[0]["alternatives"][0], "simpler version of quick");
  assert_eq!(suggestions[1]["phrase"], "fox");
  assert_eq!(suggestions[1]["position"], json!({ "start": 16, "end": 19 }));

  let prompts = prompts.lock().unwrap();
  assert_eq!(prompts.len(), 1);
  let prompt = &prompts[0];
  assert!(prompt.contains("User has accessibility need: dyslexia"));
  assert!(prompt.contains("Reading level: basic"));
  assert!(prompt.contains("Phrases the user is not familiar with: quick, zebra"));
  assert!(!prompt.contains("Preferred text complexity"));
  assert!(prompt.contains("Original text:\nThe quick brown fox"));
}

#[tokio::test]
async fn regenerate_against_model_records_model_text() {
  let (rephraser, _) = fake_model("Plain words.").await;
  let state = make_state(rephraser).await;
  let (id, token) = register(&state, json!({ "name": "Ada" })).await;
  let body = json!({ "text": "Verbose words.", "userId": id });

  call(&state, "POST", "/api/rephrase", Some(&token), Some(body.clone())).await;
  let (status, json) =
    call(&state, "POST", "/api/rephrase/regenerate", Some(&token), Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(json["version"], 2);
  assert_eq!(json["rephrased_text"], "Plain words.");

  let history = state.store.list_history(id).await.unwrap();
  assert_eq!(history[0].version, 2);
  assert_eq!(history[0].original_text, "Verbose words.");
  assert_eq!(history[0].rephrased_text, "Plain words.");
}
