//! [`ChatClient`]: a minimal OpenAI chat-completions client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, ModelConfig, Result};

const SYSTEM_PROMPT: &str = "You are an AI assistant helping users with \
                             accessibility needs to understand text better.";

/// Async client for one chat-completions endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ChatClient {
  http:        Client,
  api_key:     String,
  endpoint:    String,
  model:       String,
  temperature: f32,
  max_tokens:  u32,
}

/// A successful model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
  /// First choice's message content, trimmed.
  pub content: String,
  /// The response body exactly as received.
  pub raw:     String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    [ChatMessage<'a>; 2],
  temperature: f32,
  max_tokens:  u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
  content: Option<String>,
}

impl ChatClient {
  /// Build a client from `config`. Fails with [`Error::MissingApiKey`] when
  /// no key is configured.
  pub fn new(config: &ModelConfig) -> Result<Self> {
    let api_key = config.api_key().ok_or(Error::MissingApiKey)?.to_owned();
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;

    Ok(Self {
      http,
      api_key,
      endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
      model: config.model.clone(),
      temperature: config.temperature,
      max_tokens: config.max_tokens,
    })
  }

  /// Send `prompt` as the user message. Exactly one HTTP attempt is made.
  pub async fn complete(&self, prompt: &str) -> Result<Completion> {
    let body = ChatRequest {
      model:       &self.model,
      messages:    [
        ChatMessage { role: "system", content: SYSTEM_PROMPT },
        ChatMessage { role: "user", content: prompt },
      ],
      temperature: self.temperature,
      max_tokens:  self.max_tokens,
    };

    let response = self
      .http
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    let raw = response.text().await?;
    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), body: raw });
    }

    let parsed: ChatResponse = serde_json::from_str(&raw)?;
    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty())
      .ok_or(Error::EmptyResponse)?;

    Ok(Completion { content, raw })
  }
}
