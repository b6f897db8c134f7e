//! [`ModelConfig`]: where the chat-completions endpoint lives and how it is
//! called. Read from the `[model]` table of the server config.

use std::fmt;

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Model settings. Generation parameters are fixed per deployment, never per
/// request.
#[derive(Clone, Deserialize)]
pub struct ModelConfig {
  /// Without a key every rephrase uses the fallback.
  #[serde(default)]
  pub api_key:      Option<String>,
  /// Base of the OpenAI-compatible API; `/chat/completions` is appended.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_temperature")]
  pub temperature:  f32,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:   u32,
  /// Upper bound on the whole model call, in seconds.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 1000 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      api_key:      None,
      base_url:     default_base_url(),
      model:        default_model(),
      temperature:  default_temperature(),
      max_tokens:   default_max_tokens(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ModelConfig {
  /// The configured key, ignoring blank values.
  pub fn api_key(&self) -> Option<&str> {
    self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
  }
}

// Keep the key out of logs.
impl fmt::Debug for ModelConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ModelConfig")
      .field("api_key", &self.api_key().map(|_| "<redacted>"))
      .field("base_url", &self.base_url)
      .field("model", &self.model)
      .field("temperature", &self.temperature)
      .field("max_tokens", &self.max_tokens)
      .field("timeout_secs", &self.timeout_secs)
      .finish()
  }
}
