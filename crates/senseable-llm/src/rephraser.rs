//! [`Rephraser`]: the model call with its deterministic fallback.

use crate::{ChatClient, Error, ModelConfig};

/// Prefix of the text returned when the model is unavailable.
pub const FALLBACK_PREFIX: &str = "[Simplified] ";

/// What a rephrase produced, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Rephrasing {
  /// The model answered.
  Model { text: String, raw: String },
  /// The model was unconfigured or failed; `text` is the prefixed original.
  Fallback { text: String },
}

impl Rephrasing {
  pub fn fallback(original: &str) -> Self {
    Self::Fallback { text: format!("{FALLBACK_PREFIX}{original}") }
  }

  pub fn text(&self) -> &str {
    match self {
      Self::Model { text, .. } | Self::Fallback { text } => text,
    }
  }

  pub fn into_text(self) -> String {
    match self {
      Self::Model { text, .. } | Self::Fallback { text } => text,
    }
  }

  /// Raw model output, when there was one.
  pub fn raw(&self) -> Option<&str> {
    match self {
      Self::Model { raw, .. } => Some(raw),
      Self::Fallback { .. } => None,
    }
  }

  pub fn is_fallback(&self) -> bool { matches!(self, Self::Fallback { .. }) }
}

/// Built once at start-up and shared by every request.
#[derive(Clone)]
pub struct Rephraser {
  client: Option<ChatClient>,
}

impl Rephraser {
  /// A rephraser for `config`. A missing key, or a client that cannot be
  /// built, leaves the rephraser permanently on the fallback.
  pub fn from_config(config: &ModelConfig) -> Self {
    match ChatClient::new(config) {
      Ok(client) => {
        tracing::info!(model = %config.model, base_url = %config.base_url, "model client ready");
        Self { client: Some(client) }
      }
      Err(Error::MissingApiKey) => {
        tracing::info!("no model API key configured; rephrasing will use the fallback");
        Self::disabled()
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to build model client; rephrasing will use the fallback");
        Self::disabled()
      }
    }
  }

  /// A rephraser that always falls back.
  pub fn disabled() -> Self { Self { client: None } }

  pub fn is_enabled(&self) -> bool { self.client.is_some() }

  /// Rephrase `original` using `prompt`. Never fails.
  pub async fn rephrase(&self, original: &str, prompt: &str) -> Rephrasing {
    let Some(client) = &self.client else {
      return Rephrasing::fallback(original);
    };

    match client.complete(prompt).await {
      Ok(completion) => Rephrasing::Model { text: completion.content, raw: completion.raw },
      Err(e) => {
        tracing::warn!(error = %e, "model call failed; returning fallback rephrasing");
        Rephrasing::fallback(original)
      }
    }
  }
}
