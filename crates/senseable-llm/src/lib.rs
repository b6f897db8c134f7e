//! Language-model client for SenseAble.
//!
//! [`ChatClient`] talks to an OpenAI-compatible chat-completions endpoint.
//! [`Rephraser`] wraps it so callers never see a model failure: when no API
//! key is configured, or the single attempt fails for any reason, the
//! original text comes back prefixed with `"[Simplified] "`.

mod client;
mod config;
mod rephraser;

pub mod error;

pub use client::{ChatClient, Completion};
pub use config::ModelConfig;
pub use error::{Error, Result};
pub use rephraser::{FALLBACK_PREFIX, Rephraser, Rephrasing};
