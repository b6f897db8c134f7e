//! Alternative-phrasing hints for tagged phrases.
//!
//! Positions always index into the text the user submitted, not the
//! rephrased output, and only the first occurrence of each phrase is
//! reported.

use serde::{Deserialize, Serialize};

use crate::tag::TaggedPhrase;

/// Half-open `[start, end)` range, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub start: usize,
  pub end:   usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
  pub phrase:       String,
  pub alternatives: Vec<String>,
  pub position:     Position,
}

/// Canned alternatives offered for a phrase found in the text.
pub fn alternatives_for(phrase: &str) -> Vec<String> {
  vec![
    format!("simpler version of {phrase}"),
    format!("easier way to say {phrase}"),
    format!("another way: {phrase}"),
  ]
}

/// Locate the first occurrence of `phrase` in `text`.
pub fn find_phrase(text: &str, phrase: &str) -> Option<Position> {
  if phrase.is_empty() {
    return None;
  }
  let byte_start = text.find(phrase)?;
  let start = text[..byte_start].chars().count();
  Some(Position { start, end: start + phrase.chars().count() })
}

/// One suggestion per tagged phrase that appears in `original`, in the order
/// the phrases were given. Phrases that do not appear are skipped.
pub fn extract_suggestions(original: &str, tagged: &[TaggedPhrase]) -> Vec<Suggestion> {
  tagged
    .iter()
    .filter_map(|t| {
      find_phrase(original, &t.phrase).map(|position| Suggestion {
        phrase: t.phrase.clone(),
        alternatives: alternatives_for(&t.phrase),
        position,
      })
    })
    .collect()
}

/// A suggestion for a phrase on its own, spanning the whole phrase.
pub fn phrase_suggestion(phrase: &str) -> Suggestion {
  Suggestion {
    phrase:       phrase.to_owned(),
    alternatives: vec![
      format!("Simpler: {phrase}"),
      format!("Easier: {phrase}"),
      format!("Plain language: {phrase}"),
    ],
    position:     Position { start: 0, end: phrase.chars().count() },
  }
}
