//! Prompt assembly for the rephrase model call.

use crate::{preference::Preference, tag::TaggedPhrase};

/// Everything the prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
  pub text:                 &'a str,
  pub accessibility_need:   Option<&'a str>,
  pub reading_level:        Option<&'a str>,
  pub preferred_complexity: Option<&'a str>,
  pub tagged:               &'a [TaggedPhrase],
}

impl<'a> PromptInput<'a> {
  /// Combine the request text with a user's (possibly absent) profile.
  pub fn new(
    text: &'a str,
    pref: Option<&'a Preference>,
    tagged: &'a [TaggedPhrase],
  ) -> Self {
    Self {
      text,
      accessibility_need: pref.and_then(|p| p.accessibility_need.as_deref()),
      reading_level: pref.and_then(|p| p.reading_level.as_deref()),
      preferred_complexity: pref.and_then(|p| p.preferred_complexity.as_deref()),
      tagged,
    }
  }
}

const INSTRUCTIONS: [&str; 4] = [
  "1. Replace or explain phrases the user is not familiar with",
  "2. Maintain the core meaning",
  "3. Adjust complexity to match user preferences",
  "4. Keep the text clear and concise",
];

/// Build the user message sent to the model.
///
/// Profile lines come first (need, reading level, complexity, unfamiliar
/// phrases), each only when present, then the original text and the fixed
/// instructions.
pub fn build_prompt(input: &PromptInput<'_>) -> String {
  let mut lines: Vec<String> = Vec::new();

  if let Some(need) = input.accessibility_need {
    lines.push(format!("User has accessibility need: {need}"));
  }
  if let Some(level) = input.reading_level {
    lines.push(format!("Reading level: {level}"));
  }
  if let Some(complexity) = input.preferred_complexity {
    lines.push(format!("Preferred text complexity: {complexity}"));
  }

  let unfamiliar: Vec<&str> = input
    .tagged
    .iter()
    .filter(|t| t.level.is_unfamiliar())
    .map(|t| t.phrase.as_str())
    .collect();
  if !unfamiliar.is_empty() {
    lines.push(format!(
      "Phrases the user is not familiar with: {}",
      unfamiliar.join(", ")
    ));
  }

  lines.push(format!("\nOriginal text:\n{}", input.text));
  lines.push(
    "\nPlease rephrase this text to be more accessible, considering:".into(),
  );
  lines.extend(INSTRUCTIONS.iter().map(|s| s.to_string()));
  lines.push(
    "\nReturn only the rephrased text without any additional commentary.".into(),
  );

  lines.join("\n")
}
