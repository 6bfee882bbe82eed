//! Request normalization.
//!
//! The caller payload is arbitrary-shaped JSON; resolution never fails.
//! Missing or unparseable fields fall back to documented defaults, numeric
//! fields are clamped to their valid ranges, and resolving an already
//! resolved config yields the same config.

use serde_json::Value;

use crate::simulation::types::ResearchConfig;

pub const DEFAULT_QUESTION: &str = "How do users feel about product changes?";
pub const DEFAULT_AUDIENCE: &str = "general users";
pub const DEFAULT_NUM_INTERVIEWS: usize = 5;
pub const MAX_NUM_INTERVIEWS: usize = 50;
pub const DEFAULT_NUM_QUESTIONS: usize = 3;

/// Normalize a raw caller payload into a canonical [`ResearchConfig`].
pub fn resolve(raw: &Value) -> ResearchConfig {
    let question = text_field(raw, &["question", "research_question"])
        .unwrap_or_else(|| DEFAULT_QUESTION.to_string());
    let audience = text_field(raw, &["audience", "target_demographic"])
        .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());

    let num_interviews = int_field(raw, &["numInterviews", "num_interviews"])
        .map(|n| n.clamp(1, MAX_NUM_INTERVIEWS as i64) as usize)
        .unwrap_or(DEFAULT_NUM_INTERVIEWS);

    let num_questions = int_field(raw, &["numQuestions", "num_questions"])
        .map(|n| n.max(1) as usize)
        .unwrap_or(DEFAULT_NUM_QUESTIONS);

    let provider_credential = text_field(
        raw,
        &["providerCredential", "provider_credential", "api_key"],
    );

    ResearchConfig {
        question,
        audience,
        num_interviews,
        num_questions,
        provider_credential,
    }
}

/// First non-blank string value under any of the given keys.
fn text_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Lenient integer extraction: JSON numbers (including floats) and numeric
/// strings are accepted; anything else is treated as absent.
fn int_field(raw: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().filter_map(|key| raw.get(key)).find_map(|value| {
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    })
}
