//! Input and response validation rules.
//!
//! Pure functions with no I/O and no shared state; safe to call from any
//! number of concurrent tasks. Invalid values fail with a typed
//! [`GeminiError`], never a panic.

use serde_json::Value;

use crate::gemini::GeminiError;

/// Maximum accepted length in characters, shared by input content and
/// generated suggestions.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Validate user-submitted content before it is embedded in a prompt.
///
/// The lower bound is checked against the trimmed text, the upper bound
/// against the raw text. Padding whitespace therefore still counts toward
/// the length limit.
pub fn validate_content(content: &str) -> Result<(), GeminiError> {
    if content.trim().is_empty() {
        return Err(GeminiError::InvalidInput("content is too short".to_string()));
    }

    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(GeminiError::InvalidInput(format!(
            "content exceeds maximum length of {} characters",
            MAX_CONTENT_LENGTH
        )));
    }

    Ok(())
}

/// Validate the decoded analysis response.
///
/// Expects a JSON object with an integer `score` in 0..=100 and a non-empty
/// string `reason`. No coercion: a score sent as a string or a fraction is a
/// parsing failure, and out-of-range scores are rejected rather than clamped.
pub fn validate_analysis_response(data: &Value) -> Result<(u8, String), GeminiError> {
    let object = data
        .as_object()
        .ok_or_else(|| GeminiError::Parsing("response is not a JSON object".to_string()))?;

    let score = object
        .get("score")
        .and_then(Value::as_i64)
        .filter(|s| (0..=100).contains(s))
        .ok_or_else(|| GeminiError::Parsing("invalid score in analysis response".to_string()))?;

    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| GeminiError::Parsing("invalid reason in analysis response".to_string()))?;

    Ok((score as u8, reason.to_string()))
}

/// Validate a generated suggestion: non-empty after trimming and within the
/// shared length limit.
pub fn validate_suggestion(suggestion: &str) -> Result<(), GeminiError> {
    if suggestion.trim().is_empty() {
        return Err(GeminiError::Parsing("suggestion is empty".to_string()));
    }

    if suggestion.chars().count() > MAX_CONTENT_LENGTH {
        return Err(GeminiError::Parsing(format!(
            "suggestion exceeds maximum length of {} characters",
            MAX_CONTENT_LENGTH
        )));
    }

    Ok(())
}
