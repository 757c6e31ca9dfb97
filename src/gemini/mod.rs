//! Gemini-backed positivity analysis.
//!
//! The service scores a post's positivity (0-100) and, below the threshold,
//! asks for a rewritten suggestion. Every failure is normalized into
//! [`GeminiError`], the only failure type that crosses this module's
//! boundary.

mod client;
mod service;

pub use client::{GeminiHttpClient, TextGenerator};
pub use service::{GeminiService, POSITIVE_THRESHOLD};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by validation, transport, and response handling.
///
/// The set is closed: callers can match exhaustively to decide how a failure
/// is surfaced. Each variant carries a human-readable detail message.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl GeminiError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Structural problems (bad input, unparsable responses) and bad
    /// credentials never recover on retry; only transient transport
    /// conditions do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::Timeout(_)
                | GeminiError::RateLimit(_)
                | GeminiError::ServiceUnavailable(_)
        )
    }

    /// The HTTP status a route handler should answer with.
    ///
    /// Authentication maps to 500: a missing or rejected server credential
    /// is a deployment problem, never the client's fault.
    pub fn http_status(&self) -> u16 {
        match self {
            GeminiError::InvalidInput(_) => 400,
            GeminiError::RateLimit(_) => 429,
            GeminiError::Timeout(_) | GeminiError::ServiceUnavailable(_) => 503,
            GeminiError::Parsing(_) => 502,
            GeminiError::Authentication(_) | GeminiError::Unknown(_) => 500,
        }
    }
}

/// Outcome of one positivity analysis.
///
/// `suggestion` is present exactly when the text was judged negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// True when `score` reached the positivity threshold.
    pub is_positive: bool,
    /// Positivity score, 0-100.
    pub score: u8,
    /// Short rationale returned by the model.
    pub reason: String,
    /// Rewritten version of the post, only for negative results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(GeminiError::Timeout("t".into()).is_retryable());
        assert!(GeminiError::RateLimit("r".into()).is_retryable());
        assert!(GeminiError::ServiceUnavailable("s".into()).is_retryable());

        assert!(!GeminiError::Authentication("a".into()).is_retryable());
        assert!(!GeminiError::InvalidInput("i".into()).is_retryable());
        assert!(!GeminiError::Parsing("p".into()).is_retryable());
        assert!(!GeminiError::Unknown("u".into()).is_retryable());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(GeminiError::InvalidInput("i".into()).http_status(), 400);
        assert_eq!(GeminiError::RateLimit("r".into()).http_status(), 429);
        assert_eq!(GeminiError::Timeout("t".into()).http_status(), 503);
        assert_eq!(GeminiError::ServiceUnavailable("s".into()).http_status(), 503);
        assert_eq!(GeminiError::Parsing("p".into()).http_status(), 502);
        assert_eq!(GeminiError::Authentication("a".into()).http_status(), 500);
        assert_eq!(GeminiError::Unknown("u".into()).http_status(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = GeminiError::RateLimit("quota exhausted".into());
        assert_eq!(err.to_string(), "rate limit exceeded: quota exhausted");
    }

    #[test]
    fn test_result_serialization_omits_missing_suggestion() {
        let result = AnalysisResult {
            is_positive: true,
            score: 85,
            reason: "grateful and forward-looking".to_string(),
            suggestion: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("suggestion"));

        let result = AnalysisResult {
            suggestion: Some("softer wording".to_string()),
            is_positive: false,
            score: 40,
            reason: "harsh".to_string(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("suggestion"));
    }
}
