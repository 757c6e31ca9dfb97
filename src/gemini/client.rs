//! HTTP transport for the Gemini generative-language API.
//!
//! Sends one prompt via: POST {base}/v1beta/models/{model}:generateContent
//!
//! Generation parameters favor determinism (low temperature) and a bounded
//! output size. Raw transport failures never escape this module; they are
//! classified into [`GeminiError`] at the failure site.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::GeminiError;
use crate::config::GeminiConfig;

/// Production endpoint for the generative-language API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Sampling temperature. Kept low so repeated analyses of the same post
/// score consistently.
const TEMPERATURE: f32 = 0.1;

/// Upper bound on generated output tokens.
const MAX_OUTPUT_TOKENS: u32 = 1000;

/// A backend that turns a prompt into generated text.
///
/// The service is generic over this seam so tests can script responses
/// without a network.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    /// Send one prompt and return the generated text, trimmed.
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}

/// reqwest-backed client for the Gemini API.
pub struct GeminiHttpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Create a client from the service configuration.
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("posigate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeminiError::Unknown(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Point the client at a different endpoint. Used by tests to target a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl TextGenerator for GeminiHttpClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status().as_u16();
        match status {
            200 => {}
            401 | 403 => {
                return Err(GeminiError::Authentication(format!(
                    "Gemini API rejected the credential (HTTP {})",
                    status
                )))
            }
            429 => {
                return Err(GeminiError::RateLimit(
                    "Gemini API rate limit exceeded (HTTP 429)".to_string(),
                ))
            }
            503 => {
                return Err(GeminiError::ServiceUnavailable(
                    "Gemini API unavailable (HTTP 503)".to_string(),
                ))
            }
            _ => {
                let detail = response.text().await.unwrap_or_default();
                return Err(classify_message(&format!("HTTP {}: {}", status, detail)));
            }
        }

        // The per-request timeout covers the body read too, so a stall here
        // must still surface as a timeout, not a decode failure.
        let decoded: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeminiError::Timeout("Gemini API response body timed out".to_string())
            } else {
                GeminiError::Unknown(format!("undecodable Gemini response: {}", e))
            }
        })?;

        let text = decoded.first_text();
        if text.trim().is_empty() {
            tracing::warn!(model = %self.model, "Gemini returned no usable text");
            return Err(GeminiError::ServiceUnavailable(
                "empty response from Gemini API".to_string(),
            ));
        }

        Ok(text.trim().to_string())
    }
}

/// Classify a transport-level failure.
///
/// A timeout is recognized by the error's identity; everything else falls
/// through to message classification.
fn classify_request_error(err: reqwest::Error) -> GeminiError {
    if err.is_timeout() {
        return GeminiError::Timeout("Gemini API request timed out".to_string());
    }
    classify_message(&err.to_string())
}

/// Classify an untyped failure by its message.
///
/// The checks form a priority list and their order is significant:
/// authentication, then rate limiting, then availability, then unknown.
pub(crate) fn classify_message(message: &str) -> GeminiError {
    let lower = message.to_lowercase();

    if lower.contains("api key") || lower.contains("api_key") || lower.contains("authentication")
    {
        return GeminiError::Authentication(message.to_string());
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return GeminiError::RateLimit(message.to_string());
    }

    if lower.contains("service unavailable") || lower.contains("503") {
        return GeminiError::ServiceUnavailable(message.to_string());
    }

    GeminiError::Unknown(message.to_string())
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or empty.
    fn first_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_message_authentication() {
        assert!(matches!(
            classify_message("API key not valid"),
            GeminiError::Authentication(_)
        ));
        assert!(matches!(
            classify_message("authentication required"),
            GeminiError::Authentication(_)
        ));
    }

    #[test]
    fn test_classify_message_rate_limit() {
        assert!(matches!(
            classify_message("rate limit exceeded for project"),
            GeminiError::RateLimit(_)
        ));
        assert!(matches!(
            classify_message("quota exhausted"),
            GeminiError::RateLimit(_)
        ));
    }

    #[test]
    fn test_classify_message_service_unavailable() {
        assert!(matches!(
            classify_message("service unavailable, try later"),
            GeminiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            classify_message("upstream returned 503"),
            GeminiError::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn test_classify_message_unknown_fallback() {
        assert!(matches!(
            classify_message("connection reset by peer"),
            GeminiError::Unknown(_)
        ));
    }

    #[test]
    fn test_classify_message_order_is_a_priority_list() {
        // Authentication outranks rate limiting.
        assert!(matches!(
            classify_message("API key quota check failed"),
            GeminiError::Authentication(_)
        ));
        // Rate limiting outranks availability.
        assert!(matches!(
            classify_message("503: rate limit exceeded"),
            GeminiError::RateLimit(_)
        ));
    }

    #[test]
    fn test_request_wire_format() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
        assert!(json["generationConfig"]["temperature"].as_f64().unwrap() < 0.2);
    }

    #[test]
    fn test_response_first_text() {
        let decoded: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "part one "}, {"text": "part two"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(decoded.first_text(), "part one part two");

        let empty: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.first_text(), "");

        let no_content: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": [{}]})).unwrap();
        assert_eq!(no_content.first_text(), "");
    }
}
