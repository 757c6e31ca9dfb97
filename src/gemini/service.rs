//! Positivity analysis service.
//!
//! Orchestrates validation, prompt construction, the outbound call with its
//! retry policy, and response parsing. The service holds no mutable state;
//! any number of analyses may run concurrently on one instance.

use std::future::Future;
use std::time::Duration;

use super::client::{GeminiHttpClient, TextGenerator};
use super::{AnalysisResult, GeminiError};
use crate::config::GeminiConfig;
use crate::validation;

/// Scores at or above this value are judged positive.
pub const POSITIVE_THRESHOLD: u8 = 70;

/// Base backoff delay in milliseconds (first retry waits this long).
const BACKOFF_BASE_MS: u64 = 1000;

/// Backoff delay ceiling in milliseconds.
const BACKOFF_CAP_MS: u64 = 8000;

/// Positivity analysis service backed by a text generator.
///
/// Generic over the generator seam; production code uses the default
/// [`GeminiHttpClient`], tests inject scripted generators.
pub struct GeminiService<C = GeminiHttpClient> {
    config: GeminiConfig,
    generator: C,
}

impl GeminiService<GeminiHttpClient> {
    /// Create a service with the HTTP transport.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let generator = GeminiHttpClient::new(&config)?;
        Ok(Self { config, generator })
    }

    /// Create a service from the process environment.
    ///
    /// Fails fast with an authentication error when the API key is absent.
    pub fn from_env() -> Result<Self, GeminiError> {
        Self::new(GeminiConfig::from_env()?)
    }
}

impl<C: TextGenerator> GeminiService<C> {
    /// Create a service with a custom generator backend.
    pub fn with_generator(config: GeminiConfig, generator: C) -> Self {
        Self { config, generator }
    }

    /// Score how positive `content` reads.
    ///
    /// When the score falls below [`POSITIVE_THRESHOLD`], a rewritten
    /// suggestion is fetched with a second full request; a failure there is
    /// the overall call's failure.
    pub async fn analyze_positivity(&self, content: &str) -> Result<AnalysisResult, GeminiError> {
        validation::validate_content(content)?;

        let prompt = build_analysis_prompt(content);
        let response = self
            .with_retry(|| self.generator.generate(&prompt))
            .await?;

        let (score, reason) = parse_analysis_response(&response)?;
        let is_positive = score >= POSITIVE_THRESHOLD;

        let suggestion = if is_positive {
            None
        } else {
            Some(self.generate_suggestion(content).await?)
        };

        Ok(AnalysisResult {
            is_positive,
            score,
            reason,
            suggestion,
        })
    }

    /// Rewrite `content` into a more positive form, preserving its intent
    /// and approximate length.
    pub async fn generate_suggestion(&self, content: &str) -> Result<String, GeminiError> {
        validation::validate_content(content)?;

        let prompt = build_suggestion_prompt(content);
        let suggestion = self
            .with_retry(|| self.generator.generate(&prompt))
            .await?;

        validation::validate_suggestion(&suggestion)?;
        Ok(suggestion.trim().to_string())
    }

    /// Run `operation` with bounded retries and exponential backoff.
    ///
    /// Only transient failures (timeout, rate limit, unavailability) are
    /// retried; everything else surfaces immediately. When the attempt
    /// budget runs out the last error is returned unchanged.
    async fn with_retry<T, F, Fut>(&self, mut operation: F) -> Result<T, GeminiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GeminiError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt: u32 = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= max_attempts || !err.is_retryable() {
                        return Err(err);
                    }

                    let delay = backoff_delay(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying Gemini request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Delay before the retry that follows `attempt`: 1s, 2s, 4s, capped at 8s.
fn backoff_delay(attempt: u32) -> Duration {
    let exponent = (attempt - 1).min(13);
    Duration::from_millis((BACKOFF_BASE_MS << exponent).min(BACKOFF_CAP_MS))
}

/// Build the scoring prompt. The post is embedded verbatim; the prompt is
/// free text, not code, so no escaping is applied.
fn build_analysis_prompt(content: &str) -> String {
    format!(
        r#"You are an expert at rating the positivity of social posts.
Score the following post from 0 to 100 using these bands:

High (70-100):
- expresses gratitude, joy, or hope
- constructive and forward-looking
- considerate or caring toward others
- shows learning or growth

Middle (40-69):
- neutral information sharing
- objective statements of fact
- minor complaints or inconveniences

Low (0-39):
- strong criticism, venting, or negative emotion
- aggressive or demeaning wording
- despairing content
- likely to make readers uncomfortable

Post: "{content}"

Reply with JSON in exactly this shape and no other text:
{{
  "score": 85,
  "reason": "short rationale for the score"
}}"#
    )
}

/// Build the rewrite prompt for negative posts.
fn build_suggestion_prompt(content: &str) -> String {
    format!(
        r#"You are an expert at rewriting posts into a more positive, constructive form.

Keep the intent of the original post while you:
- turn negative wording into positive wording
- turn criticism into constructive proposals
- calm emotionally charged phrasing
- remove wording that could make readers uncomfortable
- keep the length close to the original

Original post: "{content}"

Reply with only the rewritten post, no preamble or explanation:"#
    )
}

/// Extract and validate the scoring payload from the model's reply.
///
/// Takes the greedy first-`{` to last-`}` substring, so prose around a
/// single JSON object is tolerated. A reply containing several objects
/// would be captured as one span; that matches the upstream contract and
/// is deliberately left as-is.
fn parse_analysis_response(response: &str) -> Result<(u8, String), GeminiError> {
    let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) else {
        return Err(GeminiError::Parsing(
            "no JSON object in analysis response".to_string(),
        ));
    };
    if end < start {
        return Err(GeminiError::Parsing(
            "no JSON object in analysis response".to_string(),
        ));
    }

    let data: serde_json::Value = serde_json::from_str(&response[start..=end])
        .map_err(|e| GeminiError::Parsing(format!("malformed JSON in analysis response: {}", e)))?;

    validation::validate_analysis_response(&data)
}
