//! Service configuration.
//!
//! The API key is required and validated at construction time; a service
//! instance can never exist without one. Everything else has defaults that
//! match production use.

use crate::gemini::GeminiError;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default maximum number of attempts per request (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Immutable configuration for the analysis service.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Gemini API key. Never empty.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum attempts per request, retries included.
    pub max_attempts: u32,
}

impl GeminiConfig {
    /// Create a configuration with the given API key and default settings.
    ///
    /// Fails with an authentication error when the key is empty; a missing
    /// credential is fatal at construction, not deferred to the first call.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeminiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeminiError::Authentication(format!(
                "{} must not be empty",
                API_KEY_ENV
            )));
        }

        Ok(Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, GeminiError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            GeminiError::Authentication(format!(
                "{} environment variable is required",
                API_KEY_ENV
            ))
        })?;
        Self::new(api_key)
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Override the attempt budget. At least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_valid_key() {
        let config = GeminiConfig::new("test-key").unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = GeminiConfig::new("").unwrap_err();
        assert!(matches!(err, GeminiError::Authentication(_)));

        let err = GeminiConfig::new("   ").unwrap_err();
        assert!(matches!(err, GeminiError::Authentication(_)));
    }

    #[test]
    fn test_overrides() {
        let config = GeminiConfig::new("k")
            .unwrap()
            .with_model("gemini-1.5-pro")
            .with_timeout_ms(500)
            .with_max_attempts(1);

        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.max_attempts, 1);
    }
}
