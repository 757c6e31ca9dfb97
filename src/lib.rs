//! Posigate - positivity gate for user posts.
//!
//! Posigate scores how positive a piece of text reads (0-100) using the
//! Gemini generative-language API and, for text that falls below the
//! positivity threshold, produces a rewritten suggestion that keeps the
//! original intent while removing the negativity.
//!
//! # Architecture
//!
//! - `config`: service configuration (API key, model, timeout, retry budget)
//! - `validation`: pure input/response validation rules
//! - `gemini`: the analysis service, HTTP transport, and error taxonomy
//! - `cli`: command-line driver
//!
//! All failures cross the service boundary as [`GeminiError`], a closed
//! enumeration that callers (route handlers, the CLI) map to user-visible
//! behavior.

pub mod cli;
pub mod config;
pub mod gemini;
pub mod validation;

pub use config::GeminiConfig;
pub use gemini::{AnalysisResult, GeminiError, GeminiHttpClient, GeminiService, TextGenerator};
