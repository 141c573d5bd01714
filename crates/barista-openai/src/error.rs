//! Error types for the LLM API client.

use thiserror::Error;

/// Errors that can occur when talking to the LLM API.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API error from the service.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The event stream broke or delivered an unparseable frame.
    #[error("stream error: {0}")]
    Stream(String),

    /// A completion came back without the expected content.
    #[error("empty completion: {0}")]
    EmptyCompletion(String),

    /// Structured output did not match the requested schema.
    #[error("schema mismatch: {0}")]
    Schema(String),
}
