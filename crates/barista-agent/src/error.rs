//! Error types for the assistant.

use thiserror::Error;

/// Errors from the chat session and bootstrap.
#[derive(Debug, Error)]
pub enum AgentError {
    /// LLM API failure.
    #[error("LLM API error: {0}")]
    OpenAi(#[from] barista_openai::OpenAiError),

    /// The configured assistant does not exist.
    #[error("assistant not found: {0}")]
    AssistantNotFound(String),
}
