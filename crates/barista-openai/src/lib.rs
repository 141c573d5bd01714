//! HTTP client for the LLM assistant and completion APIs.
//!
//! Covers the surface the two applications need:
//!
//! - **Assistants**: create/retrieve an assistant configured with function
//!   tools
//! - **Threads**: create threads and append user messages
//! - **Runs**: start a streaming run, consume its server-sent events as a
//!   typed [`RunEventStream`], and submit tool outputs to resume streaming
//! - **Completions**: plain chat completions and JSON-schema constrained
//!   structured output
//! - **Files**: download file content for image deltas

mod client;
mod error;
mod stream;
mod types;

pub use client::{DEFAULT_BASE_URL, OpenAiClient};
pub use error::OpenAiError;
pub use stream::RunEventStream;
pub use types::{
    Assistant, AssistantTool, ChatMessage, ContentDelta, CreateAssistant, FunctionCall,
    FunctionSpec, RunEvent, Thread, ToolCall, ToolOutput,
};
