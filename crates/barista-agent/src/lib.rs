//! Conversational brew assistant.
//!
//! Wires the LLM client and the tool registry into a chat session. The
//! heart of the crate is the two-phase turn protocol:
//!
//! 1. stream a run, forwarding text and image chunks as they arrive;
//! 2. when the run halts for tool outputs, dispatch the queued batch and
//!    resume streaming on the submission stream — repeating until no batch
//!    remains.

mod bootstrap;
mod error;
mod relay;
mod session;

pub use bootstrap::{
    ASSISTANT_INSTRUCTIONS, ASSISTANT_MODEL, ASSISTANT_NAME, create_assistant, verify_assistant,
};
pub use error::AgentError;
pub use relay::{AssistantChunk, PendingToolBatch, relay_stream};
pub use session::{ChatRole, ChatSession, GREETING, StoredMessage};
