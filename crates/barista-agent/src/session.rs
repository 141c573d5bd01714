//! Chat session state and the two-phase turn protocol.

use std::sync::Arc;

use tracing::{debug, info};

use barista_openai::OpenAiClient;
use barista_tools::ToolRegistry;

use crate::error::AgentError;
use crate::relay::{AssistantChunk, PendingToolBatch, relay_stream};

/// Opening message shown before the first user turn.
pub const GREETING: &str = "Hey, I am Aiden! You can ask me about different coffees using URLs \
or descriptions. I can access your existing profiles, generate new ones and save them for \
brewing. How can I help?";

/// Who said a mirrored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the local message mirror (for display and scrollback).
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A conversation with the assistant.
///
/// Owns the thread id, a local mirror of the message history, and the
/// pending tool batches between the streaming and dispatch phases. All the
/// real conversation state lives server-side in the thread; the mirror only
/// feeds the UI.
pub struct ChatSession {
    openai: Arc<OpenAiClient>,
    registry: Arc<ToolRegistry>,
    assistant_id: String,
    thread_id: Option<String>,
    messages: Vec<StoredMessage>,
    pending: Vec<PendingToolBatch>,
}

impl ChatSession {
    pub fn new(
        openai: Arc<OpenAiClient>,
        registry: Arc<ToolRegistry>,
        assistant_id: impl Into<String>,
    ) -> Self {
        Self {
            openai,
            registry,
            assistant_id: assistant_id.into(),
            thread_id: None,
            messages: vec![StoredMessage {
                role: ChatRole::Assistant,
                content: GREETING.to_string(),
            }],
            pending: Vec::new(),
        }
    }

    /// The mirrored message history, greeting included.
    pub fn messages(&self) -> &[StoredMessage] {
        &self.messages
    }

    /// Run one user turn: stream, dispatch tools, resume, repeat.
    ///
    /// `on_chunk` receives every displayable chunk as it arrives. The call
    /// returns once the assistant has nothing further to stream.
    pub async fn run_turn(
        &mut self,
        user_text: &str,
        on_chunk: &mut (dyn FnMut(AssistantChunk) + Send),
    ) -> Result<(), AgentError> {
        self.messages.push(StoredMessage {
            role: ChatRole::User,
            content: user_text.to_string(),
        });

        let thread_id = match &self.thread_id {
            Some(id) => id.clone(),
            None => {
                let thread = self.openai.create_thread().await?;
                info!(thread_id = %thread.id, "created new thread");
                self.thread_id = Some(thread.id.clone());
                thread.id
            }
        };

        self.openai.add_user_message(&thread_id, user_text).await?;

        let mut stream = self.openai.stream_run(&thread_id, &self.assistant_id).await?;
        let text = relay_stream(&mut stream, &self.openai, &mut self.pending, on_chunk).await?;
        self.mirror_assistant(text);

        // Dispatch phase: every halt queued exactly one batch; submitting
        // its outputs opens the next stream, which may halt again.
        while let Some(batch) = self.pop_pending() {
            debug!(run_id = %batch.run_id, tools = batch.calls.len(), "dispatching tool batch");
            let outputs = self.registry.dispatch_batch(&batch.calls).await;

            let mut stream = self
                .openai
                .submit_tool_outputs_stream(&batch.thread_id, &batch.run_id, &outputs)
                .await?;
            let text =
                relay_stream(&mut stream, &self.openai, &mut self.pending, on_chunk).await?;
            self.mirror_assistant(text);
        }

        Ok(())
    }

    fn pop_pending(&mut self) -> Option<PendingToolBatch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    fn mirror_assistant(&mut self, text: String) {
        if !text.is_empty() {
            self.messages.push(StoredMessage {
                role: ChatRole::Assistant,
                content: text,
            });
        }
    }
}
