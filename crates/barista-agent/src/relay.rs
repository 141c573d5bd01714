//! Streaming response relay.
//!
//! Consumes a run's event stream and forwards displayable chunks to the
//! caller. A `requires_action` event halts the relay and queues the pending
//! tool batch; a `failed` event halts it with nothing queued. The relay
//! never dispatches tools itself — that happens between streams, in
//! [`crate::ChatSession::run_turn`].

use futures_util::StreamExt;
use tracing::{debug, error, info};

use barista_openai::{ContentDelta, OpenAiClient, RunEvent, RunEventStream, ToolCall};

use crate::error::AgentError;

/// A displayable piece of assistant output.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantChunk {
    /// Incremental text.
    Text(String),
    /// A rendered image.
    Image(Vec<u8>),
}

/// A tool batch waiting for dispatch, with the ids needed to resume the run.
#[derive(Debug, Clone)]
pub struct PendingToolBatch {
    pub thread_id: String,
    pub run_id: String,
    pub calls: Vec<ToolCall>,
}

/// Relay one stream until it completes, fails, or halts for tool outputs.
///
/// Returns the accumulated assistant text. When the run halts for tools,
/// the batch lands in `pending` and — if the stream produced no content
/// yet — a short progress note is emitted so the user sees that work is
/// happening.
pub async fn relay_stream(
    stream: &mut RunEventStream,
    openai: &OpenAiClient,
    pending: &mut Vec<PendingToolBatch>,
    on_chunk: &mut (dyn FnMut(AssistantChunk) + Send),
) -> Result<String, AgentError> {
    let mut accumulated = String::new();
    let mut content_produced = false;

    while let Some(event) = stream.next().await {
        match event? {
            RunEvent::MessageDelta(deltas) => {
                for delta in deltas {
                    match delta {
                        ContentDelta::Text(value) => {
                            accumulated.push_str(&value);
                            content_produced = true;
                            on_chunk(AssistantChunk::Text(value));
                        }
                        ContentDelta::ImageFile { file_id } => {
                            debug!(file_id = %file_id, "resolving image delta");
                            let bytes = openai.file_content(&file_id).await?;
                            content_produced = true;
                            on_chunk(AssistantChunk::Image(bytes));
                        }
                    }
                }
            }

            RunEvent::RequiresAction {
                thread_id,
                run_id,
                tool_calls,
            } => {
                info!(
                    run_id = %run_id,
                    tools = tool_calls.len(),
                    "run requires tool outputs"
                );
                if !content_produced
                    && let Some(first) = tool_calls.first()
                {
                    on_chunk(AssistantChunk::Text(format!(
                        "Executing {}...",
                        first.function.name
                    )));
                }
                pending.push(PendingToolBatch {
                    thread_id,
                    run_id,
                    calls: tool_calls,
                });
                // Streaming stops here; the dispatch loop resumes it.
                return Ok(accumulated);
            }

            RunEvent::RunFailed { message } => {
                error!(message = message.as_deref().unwrap_or("unknown"), "run failed");
                return Ok(accumulated);
            }

            RunEvent::RunCompleted => {
                debug!("run completed");
            }
        }
    }

    Ok(accumulated)
}
