//! Typed stream over a run's server-sent events.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::OpenAiError;
use crate::types::{ContentDelta, RunEvent, ToolCall};

/// Channel depth between the SSE reader task and the consumer.
const EVENT_CHANNEL_SIZE: usize = 32;

/// Stream of [`RunEvent`]s parsed from a streaming run response.
///
/// A spawned task reads the SSE body, splits it into frames, and feeds typed
/// events through a channel. The stream ends when the server sends its
/// terminal event or the connection closes.
///
/// Consumers should stop pulling after a `RequiresAction` or `RunFailed`
/// event: the server stops producing content at that point, and tool outputs
/// are submitted on a fresh stream.
#[derive(Debug)]
pub struct RunEventStream {
    receiver: mpsc::Receiver<Result<RunEvent, OpenAiError>>,
}

impl RunEventStream {
    /// Spawn a reader task over a streaming HTTP response.
    pub(crate) fn spawn(response: reqwest::Response) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);

        tokio::spawn(async move {
            read_sse_body(response, tx).await;
        });

        Self { receiver: rx }
    }
}

impl Stream for RunEventStream {
    type Item = Result<RunEvent, OpenAiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Read the response body, splitting on blank lines into SSE frames.
async fn read_sse_body(
    response: reqwest::Response,
    tx: mpsc::Sender<Result<RunEvent, OpenAiError>>,
) {
    let mut body = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(Err(OpenAiError::Http(e))).await;
                return;
            }
        };

        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            match parse_frame(&frame) {
                Ok(Some(event)) => {
                    if tx.send(Ok(event)).await.is_err() {
                        // Consumer dropped the stream.
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    }

    debug!("run event stream closed");
}

// Wire shapes for the frames we care about. Unknown frames are skipped.

#[derive(Debug, Deserialize)]
struct MessageDeltaFrame {
    delta: MessageDelta,
}

#[derive(Debug, Deserialize)]
struct MessageDelta {
    #[serde(default)]
    content: Vec<DeltaContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DeltaContent {
    Text {
        #[serde(default)]
        text: Option<TextValue>,
    },
    ImageFile {
        image_file: ImageFileRef,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageFileRef {
    file_id: String,
}

#[derive(Debug, Deserialize)]
struct RunFrame {
    id: String,
    thread_id: String,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<LastError>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct LastError {
    #[serde(default)]
    message: Option<String>,
}

/// Parse one SSE frame into a typed event.
///
/// Returns `Ok(None)` for frames that carry no event for the consumer
/// (comments, unknown event kinds, the terminal `done` marker).
fn parse_frame(frame: &str) -> Result<Option<RunEvent>, OpenAiError> {
    let mut event_name: Option<&str> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(rest) = line.strip_prefix("event:") {
            event_name = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start());
        }
    }

    let data = data_lines.join("\n");
    let Some(event_name) = event_name else {
        return Ok(None);
    };

    match event_name {
        "thread.message.delta" => {
            let frame: MessageDeltaFrame = serde_json::from_str(&data)
                .map_err(|e| OpenAiError::Stream(format!("bad message delta: {}", e)))?;

            let deltas: Vec<ContentDelta> = frame
                .delta
                .content
                .into_iter()
                .filter_map(|c| match c {
                    DeltaContent::Text { text } => {
                        text.and_then(|t| t.value).map(ContentDelta::Text)
                    }
                    DeltaContent::ImageFile { image_file } => Some(ContentDelta::ImageFile {
                        file_id: image_file.file_id,
                    }),
                    DeltaContent::Unknown => None,
                })
                .collect();

            if deltas.is_empty() {
                Ok(None)
            } else {
                Ok(Some(RunEvent::MessageDelta(deltas)))
            }
        }

        "thread.run.requires_action" => {
            let run: RunFrame = serde_json::from_str(&data)
                .map_err(|e| OpenAiError::Stream(format!("bad requires_action frame: {}", e)))?;

            let tool_calls = run
                .required_action
                .map(|a| a.submit_tool_outputs.tool_calls)
                .unwrap_or_default();

            if tool_calls.is_empty() {
                warn!(run_id = %run.id, "requires_action frame without tool calls");
            }

            Ok(Some(RunEvent::RequiresAction {
                thread_id: run.thread_id,
                run_id: run.id,
                tool_calls,
            }))
        }

        "thread.run.completed" => Ok(Some(RunEvent::RunCompleted)),

        "thread.run.failed" => {
            let run: RunFrame = serde_json::from_str(&data)
                .map_err(|e| OpenAiError::Stream(format!("bad run.failed frame: {}", e)))?;
            Ok(Some(RunEvent::RunFailed {
                message: run.last_error.and_then(|e| e.message),
            }))
        }

        "done" => Ok(None),

        other => {
            debug!(event = other, "skipping run event");
            Ok(None)
        }
    }
}
