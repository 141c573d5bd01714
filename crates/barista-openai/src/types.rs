//! Wire types for the assistant and completion endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function tool exposed to the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub strict: bool,
    /// JSON schema for the function's arguments object.
    pub parameters: Value,
}

/// Tool wrapper in the shape the assistants endpoint expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantTool {
    Function { function: FunctionSpec },
}

impl From<FunctionSpec> for AssistantTool {
    fn from(function: FunctionSpec) -> Self {
        Self::Function { function }
    }
}

/// Request body for creating an assistant.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistant {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<AssistantTool>,
}

/// An assistant as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
}

/// A conversation thread handle.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// One chat-completion message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// A pending function call requested by a run.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

/// The function half of a tool call: name plus raw argument JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// A computed tool output keyed by its call id.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// One content fragment inside a message delta.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentDelta {
    /// Incremental assistant text.
    Text(String),
    /// A generated image, referenced by file id.
    ImageFile { file_id: String },
}

/// A typed event from a streaming run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Incremental message content.
    MessageDelta(Vec<ContentDelta>),
    /// The run is waiting for tool outputs; streaming has stopped.
    RequiresAction {
        thread_id: String,
        run_id: String,
        tool_calls: Vec<ToolCall>,
    },
    /// The run finished producing output.
    RunCompleted,
    /// The run failed; no further output will arrive.
    RunFailed { message: Option<String> },
}
