//! Tool output payloads.

use serde_json::json;

/// Error payload sent back when the LLM asks for a tool that doesn't exist.
/// Phrased as a corrective so the model can fix its own request.
pub const UNRECOGNIZED_TOOL_MESSAGE: &str = "Function name is not recognized. \
Make sure you submit the request with the correct structure. Fix your request and try again.";

/// The outcome of one tool invocation, ready to submit back to the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    /// Raw output string handed to the LLM (often JSON).
    pub output: String,
    pub is_error: bool,
}

impl ToolResponse {
    /// A successful output.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// A structured error payload: `{"status":"error","message":...}`.
    pub fn error(message: impl Into<String>) -> Self {
        let payload = json!({
            "status": "error",
            "message": message.into(),
        });
        Self {
            output: payload.to_string(),
            is_error: true,
        }
    }

    /// The payload for an unrecognized tool name.
    pub fn unrecognized() -> Self {
        Self::error(UNRECOGNIZED_TOOL_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_shape() {
        let response = ToolResponse::error("boom");
        let value: serde_json::Value = serde_json::from_str(&response.output).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["message"], "boom");
        assert!(response.is_error);
    }
}
