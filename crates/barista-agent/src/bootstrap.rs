//! Assistant bootstrap.
//!
//! Creates the assistant with the registry's tool definitions. Run once;
//! the printed id goes into `OPENAI_ASSISTANT_ID` or the config file.

use tracing::info;

use barista_openai::{Assistant, CreateAssistant, OpenAiClient};
use barista_tools::ToolRegistry;

use crate::error::AgentError;

pub const ASSISTANT_NAME: &str = "Aiden Coffee Assistant";
pub const ASSISTANT_MODEL: &str = "gpt-4o";

pub const ASSISTANT_INSTRUCTIONS: &str = "You are a coffee machine assistant. Users may request \
list/create/delete coffee profiles, share links, etc. Use the function tools to handle. \
Return final answers in plain text.";

/// Create the assistant and return it.
pub async fn create_assistant(openai: &OpenAiClient) -> Result<Assistant, AgentError> {
    let request = CreateAssistant {
        name: ASSISTANT_NAME.to_string(),
        instructions: ASSISTANT_INSTRUCTIONS.to_string(),
        model: ASSISTANT_MODEL.to_string(),
        tools: ToolRegistry::definitions()
            .into_iter()
            .map(Into::into)
            .collect(),
    };

    let assistant = openai.create_assistant(&request).await?;
    info!(id = %assistant.id, "created assistant");
    Ok(assistant)
}

/// Verify an assistant id resolves to a real assistant.
pub async fn verify_assistant(
    openai: &OpenAiClient,
    assistant_id: &str,
) -> Result<Assistant, AgentError> {
    openai
        .retrieve_assistant(assistant_id)
        .await
        .map_err(|e| match e {
            barista_openai::OpenAiError::Api { status: 404, .. } => {
                AgentError::AssistantNotFound(assistant_id.to_string())
            }
            other => AgentError::OpenAi(other),
        })
}
