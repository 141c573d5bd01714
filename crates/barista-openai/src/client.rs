//! LLM API client implementation.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::OpenAiError;
use crate::stream::RunEventStream;
use crate::types::{Assistant, ChatMessage, CreateAssistant, Thread, ToolOutput};

/// Production endpoint for the LLM API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Error envelope returned by the service.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the LLM API.
///
/// No total request timeout is set: streaming runs and slow reasoning models
/// both outlive any sensible fixed bound. Connections still time out after
/// ten seconds.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client for the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client for the given endpoint (used by tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");

        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Map a non-success response to an `OpenAiError`.
    async fn api_error(response: reqwest::Response) -> OpenAiError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        OpenAiError::Api { status, message }
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, OpenAiError> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    // ------------------------------------------------------------------
    // Assistants and threads
    // ------------------------------------------------------------------

    /// Create an assistant configured with function tools.
    pub async fn create_assistant(
        &self,
        request: &CreateAssistant,
    ) -> Result<Assistant, OpenAiError> {
        let response = self.post("/assistants").json(request).send().await?;
        let assistant: Assistant = Self::expect_json(response).await?;
        debug!(id = %assistant.id, "created assistant");
        Ok(assistant)
    }

    /// Retrieve an existing assistant by id.
    pub async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, OpenAiError> {
        let response = self
            .get(&format!("/assistants/{}", assistant_id))
            .send()
            .await?;
        Self::expect_json(response).await
    }

    /// Create a new conversation thread.
    pub async fn create_thread(&self) -> Result<Thread, OpenAiError> {
        let response = self.post("/threads").json(&json!({})).send().await?;
        let thread: Thread = Self::expect_json(response).await?;
        debug!(id = %thread.id, "created thread");
        Ok(thread)
    }

    /// Append a user message to a thread.
    pub async fn add_user_message(&self, thread_id: &str, text: &str) -> Result<(), OpenAiError> {
        let response = self
            .post(&format!("/threads/{}/messages", thread_id))
            .json(&json!({ "role": "user", "content": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Streaming runs
    // ------------------------------------------------------------------

    /// Start a streaming run on a thread.
    pub async fn stream_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunEventStream, OpenAiError> {
        let response = self
            .post(&format!("/threads/{}/runs", thread_id))
            .json(&json!({ "assistant_id": assistant_id, "stream": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(RunEventStream::spawn(response))
    }

    /// Submit tool outputs for a run waiting on them, resuming streaming.
    pub async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunEventStream, OpenAiError> {
        let response = self
            .post(&format!(
                "/threads/{}/runs/{}/submit_tool_outputs",
                thread_id, run_id
            ))
            .json(&json!({ "tool_outputs": outputs, "stream": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(RunEventStream::spawn(response))
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Run a plain chat completion and return the assistant text.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, OpenAiError> {
        let response = self
            .post("/chat/completions")
            .json(&json!({ "model": model, "messages": messages }))
            .send()
            .await?;

        let completion: ChatCompletion = Self::expect_json(response).await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAiError::EmptyCompletion(format!("model {}", model)))
    }

    /// Run a chat completion constrained to a JSON schema and deserialize
    /// the result.
    ///
    /// The service guarantees schema-conformant output when `strict` is set,
    /// but the guarantee is not absolute; a mismatch surfaces as
    /// [`OpenAiError::Schema`] so callers can decide whether to retry.
    pub async fn parse_structured<T: serde::de::DeserializeOwned>(
        &self,
        model: &str,
        messages: &[ChatMessage],
        schema_name: &str,
        schema: &Value,
    ) -> Result<T, OpenAiError> {
        let response = self
            .post("/chat/completions")
            .json(&json!({
                "model": model,
                "messages": messages,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {
                        "name": schema_name,
                        "strict": true,
                        "schema": schema,
                    }
                }
            }))
            .send()
            .await?;

        let completion: ChatCompletion = Self::expect_json(response).await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAiError::EmptyCompletion(format!("model {}", model)))?;

        serde_json::from_str(&content)
            .map_err(|e| OpenAiError::Schema(format!("{} ({}): {}", schema_name, e, content)))
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Download the content of a generated file (e.g. an image delta).
    pub async fn file_content(&self, file_id: &str) -> Result<Vec<u8>, OpenAiError> {
        let response = self
            .get(&format!("/files/{}/content", file_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
