//! Registry mapping tool requests to handlers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use barista_fellow::FellowClient;
use barista_openai::{FunctionSpec, OpenAiClient, ToolCall, ToolOutput};

use crate::definitions;
use crate::handlers::{device, profiles, recipes, webpage};
use crate::recipe::RecipeEngine;
use crate::request::{ToolParseError, ToolRequest};
use crate::response::ToolResponse;

/// Timeout for the webpage fetch tool.
const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for tool handlers.
pub struct ToolState {
    pub fellow: Arc<FellowClient>,
    pub recipes: RecipeEngine,
    /// Dedicated client for page fetches; unlike the API clients it carries
    /// a hard total timeout.
    pub page_fetcher: reqwest::Client,
}

/// Registry of the fixed tool set.
///
/// `execute` never returns an error: unknown names and bad arguments are
/// folded into corrective payloads, handler failures into structured error
/// payloads. The conversation loop cannot be taken down by a tool call.
pub struct ToolRegistry {
    state: ToolState,
}

impl ToolRegistry {
    pub fn new(fellow: Arc<FellowClient>, openai: Arc<OpenAiClient>) -> Self {
        let page_fetcher = reqwest::Client::builder()
            .timeout(PAGE_FETCH_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            state: ToolState {
                fellow,
                recipes: RecipeEngine::new(openai),
                page_fetcher,
            },
        }
    }

    /// The tool schemas, for assistant bootstrap.
    pub fn definitions() -> Vec<FunctionSpec> {
        definitions::definitions()
    }

    /// Execute one named tool call.
    pub async fn execute(&self, name: &str, arguments: &str) -> ToolResponse {
        let request = match ToolRequest::parse(name, arguments) {
            Ok(request) => request,
            Err(ToolParseError::UnknownTool(name)) => {
                warn!(tool = %name, "unrecognized tool requested");
                return ToolResponse::unrecognized();
            }
            Err(e @ ToolParseError::BadArguments { .. }) => {
                warn!(error = %e, "malformed tool arguments");
                return ToolResponse::error(format!("{}. Fix your request and try again.", e));
            }
        };

        info!(tool = request.tool_name(), "executing tool");
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: ToolRequest) -> ToolResponse {
        let state = &self.state;
        match request {
            ToolRequest::ListProfiles => profiles::list_profiles(state).await,
            ToolRequest::CreateProfileFromLink { link } => {
                profiles::create_profile_from_link(state, &link).await
            }
            ToolRequest::DeleteProfileById { id } => {
                profiles::delete_profile_by_id(state, &id).await
            }
            ToolRequest::GenerateShareLink { profile_id } => {
                profiles::generate_share_link(state, &profile_id).await
            }
            ToolRequest::GetDeviceName => device::get_device_name(state).await,
            ToolRequest::GetDeviceConfig { remote } => {
                device::get_device_config(state, remote).await
            }
            ToolRequest::ScrapeWebsite { url } => webpage::scrape_website(state, &url).await,
            ToolRequest::ProvideRecipe { coffee_description } => {
                recipes::provide_recipe(state, &coffee_description).await
            }
            ToolRequest::SaveRecipe { recipe_description } => {
                recipes::save_recipe(state, &recipe_description).await
            }
            ToolRequest::AdjustSetting { setting, value } => {
                device::adjust_setting(state, &setting, &value).await
            }
        }
    }

    /// Execute a batch of pending tool calls, keyed by call id.
    ///
    /// Calls run sequentially: the brewer session and the device config
    /// cache are shared, and batches are small.
    pub async fn dispatch_batch(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            let response = self.execute(&call.function.name, &call.function.arguments).await;
            if response.is_error {
                warn!(
                    tool = %call.function.name,
                    call_id = %call.id,
                    "tool call returned error payload"
                );
            }
            outputs.push(ToolOutput {
                tool_call_id: call.id.clone(),
                output: response.output,
            });
        }
        outputs
    }
}
