//! Webpage fetch tool.

use tracing::warn;

use crate::registry::ToolState;
use crate::response::ToolResponse;

/// Fetch a URL and return the raw body as the tool output.
pub async fn scrape_website(state: &ToolState, url: &str) -> ToolResponse {
    let result = async {
        let response = state.page_fetcher.get(url).send().await?;
        let response = response.error_for_status()?;
        response.text().await
    }
    .await;

    match result {
        Ok(body) => ToolResponse::success(body),
        Err(e) => {
            warn!(error = %e, url, "webpage fetch failed");
            ToolResponse::error(format!("Error fetching '{}': {}", url, e))
        }
    }
}
