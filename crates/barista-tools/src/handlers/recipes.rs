//! Recipe tools.

use serde_json::Value;
use tracing::warn;

use crate::registry::ToolState;
use crate::response::ToolResponse;

/// Generate a recipe with explanation for a coffee description.
pub async fn provide_recipe(state: &ToolState, coffee_description: &str) -> ToolResponse {
    match state.recipes.generate_explanation(coffee_description).await {
        // The output is a JSON-encoded string so the assistant gets one
        // opaque value rather than markdown it might re-wrap.
        Ok(explanation) => ToolResponse::success(Value::String(explanation).to_string()),
        Err(e) => {
            warn!(error = %e, "recipe generation failed");
            ToolResponse::error(format!("Error generating recipe: {}", e))
        }
    }
}

/// Extract a structured profile from a recipe explanation and save it to
/// the machine.
pub async fn save_recipe(state: &ToolState, recipe_description: &str) -> ToolResponse {
    let profile = match state.recipes.extract_profile(recipe_description).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "recipe extraction failed");
            return ToolResponse::error(format!("Error saving recipe: {}", e));
        }
    };

    match state.fellow.create_profile(&profile).await {
        Ok(created) => match serde_json::to_string(&created) {
            Ok(body) => ToolResponse::success(body),
            Err(e) => ToolResponse::error(format!("Error saving recipe: {}", e)),
        },
        Err(e) => {
            warn!(error = %e, title = %profile.title, "failed to save recipe profile");
            ToolResponse::error(format!("Error saving recipe: {}", e))
        }
    }
}
