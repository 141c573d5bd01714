//! Profile tools.

use tracing::warn;

use crate::registry::ToolState;
use crate::response::ToolResponse;

pub async fn list_profiles(state: &ToolState) -> ToolResponse {
    match state.fellow.get_profiles().await {
        Ok(profiles) => match serde_json::to_string(&profiles) {
            Ok(body) => ToolResponse::success(body),
            Err(e) => ToolResponse::error(format!("Error listing profiles: {}", e)),
        },
        Err(e) => {
            warn!(error = %e, "list_profiles failed");
            ToolResponse::error(format!("Error listing profiles: {}", e))
        }
    }
}

pub async fn create_profile_from_link(state: &ToolState, link: &str) -> ToolResponse {
    let profile = match state.fellow.parse_brewlink(link).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, link, "failed to parse brew link");
            return ToolResponse::error(format!("Error creating profile from link: {}", e));
        }
    };

    match state.fellow.create_profile(&profile).await {
        Ok(created) => match serde_json::to_string(&created) {
            Ok(body) => ToolResponse::success(body),
            Err(e) => ToolResponse::error(format!("Error creating profile from link: {}", e)),
        },
        Err(e) => {
            warn!(error = %e, "failed to create profile from link");
            ToolResponse::error(format!("Error creating profile from link: {}", e))
        }
    }
}

pub async fn delete_profile_by_id(state: &ToolState, id: &str) -> ToolResponse {
    match state.fellow.delete_profile_by_id(id).await {
        Ok(()) => ToolResponse::success(
            serde_json::json!({ "status": "deleted", "id": id }).to_string(),
        ),
        Err(e) => {
            warn!(error = %e, id, "failed to delete profile");
            ToolResponse::error(format!("Error deleting profile: {}", e))
        }
    }
}

pub async fn generate_share_link(state: &ToolState, profile_id: &str) -> ToolResponse {
    match state.fellow.generate_share_link(profile_id).await {
        Ok(link) => ToolResponse::success(serde_json::json!({ "link": link }).to_string()),
        Err(e) => {
            warn!(error = %e, profile_id, "failed to generate share link");
            ToolResponse::error(format!("Error generating share link: {}", e))
        }
    }
}
