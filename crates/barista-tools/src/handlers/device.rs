//! Device tools.

use serde_json::Value;
use tracing::warn;

use crate::registry::ToolState;
use crate::response::ToolResponse;

pub async fn get_device_name(state: &ToolState) -> ToolResponse {
    match state.fellow.get_display_name().await {
        Ok(name) if !name.is_empty() => ToolResponse::success(name),
        Ok(_) => ToolResponse::success("Unknown Brewer Name"),
        Err(e) => {
            warn!(error = %e, "failed to fetch device name");
            ToolResponse::error(format!("Error getting device name: {}", e))
        }
    }
}

pub async fn get_device_config(state: &ToolState, remote: bool) -> ToolResponse {
    match state.fellow.get_device_config(remote).await {
        Ok(config) => ToolResponse::success(config.to_string()),
        Err(e) => {
            warn!(error = %e, "failed to fetch device config");
            ToolResponse::error(format!("Error getting device config: {}", e))
        }
    }
}

/// Adjust a setting from a loose description.
///
/// The live config (not the cache) feeds the alignment call: a stale key
/// set would poison the inference.
pub async fn adjust_setting(state: &ToolState, setting: &str, value: &str) -> ToolResponse {
    let config = match state.fellow.get_device_config(true).await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "failed to fetch device config for setting inference");
            return ToolResponse::error(format!("Error adjusting device setting: {}", e));
        }
    };

    let alignment = match state.recipes.infer_setting(&config, setting, value).await {
        Ok(alignment) => alignment,
        Err(e) => {
            warn!(error = %e, setting, "failed to infer setting from context");
            return ToolResponse::error("Failed to infer setting from context");
        }
    };

    match state
        .fellow
        .adjust_setting(&alignment.setting, &coerce_value(&alignment.value))
        .await
    {
        Ok(()) => ToolResponse::success("Successfully adjusted setting"),
        Err(e) => {
            warn!(error = %e, setting = %alignment.setting, "failed to adjust setting");
            ToolResponse::error(format!("Error adjusting device setting: {}", e))
        }
    }
}

/// The alignment call returns the value as a string; the device API wants
/// real JSON types.
fn coerce_value(value: &str) -> Value {
    let trimmed = value.trim();
    match trimmed {
        "true" | "True" => Value::Bool(true),
        "false" | "False" => Value::Bool(false),
        _ => {
            if let Ok(n) = trimmed.parse::<i64>() {
                Value::from(n)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                Value::from(f)
            } else {
                Value::String(trimmed.to_string())
            }
        }
    }
}
