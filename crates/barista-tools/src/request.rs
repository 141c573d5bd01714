//! Typed tool requests.
//!
//! The LLM hands over a tool name and a JSON argument string. Everything is
//! validated here, once, at the boundary; handlers only ever see a typed
//! variant.

use serde_json::{Map, Value};
use thiserror::Error;

/// Parse failure for an incoming tool call.
#[derive(Debug, Error, PartialEq)]
pub enum ToolParseError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {message}")]
    BadArguments { tool: &'static str, message: String },
}

/// One variant per tool in the fixed set.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    ListProfiles,
    CreateProfileFromLink { link: String },
    DeleteProfileById { id: String },
    GenerateShareLink { profile_id: String },
    GetDeviceName,
    GetDeviceConfig { remote: bool },
    ScrapeWebsite { url: String },
    ProvideRecipe { coffee_description: String },
    SaveRecipe { recipe_description: String },
    AdjustSetting { setting: String, value: String },
}

impl ToolRequest {
    /// The name of the tool this request invokes.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::ListProfiles => "list_profiles",
            Self::CreateProfileFromLink { .. } => "create_profile_from_link",
            Self::DeleteProfileById { .. } => "delete_profile_by_id",
            Self::GenerateShareLink { .. } => "generate_share_link",
            Self::GetDeviceName => "get_device_name",
            Self::GetDeviceConfig { .. } => "get_device_config",
            Self::ScrapeWebsite { .. } => "scrape_website",
            Self::ProvideRecipe { .. } => "provide_recipe",
            Self::SaveRecipe { .. } => "save_recipe",
            Self::AdjustSetting { .. } => "adjust_setting",
        }
    }

    /// Parse a named call with its raw argument JSON.
    ///
    /// An empty argument string is treated as `{}` — tools without
    /// parameters arrive that way. The name is checked before the
    /// arguments so an unknown tool is always reported as unknown, however
    /// mangled its arguments are.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolParseError> {
        let tool = known_name(name).ok_or_else(|| ToolParseError::UnknownTool(name.to_string()))?;
        let args = parse_arguments(tool, arguments)?;

        match tool {
            "list_profiles" => Ok(Self::ListProfiles),
            "create_profile_from_link" => Ok(Self::CreateProfileFromLink {
                link: required_str(&args, "create_profile_from_link", "link")?,
            }),
            "delete_profile_by_id" => Ok(Self::DeleteProfileById {
                id: required_str(&args, "delete_profile_by_id", "id")?,
            }),
            "generate_share_link" => Ok(Self::GenerateShareLink {
                profile_id: required_str(&args, "generate_share_link", "profile_id")?,
            }),
            "get_device_name" => Ok(Self::GetDeviceName),
            "get_device_config" => Ok(Self::GetDeviceConfig {
                remote: args.get("remote").and_then(Value::as_bool).unwrap_or(true),
            }),
            "scrape_website" => Ok(Self::ScrapeWebsite {
                url: required_str(&args, "scrape_website", "url")?,
            }),
            "provide_recipe" => Ok(Self::ProvideRecipe {
                coffee_description: required_str(&args, "provide_recipe", "coffee_description")?,
            }),
            "save_recipe" => Ok(Self::SaveRecipe {
                recipe_description: required_str(&args, "save_recipe", "recipe_description")?,
            }),
            "adjust_setting" => Ok(Self::AdjustSetting {
                setting: required_str(&args, "adjust_setting", "setting")?,
                value: stringy(&args, "adjust_setting", "value")?,
            }),
            _ => unreachable!("known_name only returns names matched above"),
        }
    }
}

/// Map a runtime tool name onto its static counterpart.
fn known_name(name: &str) -> Option<&'static str> {
    const NAMES: &[&str] = &[
        "list_profiles",
        "create_profile_from_link",
        "delete_profile_by_id",
        "generate_share_link",
        "get_device_name",
        "get_device_config",
        "scrape_website",
        "provide_recipe",
        "save_recipe",
        "adjust_setting",
    ];
    NAMES.iter().find(|n| **n == name).copied()
}

fn parse_arguments(tool: &'static str, arguments: &str) -> Result<Map<String, Value>, ToolParseError> {
    if arguments.trim().is_empty() {
        return Ok(Map::new());
    }

    let value: Value =
        serde_json::from_str(arguments).map_err(|e| ToolParseError::BadArguments {
            tool,
            message: format!("arguments are not valid JSON: {}", e),
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ToolParseError::BadArguments {
            tool,
            message: format!("expected a JSON object, got {}", json_type(&other)),
        }),
    }
}

fn required_str(
    args: &Map<String, Value>,
    tool: &'static str,
    key: &str,
) -> Result<String, ToolParseError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(ToolParseError::BadArguments {
            tool,
            message: format!("parameter '{}' is empty", key),
        }),
        Some(other) => Err(ToolParseError::BadArguments {
            tool,
            message: format!("parameter '{}' must be a string, got {}", key, json_type(other)),
        }),
        None => Err(ToolParseError::BadArguments {
            tool,
            message: format!("missing required parameter: {}", key),
        }),
    }
}

/// Accept strings and scalars, rendering scalars to their JSON text. The
/// model sends setting values both ways.
fn stringy(
    args: &Map<String, Value>,
    tool: &'static str,
    key: &str,
) -> Result<String, ToolParseError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(ToolParseError::BadArguments {
            tool,
            message: format!("parameter '{}' must be a scalar, got {}", key, json_type(other)),
        }),
        None => Err(ToolParseError::BadArguments {
            tool,
            message: format!("missing required parameter: {}", key),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_arg_tools_accept_empty_arguments() {
        assert_eq!(
            ToolRequest::parse("list_profiles", "").unwrap(),
            ToolRequest::ListProfiles
        );
        assert_eq!(
            ToolRequest::parse("get_device_name", "{}").unwrap(),
            ToolRequest::GetDeviceName
        );
    }

    #[test]
    fn unknown_tool_is_distinguished() {
        assert_eq!(
            ToolRequest::parse("unknown_tool", "{}"),
            Err(ToolParseError::UnknownTool("unknown_tool".to_string()))
        );
    }

    #[test]
    fn unknown_tool_wins_over_bad_arguments() {
        assert_eq!(
            ToolRequest::parse("unknown_tool", "{not json"),
            Err(ToolParseError::UnknownTool("unknown_tool".to_string()))
        );
    }

    #[test]
    fn link_is_required() {
        let err = ToolRequest::parse("create_profile_from_link", "{}").unwrap_err();
        assert!(matches!(err, ToolParseError::BadArguments { .. }));
        assert!(err.to_string().contains("link"));
    }

    #[test]
    fn device_config_remote_defaults_to_true() {
        assert_eq!(
            ToolRequest::parse("get_device_config", "{}").unwrap(),
            ToolRequest::GetDeviceConfig { remote: true }
        );
        assert_eq!(
            ToolRequest::parse("get_device_config", r#"{"remote": false}"#).unwrap(),
            ToolRequest::GetDeviceConfig { remote: false }
        );
    }

    #[test]
    fn adjust_setting_accepts_scalar_values() {
        assert_eq!(
            ToolRequest::parse(
                "adjust_setting",
                r#"{"setting": "time-format", "value": 12}"#
            )
            .unwrap(),
            ToolRequest::AdjustSetting {
                setting: "time-format".to_string(),
                value: "12".to_string(),
            }
        );
    }

    #[test]
    fn malformed_json_is_a_bad_argument() {
        let err = ToolRequest::parse("scrape_website", "{not json").unwrap_err();
        assert!(matches!(err, ToolParseError::BadArguments { .. }));
    }

    #[test]
    fn non_object_arguments_rejected() {
        let err = ToolRequest::parse("scrape_website", r#"["https://example.com"]"#).unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
