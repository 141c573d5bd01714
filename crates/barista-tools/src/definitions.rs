//! Function-tool schemas for the fixed tool set.
//!
//! These definitions are the single source of truth: assistant bootstrap
//! registers them and [`crate::ToolRequest`] parses against the same
//! parameter names, so the two cannot drift apart.

use serde_json::json;

use barista_openai::FunctionSpec;

/// All tools the assistant may call.
pub fn definitions() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec {
            name: "list_profiles".to_string(),
            description: "List all existing coffee profiles".to_string(),
            strict: false,
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        FunctionSpec {
            name: "create_profile_from_link".to_string(),
            description: "Create a new coffee profile from a shared brew link".to_string(),
            strict: false,
            parameters: json!({
                "type": "object",
                "properties": {
                    "link": {
                        "type": "string",
                        "description": "The shared brew link"
                    }
                },
                "required": ["link"]
            }),
        },
        FunctionSpec {
            name: "delete_profile_by_id".to_string(),
            description: "Delete a coffee profile by its id".to_string(),
            strict: false,
            parameters: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "The id of the profile to delete"
                    }
                },
                "required": ["id"]
            }),
        },
        FunctionSpec {
            name: "generate_share_link".to_string(),
            description: "Generate a share link for a coffee profile".to_string(),
            strict: false,
            parameters: json!({
                "type": "object",
                "properties": {
                    "profile_id": {
                        "type": "string",
                        "description": "The ID of the profile to share"
                    }
                },
                "required": ["profile_id"]
            }),
        },
        FunctionSpec {
            name: "get_device_name".to_string(),
            description: "Get the coffee device display name".to_string(),
            strict: false,
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        FunctionSpec {
            name: "get_device_config".to_string(),
            description: "Return the current device config.".to_string(),
            strict: true,
            parameters: json!({
                "type": "object",
                "required": ["remote"],
                "properties": {
                    "remote": {
                        "type": "boolean",
                        "description": "If true, force a new request to the cloud to refresh the device config. Otherwise, returns the cached config."
                    }
                },
                "additionalProperties": false
            }),
        },
        FunctionSpec {
            name: "scrape_website".to_string(),
            description: "Fetches a webpage and returns its raw HTML body.".to_string(),
            strict: true,
            parameters: json!({
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The website URL to fetch, e.g. 'https://example.com'"
                    }
                },
                "additionalProperties": false
            }),
        },
        FunctionSpec {
            name: "provide_recipe".to_string(),
            description: "Suggest a recipe for the given coffee description and provide explanations below the recipe.".to_string(),
            strict: true,
            parameters: json!({
                "type": "object",
                "required": ["coffee_description"],
                "properties": {
                    "coffee_description": {
                        "type": "string",
                        "description": "Description of the coffee for which the recipe is to be generated"
                    }
                },
                "additionalProperties": false
            }),
        },
        FunctionSpec {
            name: "save_recipe".to_string(),
            description: "Save a recipe to the machine based on a recipe explanation.".to_string(),
            strict: true,
            parameters: json!({
                "type": "object",
                "required": ["recipe_description"],
                "properties": {
                    "recipe_description": {
                        "type": "string",
                        "description": "Description of the coffee for which the recipe is to be extracted"
                    }
                },
                "additionalProperties": false
            }),
        },
        FunctionSpec {
            name: "adjust_setting".to_string(),
            description: "Adjust a device setting based on a loose description of the setting and its new value.".to_string(),
            strict: false,
            parameters: json!({
                "type": "object",
                "properties": {
                    "setting": {
                        "type": "string",
                        "description": "What the user wants to change, e.g. 'time-format'"
                    },
                    "value": {
                        "type": "string",
                        "description": "The desired new value"
                    }
                },
                "required": ["setting", "value"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ToolRequest;

    #[test]
    fn definitions_are_well_formed() {
        let defs = definitions();
        assert_eq!(defs.len(), 10);
        for def in &defs {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert_eq!(def.parameters["type"], "object");
        }
    }

    #[test]
    fn every_definition_is_parseable() {
        // Each declared tool must round through the request parser with its
        // own declared parameter names.
        for def in definitions() {
            let args = match def.name.as_str() {
                "create_profile_from_link" => r#"{"link":"https://fellow.co/p/a1b2c3"}"#,
                "delete_profile_by_id" => r#"{"id":"p-1"}"#,
                "generate_share_link" => r#"{"profile_id":"p-1"}"#,
                "get_device_config" => r#"{"remote":true}"#,
                "scrape_website" => r#"{"url":"https://example.com"}"#,
                "provide_recipe" => r#"{"coffee_description":"washed gesha"}"#,
                "save_recipe" => r#"{"recipe_description":"Ratio 16..."}"#,
                "adjust_setting" => r#"{"setting":"time-format","value":"12"}"#,
                _ => "{}",
            };
            let parsed = ToolRequest::parse(&def.name, args);
            assert!(parsed.is_ok(), "{} failed: {:?}", def.name, parsed);
            assert_eq!(parsed.unwrap().tool_name(), def.name);
        }
    }
}
