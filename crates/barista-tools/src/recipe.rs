//! Recipe generation and structured extraction.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use barista_fellow::CoffeeProfile;
use barista_openai::{ChatMessage, OpenAiClient, OpenAiError};

use crate::prompts;

/// How many times a malformed structured extraction is retried before
/// giving up with an explicit error.
pub const MAX_EXTRACT_ATTEMPTS: usize = 3;

/// Reasoning model used for free-text recipe generation.
const GENERATION_MODEL: &str = "o1-preview";
/// Model used for schema-constrained extraction and setting inference.
const EXTRACTION_MODEL: &str = "gpt-4o";

/// Errors from the recipe engine.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    OpenAi(#[from] OpenAiError),

    #[error("recipe extraction failed after {attempts} attempts: {last_error}")]
    ExtractionFailed { attempts: usize, last_error: String },
}

/// A generated recipe: the structured profile plus the model's explanation.
#[derive(Debug, Clone)]
pub struct GeneratedRecipe {
    pub profile: CoffeeProfile,
    pub explanation: String,
}

/// Result of aligning a loose setting description to a concrete config key.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingAlignment {
    pub setting: String,
    pub value: String,
}

/// LLM-backed recipe generation, extraction, and setting inference.
#[derive(Debug, Clone)]
pub struct RecipeEngine {
    openai: Arc<OpenAiClient>,
}

impl RecipeEngine {
    pub fn new(openai: Arc<OpenAiClient>) -> Self {
        Self { openai }
    }

    /// Generate a free-text recipe with explanation for a coffee
    /// description.
    ///
    /// The reasoning model takes no system role, so the brewer persona and
    /// the user's coffee go into a single user message.
    pub async fn generate_explanation(
        &self,
        coffee_description: &str,
    ) -> Result<String, RecipeError> {
        let content = format!(
            "{} {} {}",
            prompts::MASTER_BREWER,
            prompts::RECIPE_GUIDANCE,
            coffee_description
        );

        let explanation = self
            .openai
            .chat_completion(GENERATION_MODEL, &[ChatMessage::user(content)])
            .await?;

        debug!(chars = explanation.len(), "generated recipe explanation");
        Ok(explanation)
    }

    /// Extract a structured profile from a free-text recipe explanation.
    ///
    /// The extraction call is constrained to the profile schema but can
    /// still come back malformed; each malformed result is retried up to
    /// [`MAX_EXTRACT_ATTEMPTS`] times. Transport failures are not retried —
    /// the caller (ultimately the LLM or the dashboard user) decides.
    pub async fn extract_profile(&self, explanation: &str) -> Result<CoffeeProfile, RecipeError> {
        let messages = [
            ChatMessage::system(prompts::RECIPE_REFORMAT),
            ChatMessage::user(explanation),
        ];
        let schema = profile_schema();

        let mut last_error = String::new();
        for attempt in 1..=MAX_EXTRACT_ATTEMPTS {
            match self
                .openai
                .parse_structured::<CoffeeProfile>(
                    EXTRACTION_MODEL,
                    &messages,
                    "coffee_profile",
                    &schema,
                )
                .await
            {
                Ok(mut profile) => {
                    profile.profile_type = 0;
                    return Ok(profile);
                }
                Err(e @ (OpenAiError::Schema(_) | OpenAiError::EmptyCompletion(_))) => {
                    warn!(attempt, error = %e, "recipe extraction attempt failed");
                    last_error = e.to_string();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RecipeError::ExtractionFailed {
            attempts: MAX_EXTRACT_ATTEMPTS,
            last_error,
        })
    }

    /// Generate and extract in one step, keeping the explanation.
    pub async fn generate_profile(
        &self,
        coffee_description: &str,
    ) -> Result<GeneratedRecipe, RecipeError> {
        let explanation = self.generate_explanation(coffee_description).await?;
        let profile = self.extract_profile(&explanation).await?;
        Ok(GeneratedRecipe {
            profile,
            explanation,
        })
    }

    /// Align a loose setting description ("time-format", "12") to a
    /// concrete config key and value.
    pub async fn infer_setting(
        &self,
        device_config: &Value,
        context: &str,
        value: &str,
    ) -> Result<SettingAlignment, RecipeError> {
        let messages = [
            ChatMessage::system(prompts::setting_alignment(device_config)),
            ChatMessage::user(format!("Context: {}\nValue: {}", context, value)),
        ];

        let alignment = self
            .openai
            .parse_structured::<SettingAlignment>(
                EXTRACTION_MODEL,
                &messages,
                "setting_response",
                &json!({
                    "type": "object",
                    "properties": {
                        "setting": { "type": "string" },
                        "value": { "type": "string" }
                    },
                    "required": ["setting", "value"],
                    "additionalProperties": false
                }),
            )
            .await?;

        Ok(alignment)
    }
}

/// JSON schema for the structured profile extraction.
fn profile_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "profileType": { "type": "integer", "description": "Always 0" },
            "title": { "type": "string" },
            "ratio": { "type": "number" },
            "bloomEnabled": { "type": "boolean" },
            "bloomRatio": { "type": "number" },
            "bloomDuration": { "type": "integer" },
            "bloomTemperature": { "type": "number" },
            "ssPulsesEnabled": { "type": "boolean" },
            "ssPulseCount": { "type": "integer" },
            "ssPulseTime": { "type": "integer" },
            "ssPulseTemperatures": {
                "type": "array",
                "items": { "type": "number" }
            },
            "batchPulsesEnabled": { "type": "boolean" },
            "batchPulseCount": { "type": "integer" },
            "batchPulseTime": { "type": "integer" },
            "batchPulseTemperatures": {
                "type": "array",
                "items": { "type": "number" }
            }
        },
        "required": [
            "profileType",
            "title",
            "ratio",
            "bloomEnabled",
            "bloomRatio",
            "bloomDuration",
            "bloomTemperature",
            "ssPulsesEnabled",
            "ssPulseCount",
            "ssPulseTime",
            "ssPulseTemperatures",
            "batchPulsesEnabled",
            "batchPulseCount",
            "batchPulseTime",
            "batchPulseTemperatures"
        ],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(server: &MockServer) -> RecipeEngine {
        RecipeEngine::new(Arc::new(OpenAiClient::with_base_url(
            "test-key",
            server.uri(),
        )))
    }

    fn profile_json() -> String {
        json!({
            "profileType": 7,
            "title": "Citrus Bomb",
            "ratio": 16.0,
            "bloomEnabled": true,
            "bloomRatio": 2.5,
            "bloomDuration": 30,
            "bloomTemperature": 93.5,
            "ssPulsesEnabled": true,
            "ssPulseCount": 2,
            "ssPulseTime": 25,
            "ssPulseTemperatures": [95.0, 92.5],
            "batchPulsesEnabled": true,
            "batchPulseCount": 1,
            "batchPulseTime": 20,
            "batchPulseTemperatures": [92.0]
        })
        .to_string()
    }

    fn completion_with(content: &str) -> serde_json::Value {
        json!({
            "choices": [ { "message": { "role": "assistant", "content": content } } ]
        })
    }

    #[tokio::test]
    async fn extraction_forces_profile_type_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(&profile_json())))
            .mount(&server)
            .await;

        let profile = engine(&server)
            .extract_profile("Ratio: 16 ...")
            .await
            .unwrap();
        assert_eq!(profile.profile_type, 0);
        assert_eq!(profile.title, "Citrus Bomb");
    }

    #[tokio::test]
    async fn extraction_retries_then_succeeds() {
        let server = MockServer::start().await;

        // Two malformed responses, then a good one.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with("nope")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with(&profile_json())))
            .mount(&server)
            .await;

        let profile = engine(&server).extract_profile("...").await.unwrap();
        assert_eq!(profile.title, "Citrus Bomb");
    }

    #[tokio::test]
    async fn extraction_gives_up_after_max_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_with("still nope")))
            .expect(MAX_EXTRACT_ATTEMPTS as u64)
            .mount(&server)
            .await;

        let err = engine(&server).extract_profile("...").await.unwrap_err();
        assert!(matches!(
            err,
            RecipeError::ExtractionFailed { attempts, .. } if attempts == MAX_EXTRACT_ATTEMPTS
        ));
    }

    #[tokio::test]
    async fn transport_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "message": "server exploded" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = engine(&server).extract_profile("...").await.unwrap_err();
        assert!(matches!(err, RecipeError::OpenAi(_)));
    }
}
