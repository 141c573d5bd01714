//! One-shot assistant bootstrap.

use miette::{IntoDiagnostic, Result, miette};

use barista_agent::create_assistant;
use barista_openai::OpenAiClient;
use barista_store::Config;

use crate::chat::prompt_secret;

pub async fn run(save: bool) -> Result<()> {
    let config = Config::new();

    let api_key = match config.openai_api_key().await {
        Some(key) => key,
        None => prompt_secret("OpenAI API key: ")?,
    };

    let openai = OpenAiClient::new(api_key);
    let assistant = create_assistant(&openai)
        .await
        .map_err(|e| miette!("{}", e))?;

    println!("Assistant ID: {}", assistant.id);

    if save {
        config
            .save_assistant_id(&assistant.id)
            .await
            .into_diagnostic()?;
        println!("Saved to config file.");
    } else {
        println!("Export it as OPENAI_ASSISTANT_ID or re-run with --save.");
    }

    Ok(())
}
