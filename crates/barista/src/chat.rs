//! Terminal chat with the brew assistant.

use std::io::{BufRead, Write};
use std::sync::Arc;

use miette::{IntoDiagnostic, Result, miette};
use tracing::info;

use barista_agent::{AssistantChunk, ChatSession, GREETING, verify_assistant};
use barista_fellow::FellowClient;
use barista_openai::OpenAiClient;
use barista_store::Config;
use barista_tools::ToolRegistry;

pub async fn run(email_flag: Option<String>, assistant_flag: Option<String>) -> Result<()> {
    let config = Config::new();

    // Credentials: flag, then config chain, then an interactive prompt.
    let email = match email_flag.or(config.fellow_email().await) {
        Some(email) => email,
        None => prompt_line("Email for brewer account: ")?,
    };
    let password = match config.fellow_password().await {
        Some(password) => password,
        None => prompt_secret("Password for brewer account: ")?,
    };
    let api_key = match config.openai_api_key().await {
        Some(key) => key,
        None => prompt_secret("OpenAI API key: ")?,
    };
    let assistant_id = assistant_flag
        .or(config.assistant_id().await)
        .ok_or_else(|| {
            miette!(
                "no assistant id configured; run `barista bootstrap` once and export \
                 OPENAI_ASSISTANT_ID (or pass --assistant-id)"
            )
        })?;

    let fellow = Arc::new(FellowClient::new());
    fellow
        .login(&email, &password)
        .await
        .map_err(|e| miette!("could not connect to brewer: {}", e))?;
    info!("connected to brewer");

    let openai = Arc::new(OpenAiClient::new(api_key));
    verify_assistant(&openai, &assistant_id)
        .await
        .map_err(|e| miette!("{}", e))?;

    let registry = Arc::new(ToolRegistry::new(fellow, Arc::clone(&openai)));
    let mut session = ChatSession::new(openai, registry, assistant_id);

    println!("{}\n", GREETING);
    println!("(empty line or ctrl-d to quit)\n");

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush().into_diagnostic()?;

        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line).into_diagnostic()?;
        let line = line.trim();
        if read == 0 || line.is_empty() {
            break;
        }

        print!("aiden> ");
        let turn = session
            .run_turn(line, &mut |chunk| match chunk {
                AssistantChunk::Text(text) => {
                    print!("{}", text);
                    std::io::stdout().flush().ok();
                }
                AssistantChunk::Image(bytes) => match save_image(&bytes) {
                    Ok(path) => println!("\n[image saved to {}]", path),
                    Err(e) => println!("\n[could not save image: {}]", e),
                },
            })
            .await;
        println!();

        // A failed turn ends neither the session nor the process.
        if let Err(e) = turn {
            eprintln!("turn failed: {}", e);
        }
    }

    println!("goodbye");
    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush().into_diagnostic()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .into_diagnostic()?;
    Ok(line.trim().to_string())
}

/// Prompt without echoing the input.
pub(crate) fn prompt_secret(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush().into_diagnostic()?;
    let secret = rpassword::read_password().into_diagnostic()?;
    Ok(secret.trim().to_string())
}

fn save_image(bytes: &[u8]) -> std::io::Result<String> {
    let path = std::env::temp_dir().join(format!(
        "barista-{}.png",
        chrono::Utc::now().format("%Y%m%d%H%M%S")
    ));
    std::fs::write(&path, bytes)?;
    Ok(path.display().to_string())
}
