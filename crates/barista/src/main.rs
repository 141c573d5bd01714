//! Barista: brew assistant and dashboard for a networked pour-over brewer.
//!
//! Main binary with subcommands:
//! - `chat`: conversational assistant in the terminal
//! - `web`: dashboard web UI (login, profiles, AI generation, backups)
//! - `bootstrap`: create the LLM assistant and print its id

use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bootstrap;
mod chat;
mod web;

#[derive(Parser)]
#[command(name = "barista")]
#[command(about = "Brew assistant for a networked pour-over brewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the brew assistant in the terminal
    Chat {
        /// Brewer account email (falls back to config, then a prompt)
        #[arg(long)]
        email: Option<String>,

        /// Assistant id (falls back to OPENAI_ASSISTANT_ID / config)
        #[arg(long)]
        assistant_id: Option<String>,
    },

    /// Run the dashboard web UI
    Web {
        /// Web server port
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Static files directory
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Create the LLM assistant with the tool definitions and print its id
    Bootstrap {
        /// Persist the new assistant id to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "barista=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            email,
            assistant_id,
        } => chat::run(email, assistant_id).await,

        Commands::Web { port, static_dir } => web::run(port, static_dir.as_deref()).await,

        Commands::Bootstrap { save } => bootstrap::run(save).await,
    }
}
