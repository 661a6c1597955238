//! gh-agent: natural-language GitHub assistant
//!
//! Usage:
//!   gh-agent           - Start server mode (OAuth + chat HTTP API)
//!   gh-agent --chat    - Start the interactive chat client
//!   gh-agent --help    - Show help

mod cli;
mod client;
mod error;

use gh_core::Config;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// HTTP server (OAuth + /chat)
    Serve,
    /// Interactive chat client
    Chat,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args(std::env::args().skip(1));

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("gh-agent {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    match mode {
        RunMode::Chat => cli::run_chat(config.client).await,
        RunMode::Serve => run_server(config).await,
        _ => Ok(()),
    }
}

/// Parse command line arguments
fn parse_args(args: impl Iterator<Item = String>) -> RunMode {
    for arg in args {
        match arg.as_str() {
            "--chat" | "-c" => return RunMode::Chat,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Serve
}

/// Print help message
fn print_help() {
    println!("gh-agent - talk to GitHub in plain language");
    println!();
    println!("Usage:");
    println!("  gh-agent           Start server mode (OAuth + chat HTTP API)");
    println!("  gh-agent --chat    Start the interactive chat client");
    println!("  gh-agent --help    Show this help message");
    println!("  gh-agent --version Show version");
    println!();
    println!("Configuration is read from ./gh-agent.toml when present.");
    println!();
    println!("Environment Variables:");
    println!("  GEMINI_API_KEY        LLM API key (also LLM_API_KEY)");
    println!("  LLM_MODEL             Model name (default: gemini-1.5-flash)");
    println!("  LLM_PROVIDER          Provider: gemini or openai (default: gemini)");
    println!("  LLM_BASE_URL          Custom API endpoint");
    println!("  GITHUB_CLIENT_ID      OAuth app client id");
    println!("  GITHUB_CLIENT_SECRET  OAuth app client secret");
    println!("  GITHUB_REDIRECT_URI   OAuth callback URL (optional)");
    println!("  SERVER_HOST           Bind host (default: 127.0.0.1)");
    println!("  SERVER_PORT           Bind port (default: 5000)");
    println!("  SERVER_URL            Server URL used by --chat (default: http://127.0.0.1:5000)");
    println!("  AGENT_USER_ID         User id used by --chat (default: main_user)");
}

/// Run server mode until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting gh-agent server...");
    tracing::info!("Model: {}", config.llm.model);

    gh_server::start_server(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("Shutting down...");
    })
    .await
}
