//! Pulse CLI - Sales promotion best-day analyzer
//!
//! Usage:
//!   pulse analyze --file sales.json     Analyze a payload (AI first, heuristic fallback)
//!   pulse analyze --file - --no-ai      Heuristic only, payload from stdin
//!   pulse serve --port 8081             Start web server
//!   pulse ai-check                      Test the AI provider configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze { file, no_ai, json } => {
            commands::cmd_analyze(&config, &file, no_ai, json).await
        }
        Commands::Serve { host, port } => {
            commands::cmd_serve(config, host.as_deref(), port).await
        }
        Commands::AiCheck => commands::cmd_ai_check(&config).await,
    }
}
