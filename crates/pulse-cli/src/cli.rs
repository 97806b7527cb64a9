//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pulse - Find the best day to run a sales promotion
#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Sales promotion best-day analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.config/pulse/pulse.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a sales payload and print the best promotion day
    Analyze {
        /// JSON payload file ("-" reads stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Skip the AI provider and use the heuristic only
        #[arg(long)]
        no_ai: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on [default: 8081]
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the AI configuration and test the provider connection
    AiCheck,
}
