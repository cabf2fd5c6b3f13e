//! Laozihao CLI, the main entry point.
//!
//! Commands:
//! - `serve`  : Start the HTTP server (catalog, timeline, chat, static site)
//! - `status` : Show the effective configuration
//! - `doctor` : Check the data files and credentials

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "laozihao",
    about = "Laozihao: time-honored Chinese brands with an AI guide",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the effective configuration
    Status {
        /// Path to the TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Diagnose data files and credentials
    Doctor {
        /// Path to the TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port, config } => commands::serve::run(port, config).await?,
        Commands::Status { config } => commands::status::run(config)?,
        Commands::Doctor { config } => commands::doctor::run(config)?,
    }

    Ok(())
}
