//! Genie CLI — the main entry point.
//!
//! Commands:
//! - `init`    — write a default config and seed the capability catalog
//! - `run`     — process one request, or start an interactive session
//! - `search`  — look up capabilities by keyword

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "genie",
    about = "Genie — turn test requests into device automation programs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.genie/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and seed the capability catalog
    Init,

    /// Generate, build and optionally run a test program
    Run {
        /// Process a single request instead of entering interactive mode
        #[arg(short, long)]
        query: Option<String>,

        /// Push and run the built program on the connected device
        #[arg(long)]
        auto_exec: bool,

        /// Use templates only
        #[arg(long)]
        no_llm: bool,
    },

    /// Search the capability catalog (top 10 matches)
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::init::run(&config, cli.config.as_deref()).await?,
        Commands::Run {
            query,
            auto_exec,
            no_llm,
        } => commands::run::run(config, query, auto_exec, no_llm).await?,
        Commands::Search { query } => commands::search::run(config, &query).await?,
    }

    Ok(())
}
