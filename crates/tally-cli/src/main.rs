//! Tally CLI - Bank statement ingestion
//!
//! Usage:
//!   tally init                  Initialize database
//!   tally run                   Ingest new statements on a schedule
//!   tally ingest                Run one ingestion cycle now
//!   tally parse --file CSV      Parse a statement without storing it
//!   tally status                Show database status

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tally_core::Config;

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(input) = &cli.input {
        config.input_dir = input.clone();
    }

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > config log_level > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&config),
        Commands::Run => commands::cmd_run(&config).await,
        Commands::Ingest => commands::cmd_ingest(&config),
        Commands::Parse { file, json } => commands::cmd_parse(&config, &file, json),
        Commands::Classify {
            category,
            subcategory,
            recipient,
        } => {
            commands::cmd_classify(&config, &category, &subcategory, &recipient);
            Ok(())
        }
        Commands::Status => commands::cmd_status(&config),
    }
}
