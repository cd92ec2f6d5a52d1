//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Ingest bank statement exports into a local ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Scheduled bank statement ingestion", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.config/tally/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides config and TALLY_DB)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Input directory scanned for statements (overrides config and TALLY_INPUT_DIR)
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Ingest new statements on the configured schedule until interrupted
    Run,

    /// Run a single ingestion cycle now
    Ingest,

    /// Parse and categorize one statement file without storing it
    Parse {
        /// Statement CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Print transactions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a raw category and recipient would be classified
    Classify {
        /// Raw category label (e.g. "Weitere Ausgaben")
        #[arg(short, long)]
        category: String,

        /// Raw subcategory label
        #[arg(short, long, default_value = "")]
        subcategory: String,

        /// Recipient text
        #[arg(short, long, default_value = "")]
        recipient: String,
    },

    /// Show database status
    Status,
}
