//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `build_pipeline` - Wire config, categorizer and database together
//! - `cmd_init` - Initialize the database

use anyhow::{Context, Result};
use tally_core::{Config, Database, Deduplicator, Pipeline};

/// Open the configured database, creating the schema if needed
pub fn open_db(config: &Config) -> Result<Database> {
    Database::with_pool_size(&config.database.path, config.database.pool_size)
        .with_context(|| format!("Failed to open database {}", config.database.path))
}

/// Ingestion pipeline over the configured input directory and database
pub fn build_pipeline(config: &Config) -> Result<Pipeline<Database>> {
    let db = open_db(config)?;
    Ok(Pipeline::new(
        Deduplicator::new(&config.input_dir),
        config.categorizer(),
        db,
    ))
}

pub fn cmd_init(config: &Config) -> Result<()> {
    println!("🔧 Initializing database at {}...", config.database.path);

    open_db(config)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!(
        "  1. Put statement exports into {}",
        config.input_dir.display()
    );
    println!("  2. Ingest once: tally ingest");
    println!("  3. Or keep ingesting on a schedule: tally run");

    Ok(())
}
