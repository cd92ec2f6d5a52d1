//! Status command implementation

use std::fs;
use std::path::Path;

use anyhow::Result;
use tally_core::Config;

use super::{open_db, truncate};

pub fn cmd_status(config: &Config) -> Result<()> {
    let db_path = Path::new(&config.database.path);

    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());
    println!("   Input:    {}", config.input_dir.display());
    println!("   Schedule: every {} minute(s)", config.run_every_minutes);

    if !db_path.exists() {
        println!("   Size: (database not initialized)");
        println!();
        return Ok(());
    }

    if let Ok(metadata) = fs::metadata(db_path) {
        let size_kb = metadata.len() as f64 / 1024.0;
        if size_kb < 1024.0 {
            println!("   Size: {:.1} KB", size_kb);
        } else {
            println!("   Size: {:.1} MB", size_kb / 1024.0);
        }
    }

    match open_db(config) {
        Ok(db) => {
            println!();
            println!("   Files ingested: {}", db.count_file_hashes()?);
            println!("   Transactions:   {}", db.count_transactions()?);

            let recent = db.list_file_records(5)?;
            if !recent.is_empty() {
                println!();
                println!("   Recent files:");
                for record in recent {
                    let short_hash = record.sha256.get(..12).unwrap_or(&record.sha256);
                    println!("     {}  {}", short_hash, truncate(&record.path, 60));
                }
            }
        }
        Err(e) => {
            println!();
            println!("   ❌ Error opening database: {}", e);
        }
    }

    println!();
    Ok(())
}
