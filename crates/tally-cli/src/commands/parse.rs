//! Dry-run commands (parse, classify)

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::import::parse_file;
use tally_core::Config;

use super::truncate;

/// Parse one statement file and print what would be stored
pub fn cmd_parse(config: &Config, file: &Path, json: bool) -> Result<()> {
    let categorizer = config.categorizer();
    let parsed = parse_file(file, &categorizer)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed.transactions)?);
        return Ok(());
    }

    println!();
    println!(
        "{:<10}  {:>10}  {:<20}  {:<24}  {:<16}  {}",
        "DATE", "AMOUNT", "TYPE", "RECIPIENT", "PRIMARY", "SECONDARY"
    );
    println!("{}", "─".repeat(100));

    for tx in &parsed.transactions {
        println!(
            "{:<10}  {:>10}  {:<20}  {:<24}  {:<16}  {}",
            tx.date,
            tx.amount,
            truncate(&tx.kind, 20),
            truncate(&tx.recipient, 24),
            truncate(&tx.primary_category, 16),
            tx.secondary_category
        );
    }

    println!();
    println!(
        "{} transactions parsed, {} rows skipped",
        parsed.transactions.len(),
        parsed.skipped
    );

    Ok(())
}

/// Print the classification of one raw (category, subcategory, recipient) triple
pub fn cmd_classify(config: &Config, category: &str, subcategory: &str, recipient: &str) {
    let classification = config
        .categorizer()
        .classify(category, subcategory, recipient);

    println!("Primary:   {}", classification.primary);
    println!("Secondary: {}", classification.secondary);
}
