//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init command and shared utilities (open_db, build_pipeline)
//! - `ingest` - Scheduled and one-shot ingestion (run, ingest)
//! - `parse` - Dry-run parsing and classification (parse, classify)
//! - `status` - Database status

pub mod core;
pub mod ingest;
pub mod parse;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use ingest::*;
pub use parse::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
