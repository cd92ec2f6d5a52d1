//! Tally Core Library
//!
//! Bank statement ingestion:
//! - Content-addressed deduplication of statement files
//! - CSV statement parsing (German number and date formats)
//! - Rule-based transaction categorization
//! - SQLite storage behind the `LedgerSink` trait
//! - Periodic ingestion scheduler with cancellation

pub mod categorize;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod sink;

/// Test utilities including an in-memory sink
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::{Categorizer, CategoryRules, Classification};
pub use config::Config;
pub use db::Database;
pub use dedup::Deduplicator;
pub use error::{Error, Result, RowError, RowErrorKind};
pub use models::{CycleReport, FileRecord, Transaction};
pub use pipeline::Pipeline;
pub use scheduler::{Scheduler, SchedulerState, SchedulerSummary};
pub use sink::LedgerSink;
