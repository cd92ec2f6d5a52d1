//! Domain models for tally

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A categorized transaction parsed from one statement row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Normalized transaction type (e.g. "Card Payment"); unknown types pass through
    pub kind: String,
    pub date: NaiveDate,
    /// Signed amount, negative for outgoing money
    pub amount: Decimal,
    pub recipient: String,
    /// Free-text memo ("Verwendungszweck")
    pub usage: String,
    pub primary_category: String,
    pub secondary_category: String,
}

/// A discovered file and the SHA-256 digest of its contents
///
/// The digest identifies the content, not the file: two paths with
/// byte-identical contents produce the same `sha256`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    /// Lowercase hex SHA-256 digest (64 characters)
    pub sha256: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
        }
    }
}

/// Counters for one ingestion cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Files whose content had not been seen before
    pub files_new: usize,
    /// New files that could not be opened or had no readable header
    pub files_failed: usize,
    pub rows_inserted: usize,
    /// Rows skipped because amount, date or layout was invalid
    pub rows_skipped: usize,
    /// Parsed rows the sink refused to store
    pub inserts_failed: usize,
}

impl CycleReport {
    /// Fold the counters of another report into this one
    pub fn merge(&mut self, other: &CycleReport) {
        self.files_new += other.files_new;
        self.files_failed += other.files_failed;
        self.rows_inserted += other.rows_inserted;
        self.rows_skipped += other.rows_skipped;
        self.inserts_failed += other.inserts_failed;
    }
}
