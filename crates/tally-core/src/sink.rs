//! Storage contract for the ingestion pipeline
//!
//! The pipeline only needs three operations from its store: one bulk read of
//! every recorded file digest, one write per newly seen file, and one write
//! per transaction. `Database` is the SQLite implementation; tests use
//! `test_utils::MemorySink`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{FileRecord, Transaction};

/// Trait for transaction stores
///
/// Every method may fail on its own; callers decide whether a failure
/// aborts the cycle or only the affected file or row.
pub trait LedgerSink: Send + Sync {
    /// Every digest recorded so far
    fn known_hashes(&self) -> Result<HashSet<String>>;

    /// Durably mark a file's content as processed
    fn record_hash(&self, record: &FileRecord) -> Result<()>;

    /// Store one transaction, returning its row id
    fn insert_transaction(&self, tx: &Transaction) -> Result<i64>;
}

impl<S: LedgerSink + ?Sized> LedgerSink for Arc<S> {
    fn known_hashes(&self) -> Result<HashSet<String>> {
        (**self).known_hashes()
    }

    fn record_hash(&self, record: &FileRecord) -> Result<()> {
        (**self).record_hash(record)
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<i64> {
        (**self).insert_transaction(tx)
    }
}
