//! Test utilities for tally-core
//!
//! `MemorySink` is an in-memory [`LedgerSink`] whose operations can be made
//! to fail on demand. Clones share state, so a test can hand one clone to a
//! pipeline and inspect another afterwards.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::models::{FileRecord, Transaction};
use crate::sink::LedgerSink;

#[derive(Debug, Default)]
struct State {
    records: Vec<FileRecord>,
    transactions: Vec<Transaction>,
    known_hash_reads: usize,
    fail_known_hashes: bool,
    fail_record_hash: bool,
    /// Inserts for recipients containing any of these are refused
    reject_recipients: Vec<String>,
}

/// In-memory sink for tests
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<State>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `known_hashes` fail
    pub fn fail_known_hashes(&self, fail: bool) {
        self.lock().fail_known_hashes = fail;
    }

    /// Make `record_hash` fail
    pub fn fail_record_hash(&self, fail: bool) {
        self.lock().fail_record_hash = fail;
    }

    /// Refuse inserts whose recipient contains `needle`
    pub fn reject_recipient(&self, needle: &str) {
        self.lock().reject_recipients.push(needle.to_string());
    }

    pub fn hashes(&self) -> HashSet<String> {
        self.lock()
            .records
            .iter()
            .map(|r| r.sha256.clone())
            .collect()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    /// How many times `known_hashes` was called
    pub fn known_hash_reads(&self) -> usize {
        self.lock().known_hash_reads
    }
}

impl LedgerSink for MemorySink {
    fn known_hashes(&self) -> Result<HashSet<String>> {
        let mut state = self.lock();
        state.known_hash_reads += 1;
        if state.fail_known_hashes {
            return Err(Error::Sink("known hashes unavailable".into()));
        }
        Ok(state.records.iter().map(|r| r.sha256.clone()).collect())
    }

    fn record_hash(&self, record: &FileRecord) -> Result<()> {
        let mut state = self.lock();
        if state.fail_record_hash {
            return Err(Error::Sink(format!("cannot record {}", record.sha256)));
        }
        if !state.records.iter().any(|r| r.sha256 == record.sha256) {
            state.records.push(record.clone());
        }
        Ok(())
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<i64> {
        let mut state = self.lock();
        if state
            .reject_recipients
            .iter()
            .any(|needle| tx.recipient.contains(needle.as_str()))
        {
            return Err(Error::Sink(format!("insert refused for {}", tx.recipient)));
        }
        state.transactions.push(tx.clone());
        Ok(state.transactions.len() as i64)
    }
}
