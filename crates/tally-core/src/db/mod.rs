//! Database access layer with connection pooling
//!
//! This module is organized by table:
//! - `file_hashes` - Digests of statement files already ingested
//! - `transactions` - Parsed and categorized transactions

use std::collections::HashSet;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;
use crate::models::{FileRecord, Transaction};
use crate::sink::LedgerSink;

mod file_hashes;
mod transactions;

pub use transactions::StoredTransaction;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Default number of pooled connections
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the database at `path`
    pub fn new(path: &str) -> Result<Self> {
        Self::with_pool_size(path, DEFAULT_POOL_SIZE)
    }

    /// Open the database with an explicit pool size
    pub fn with_pool_size(path: &str, pool_size: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            // Concurrent readers (status) must not fail while a cycle writes
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        });
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.init_schema()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tally_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Create tables if they do not exist yet
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Content digests of statement files that were already ingested
            CREATE TABLE IF NOT EXISTS file_hashes (
                id INTEGER PRIMARY KEY,
                path TEXT NOT NULL,                        -- where the content was first seen
                sha256 TEXT NOT NULL UNIQUE,               -- lowercase hex digest of file bytes
                recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Transactions parsed from statement rows
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                kind TEXT NOT NULL,
                date DATE NOT NULL,
                amount TEXT NOT NULL,                      -- exact decimal, e.g. "-37.20"
                recipient TEXT NOT NULL,
                usage TEXT NOT NULL,
                primary_category TEXT NOT NULL,
                secondary_category TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_primary ON transactions(primary_category);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

impl LedgerSink for Database {
    fn known_hashes(&self) -> Result<HashSet<String>> {
        self.get_known_hashes()
    }

    fn record_hash(&self, record: &FileRecord) -> Result<()> {
        self.insert_file_record(record)
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<i64> {
        self.add_transaction(tx)
    }
}

#[cfg(test)]
mod tests;
