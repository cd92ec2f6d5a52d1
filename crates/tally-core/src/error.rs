//! Error types for tally
//!
//! `Error` covers everything that aborts an operation: a whole cycle
//! (`Discovery`, a failed hash-set read), or a single file (`Hash`, `Open`,
//! `Header`). Row-level problems are reported as [`RowError`] values and never
//! escape the parser's caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Cannot traverse input directory {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Cannot hash {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read header of {}: {reason}", path.display())]
    Header { path: PathBuf, reason: String },

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single statement row that could not be turned into a transaction
#[derive(Error, Debug)]
#[error("row {line}: {kind}")]
pub struct RowError {
    /// 1-based line in the source file (header is line 1)
    pub line: u64,
    pub kind: RowErrorKind,
}

#[derive(Error, Debug)]
pub enum RowErrorKind {
    #[error("unable to parse amount {0:?}")]
    InvalidAmount(String),

    #[error("unable to parse date {0:?}")]
    InvalidDate(String),

    #[error("expected at least {expected} columns, found {found}")]
    MissingColumns { expected: usize, found: usize },

    #[error("malformed record: {0}")]
    Malformed(#[source] csv::Error),
}

impl RowError {
    pub fn new(line: u64, kind: RowErrorKind) -> Self {
        Self { line, kind }
    }
}
