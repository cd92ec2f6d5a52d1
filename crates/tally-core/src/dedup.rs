//! Content-addressed file deduplication
//!
//! Every regular file below the input root is identified by the SHA-256 of
//! its bytes, so renaming or copying a statement never causes it to be
//! ingested twice. Digests are recorded in the sink *before* the file is
//! handed on: a crash afterwards loses that file's rows instead of
//! duplicating them.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::models::FileRecord;
use crate::sink::LedgerSink;

/// Compute the lowercase hex SHA-256 of a file, reading it in chunks
pub fn hash_file(path: &Path) -> Result<String> {
    let map_err = |source| Error::Hash {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(map_err)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(map_err)?;

    Ok(hex::encode(hasher.finalize()))
}

/// Finds statement files whose content has not been ingested yet
#[derive(Debug, Clone)]
pub struct Deduplicator {
    root: PathBuf,
}

impl Deduplicator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every regular file below the root, in file-name order
    ///
    /// Fails only when the root itself cannot be read. Unreadable entries
    /// deeper in the tree are logged and skipped.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(Error::Discovery {
                        path: self.root.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(root = %self.root.display(), "Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Files whose digest the sink has not recorded yet
    ///
    /// The known-hash set is read once. Each returned file's digest has
    /// already been recorded in the sink when this returns. Files that cannot
    /// be hashed, or whose digest cannot be recorded, are logged and left
    /// out; they are picked up again by a later run.
    pub fn list_unprocessed(&self, sink: &dyn LedgerSink) -> Result<Vec<FileRecord>> {
        let files = self.discover()?;
        Self::select_unprocessed(files, sink)
    }

    /// Hash `files` and keep (and record) those with an unknown digest
    fn select_unprocessed(
        files: Vec<PathBuf>,
        sink: &dyn LedgerSink,
    ) -> Result<Vec<FileRecord>> {
        let mut known: HashSet<String> = sink.known_hashes()?;
        debug!(
            files = files.len(),
            known = known.len(),
            "Checking files against known digests"
        );

        let mut unprocessed = Vec::new();

        for path in files {
            let sha256 = match hash_file(&path) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(path = %path.display(), "Skipping file: {}", e);
                    continue;
                }
            };

            // Also catches a second copy of the same content in this run
            if !known.insert(sha256.clone()) {
                debug!(path = %path.display(), hash = %sha256, "Already processed");
                continue;
            }

            let record = FileRecord::new(path.to_string_lossy(), sha256);
            if let Err(e) = sink.record_hash(&record) {
                warn!(path = %record.path, hash = %record.sha256, "Cannot record digest, skipping file: {}", e);
                known.remove(&record.sha256);
                continue;
            }

            info!(path = %record.path, hash = %record.sha256, "New statement file");
            unprocessed.push(record);
        }

        Ok(unprocessed)
    }
}
