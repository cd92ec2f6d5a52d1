//! One ingestion cycle: deduplicate, parse, categorize, store
//!
//! Failures are contained at the smallest unit that can be skipped. A bad
//! row costs that row, an unreadable file costs that file. Only an input
//! root that cannot be walked or a known-hash set that cannot be read
//! aborts the cycle.

use std::path::Path;

use tracing::{error, info, warn};

use crate::categorize::Categorizer;
use crate::dedup::Deduplicator;
use crate::error::Result;
use crate::import::StatementReader;
use crate::models::{CycleReport, FileRecord};
use crate::sink::LedgerSink;

pub struct Pipeline<S: LedgerSink> {
    dedup: Deduplicator,
    categorizer: Categorizer,
    sink: S,
}

impl<S: LedgerSink> Pipeline<S> {
    pub fn new(dedup: Deduplicator, categorizer: Categorizer, sink: S) -> Self {
        Self {
            dedup,
            categorizer,
            sink,
        }
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn input_dir(&self) -> &Path {
        self.dedup.root()
    }

    /// Run one full cycle over the input directory
    pub fn run_cycle(&self) -> Result<CycleReport> {
        let files = self.dedup.list_unprocessed(&self.sink)?;
        let mut report = CycleReport {
            files_new: files.len(),
            ..Default::default()
        };

        for file in &files {
            report.merge(&self.ingest_file(file));
        }

        info!(
            root = %self.dedup.root().display(),
            files = report.files_new,
            inserted = report.rows_inserted,
            skipped = report.rows_skipped,
            "Ingestion cycle finished"
        );
        Ok(report)
    }

    /// Parse one new file and hand each transaction to the sink
    fn ingest_file(&self, file: &FileRecord) -> CycleReport {
        let mut report = CycleReport::default();
        let path = Path::new(&file.path);

        let reader = match StatementReader::open(path, &self.categorizer) {
            Ok(reader) => reader,
            Err(e) => {
                // The digest stays recorded, so this content is not retried
                error!(path = %file.path, hash = %file.sha256, "Skipping file: {}", e);
                report.files_failed = 1;
                return report;
            }
        };

        for row in reader {
            let tx = match row {
                Ok(tx) => tx,
                Err(e) => {
                    warn!(path = %file.path, line = e.line, "Skipping row: {}", e.kind);
                    report.rows_skipped += 1;
                    continue;
                }
            };

            match self.sink.insert_transaction(&tx) {
                Ok(_) => report.rows_inserted += 1,
                Err(e) => {
                    error!(path = %file.path, recipient = %tx.recipient, "Failed to store transaction: {}", e);
                    report.inserts_failed += 1;
                }
            }
        }

        info!(
            path = %file.path,
            inserted = report.rows_inserted,
            skipped = report.rows_skipped,
            "Imported statement"
        );
        report
    }
}
