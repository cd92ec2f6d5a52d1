//! CSV parser for C24 Bank statement exports
//!
//! Layout (positional, header row ignored):
//! `0` transaction type, `1` date (`DD.MM.YYYY`), `2` amount (`-37,20`, may be
//! quoted), `3` recipient (SEPA transfers append `, IBAN, ...`), `6` usage,
//! `8` category, `9` subcategory. Rows need at least 10 columns.
//!
//! A row that fails to parse is reported and skipped; only an unopenable file
//! or a missing header rejects the whole file.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::categorize::Categorizer;
use crate::error::{Error, Result, RowError, RowErrorKind};
use crate::models::Transaction;

const COL_KIND: usize = 0;
const COL_DATE: usize = 1;
const COL_AMOUNT: usize = 2;
const COL_RECIPIENT: usize = 3;
const COL_USAGE: usize = 6;
const COL_CATEGORY: usize = 8;
const COL_SUBCATEGORY: usize = 9;
const MIN_COLUMNS: usize = 10;

/// Raw type label of SEPA transfers, whose recipient column carries extra fields
pub const SEPA_TRANSFER: &str = "SEPA-Überweisung";

/// Map a raw transaction type to its normalized label
///
/// Unknown types are returned unchanged.
pub fn translate_transaction_type(raw: &str) -> &str {
    match raw {
        "Abbuchung" => "Debit",
        "Zinszahlung" => "Interest Payment",
        "Kartenzahlung" => "Card Payment",
        "Online-Kartenzahlung" => "Online Card Payment",
        "Pocket-Umbuchung" => "Pocket Transfer",
        SEPA_TRANSFER => "SEPA Transfer",
        "SEPA-Lastschrift" => "SEPA Direct Debit",
        "Echtzeit-Überweisung" => "Instant Transfer",
        other => other,
    }
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?[0-9]+(,[0-9]+)?$").expect("valid regex"))
}

/// Parse a German-formatted amount (`"1234,56"`, `-37,20`)
///
/// Quotes are stripped and `,` is the decimal separator. Grouped amounts
/// (`1.234,56`, `1.500`) and exponents are rejected.
pub fn parse_amount(s: &str) -> std::result::Result<Decimal, RowErrorKind> {
    let invalid = || RowErrorKind::InvalidAmount(s.to_string());

    let cleaned = s.replace('"', "");
    let cleaned = cleaned.trim();
    if !amount_re().is_match(cleaned) {
        return Err(invalid());
    }

    Decimal::from_str(&cleaned.replace(',', ".")).map_err(|_| invalid())
}

/// Parse a `DD.MM.YYYY` date
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, RowErrorKind> {
    let s = s.trim();

    // chrono accepts single-digit fields; the export always pads them
    if s.len() != 10 {
        return Err(RowErrorKind::InvalidDate(s.to_string()));
    }

    NaiveDate::parse_from_str(s, "%d.%m.%Y").map_err(|_| RowErrorKind::InvalidDate(s.to_string()))
}

/// Recipient column, cut at the first comma for SEPA transfers
pub fn extract_recipient<'a>(raw_kind: &str, raw_recipient: &'a str) -> &'a str {
    if raw_kind == SEPA_TRANSFER {
        raw_recipient
            .split(',')
            .next()
            .unwrap_or(raw_recipient)
            .trim()
    } else {
        raw_recipient
    }
}

/// Streaming reader over the data rows of one statement
///
/// Yields one item per data row: the categorized transaction, or the reason
/// the row was rejected. The header row is consumed on construction.
pub struct StatementReader<'c, R: Read> {
    records: StringRecordsIntoIter<R>,
    categorizer: &'c Categorizer,
    line: u64,
    finished: bool,
}

impl<'c> StatementReader<'c, File> {
    /// Open a statement file and consume its header row
    pub fn open(path: &Path, categorizer: &'c Categorizer) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, categorizer).map_err(|e| match e {
            Error::Header { reason, .. } => Error::Header {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }
}

impl<'c, R: Read> StatementReader<'c, R> {
    /// Wrap any reader; fails if no header row can be read
    pub fn from_reader(reader: R, categorizer: &'c Categorizer) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut header = StringRecord::new();
        match rdr.read_record(&mut header) {
            Ok(true) => {}
            Ok(false) => {
                return Err(Error::Header {
                    path: PathBuf::new(),
                    reason: "file is empty".to_string(),
                })
            }
            Err(e) => {
                return Err(Error::Header {
                    path: PathBuf::new(),
                    reason: e.to_string(),
                })
            }
        }
        debug!("Statement header has {} columns", header.len());

        Ok(Self {
            records: rdr.into_records(),
            categorizer,
            line: 1,
            finished: false,
        })
    }

    fn parse_record(&self, record: &StringRecord) -> std::result::Result<Transaction, RowErrorKind> {
        if record.len() < MIN_COLUMNS {
            return Err(RowErrorKind::MissingColumns {
                expected: MIN_COLUMNS,
                found: record.len(),
            });
        }
        let col = |i: usize| record.get(i).unwrap_or("");

        let amount = parse_amount(col(COL_AMOUNT))?;
        let date = parse_date(col(COL_DATE))?;

        let raw_kind = col(COL_KIND);
        let recipient = extract_recipient(raw_kind, col(COL_RECIPIENT));
        let classification =
            self.categorizer
                .classify(col(COL_CATEGORY), col(COL_SUBCATEGORY), recipient);

        Ok(Transaction {
            kind: translate_transaction_type(raw_kind).to_string(),
            date,
            amount,
            recipient: recipient.to_string(),
            usage: col(COL_USAGE).to_string(),
            primary_category: classification.primary,
            secondary_category: classification.secondary,
        })
    }
}

impl<'c, R: Read> Iterator for StatementReader<'c, R> {
    type Item = std::result::Result<Transaction, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.records.next()?;
        self.line += 1;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                // A broken stream cannot make progress; stop after reporting it
                if e.is_io_error() {
                    self.finished = true;
                }
                return Some(Err(RowError::new(self.line, RowErrorKind::Malformed(e))));
            }
        };

        // Quoted fields may span lines; prefer the reader's own position
        if let Some(pos) = record.position() {
            self.line = pos.line();
        }

        Some(
            self.parse_record(&record)
                .map_err(|kind| RowError::new(self.line, kind)),
        )
    }
}

/// All transactions of one file plus the number of rejected rows
#[derive(Debug, Clone, Default)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    pub skipped: usize,
}

/// Parse a whole statement file, logging and skipping bad rows
pub fn parse_file(path: &Path, categorizer: &Categorizer) -> Result<ParsedStatement> {
    let reader = StatementReader::open(path, categorizer)?;
    let parsed = collect_rows(reader, path);

    debug!(
        path = %path.display(),
        "Parsed {} transactions ({} skipped)",
        parsed.transactions.len(),
        parsed.skipped
    );
    Ok(parsed)
}

/// Parse statement data from memory, logging and skipping bad rows
pub fn parse_csv<R: Read>(reader: R, categorizer: &Categorizer) -> Result<ParsedStatement> {
    let reader = StatementReader::from_reader(reader, categorizer)?;
    Ok(collect_rows(reader, Path::new("<memory>")))
}

fn collect_rows<R: Read>(reader: StatementReader<'_, R>, path: &Path) -> ParsedStatement {
    let mut parsed = ParsedStatement::default();
    for row in reader {
        match row {
            Ok(tx) => parsed.transactions.push(tx),
            Err(e) => {
                warn!(path = %path.display(), line = e.line, "Skipping row: {}", e.kind);
                parsed.skipped += 1;
            }
        }
    }
    parsed
}
