//! Transaction operations

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Row};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Database;
use crate::error::{Error, Result};
use crate::models::Transaction;

/// A transaction as stored, with its row id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredTransaction {
    pub id: i64,
    #[serde(flatten)]
    pub transaction: Transaction,
}

impl Database {
    /// Insert a transaction and return its row id
    pub fn add_transaction(&self, tx: &Transaction) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO transactions (kind, date, recipient, amount, usage, primary_category, secondary_category)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.kind,
                tx.date.to_string(),
                tx.recipient,
                tx.amount.to_string(),
                tx.usage,
                tx.primary_category,
                tx.secondary_category,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Most recent transactions first (by date, then insertion order)
    pub fn list_transactions(&self, limit: i64) -> Result<Vec<StoredTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, kind, date, amount, recipient, usage, primary_category, secondary_category
            FROM transactions
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt
            .query_map(params![limit], read_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_stored).collect()
    }

    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Columns as SQLite returns them, before date/amount decoding
struct RawRow {
    id: i64,
    kind: String,
    date: String,
    amount: String,
    recipient: String,
    usage: String,
    primary_category: String,
    secondary_category: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
        recipient: row.get(4)?,
        usage: row.get(5)?,
        primary_category: row.get(6)?,
        secondary_category: row.get(7)?,
    })
}

impl RawRow {
    fn into_stored(self) -> Result<StoredTransaction> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            Error::Sink(format!("transaction {} has invalid date {:?}: {}", self.id, self.date, e))
        })?;
        let amount = Decimal::from_str(&self.amount).map_err(|e| {
            Error::Sink(format!(
                "transaction {} has invalid amount {:?}: {}",
                self.id, self.amount, e
            ))
        })?;

        Ok(StoredTransaction {
            id: self.id,
            transaction: Transaction {
                kind: self.kind,
                date,
                amount,
                recipient: self.recipient,
                usage: self.usage,
                primary_category: self.primary_category,
                secondary_category: self.secondary_category,
            },
        })
    }
}
