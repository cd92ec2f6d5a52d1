//! File digest operations

use std::collections::HashSet;

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::FileRecord;

impl Database {
    /// All recorded digests, read in one query
    pub fn get_known_hashes(&self) -> Result<HashSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT sha256 FROM file_hashes")?;

        let hashes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;

        Ok(hashes)
    }

    /// Record a processed file (a digest that is already present is kept as is)
    pub fn insert_file_record(&self, record: &FileRecord) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO file_hashes (path, sha256) VALUES (?, ?)",
            params![record.path, record.sha256],
        )?;
        Ok(())
    }

    /// Most recently recorded files first
    pub fn list_file_records(&self, limit: i64) -> Result<Vec<FileRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT path, sha256 FROM file_hashes ORDER BY id DESC LIMIT ?")?;

        let records = stmt
            .query_map(params![limit], |row| {
                Ok(FileRecord {
                    path: row.get(0)?,
                    sha256: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count_file_hashes(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM file_hashes", [], |row| row.get(0))?;
        Ok(count)
    }
}
