//! Database tests

use super::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample_tx(recipient: &str, amount: &str, day: u32) -> Transaction {
        Transaction {
            kind: "Card Payment".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            recipient: recipient.to_string(),
            usage: "memo".to_string(),
            primary_category: "Groceries".to_string(),
            secondary_category: "Supermarket".to_string(),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.count_transactions().unwrap(), 0);
        assert!(db.get_known_hashes().unwrap().is_empty());
    }

    #[test]
    fn test_schema_columns() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('id', 'kind', 'date', 'amount', 'recipient', 'usage', 'primary_category', 'secondary_category', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 9, "transactions table should have 9 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('file_hashes') WHERE name IN ('id', 'path', 'sha256', 'recorded_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 4, "file_hashes table should have 4 expected columns");
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new(path).unwrap();
            db.add_transaction(&sample_tx("REWE", "-1.00", 1)).unwrap();
        }

        let db = Database::new(path).unwrap();
        assert_eq!(db.count_transactions().unwrap(), 1);
    }

    #[test]
    fn test_file_records() {
        let db = Database::in_memory().unwrap();

        db.insert_file_record(&FileRecord::new("a.csv", "aa")).unwrap();
        db.insert_file_record(&FileRecord::new("b.csv", "bb")).unwrap();
        // Same content under another name is not recorded twice
        db.insert_file_record(&FileRecord::new("copy-of-a.csv", "aa"))
            .unwrap();

        let hashes = db.get_known_hashes().unwrap();
        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains("aa"));
        assert!(hashes.contains("bb"));
        assert_eq!(db.count_file_hashes().unwrap(), 2);

        let records = db.list_file_records(10).unwrap();
        assert_eq!(records[0], FileRecord::new("b.csv", "bb"));
        assert_eq!(records[1], FileRecord::new("a.csv", "aa"));
    }

    #[test]
    fn test_transaction_round_trip_keeps_exact_amount() {
        let db = Database::in_memory().unwrap();

        let tx = sample_tx("REWE Markt", "-37.20", 11);
        let id = db.add_transaction(&tx).unwrap();
        assert!(id > 0);

        let stored = db.list_transactions(10).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].transaction, tx);
        assert_eq!(stored[0].transaction.amount.to_string(), "-37.20");
    }

    #[test]
    fn test_list_transactions_newest_first() {
        let db = Database::in_memory().unwrap();
        db.add_transaction(&sample_tx("old", "-1", 1)).unwrap();
        db.add_transaction(&sample_tx("new", "-2", 20)).unwrap();
        db.add_transaction(&sample_tx("mid", "-3", 10)).unwrap();

        let stored = db.list_transactions(2).unwrap();
        let recipients: Vec<_> = stored
            .iter()
            .map(|s| s.transaction.recipient.as_str())
            .collect();
        assert_eq!(recipients, vec!["new", "mid"]);
    }

    #[test]
    fn test_sink_impl_delegates() {
        let db = Database::in_memory().unwrap();
        let sink: &dyn LedgerSink = &db;

        sink.record_hash(&FileRecord::new("x.csv", "cafe")).unwrap();
        sink.insert_transaction(&sample_tx("REWE", "-5", 2)).unwrap();

        assert!(sink.known_hashes().unwrap().contains("cafe"));
        assert_eq!(db.count_transactions().unwrap(), 1);
    }
}
