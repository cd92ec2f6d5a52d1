//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::Path;

use tally_core::{Config, Database};
use tempfile::TempDir;

use crate::commands::{self, truncate};

const HEADER: &str = "Transaktionstyp,Buchungsdatum,Betrag,Zahlungsempfänger,IBAN,BIC,Verwendungszweck,Beschreibung,Kategorie,Unterkategorie";

/// Config pointing at a fresh input directory and database inside `dir`
fn setup_test_config(dir: &TempDir) -> Config {
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();

    let mut config = Config {
        input_dir: input,
        ..Default::default()
    };
    config.database.path = dir.path().join("tally.db").to_string_lossy().into_owned();
    config
}

fn write_statement(path: &Path, rows: &[&str]) {
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    fs::write(path, body).unwrap();
}

// ========== Init / Status Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);

    commands::cmd_init(&config).unwrap();
    assert!(Path::new(&config.database.path).exists());
}

#[test]
fn test_cmd_status_without_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);

    assert!(commands::cmd_status(&config).is_ok());
    assert!(!Path::new(&config.database.path).exists());
}

#[test]
fn test_cmd_status_after_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);
    write_statement(
        &config.input_dir.join("jan.csv"),
        &[r#"Kartenzahlung,11.01.2025,"-37,20",REWE Markt,,,Einkauf,,Lebensmittel,Supermarkt"#],
    );

    commands::cmd_ingest(&config).unwrap();
    assert!(commands::cmd_status(&config).is_ok());
}

// ========== Ingest Command Tests ==========

#[test]
fn test_cmd_ingest_stores_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);
    write_statement(
        &config.input_dir.join("jan.csv"),
        &[
            r#"Kartenzahlung,11.01.2025,"-37,20",REWE Markt,,,Einkauf,,Lebensmittel,Supermarkt"#,
            r#"Kartenzahlung,12.01.2025,"-3,10",Bäckerei Müller,,,,,Lebensmittel,Bäckerei"#,
        ],
    );

    commands::cmd_ingest(&config).unwrap();
    commands::cmd_ingest(&config).unwrap();

    let db = Database::new(&config.database.path).unwrap();
    assert_eq!(db.count_transactions().unwrap(), 2);
    assert_eq!(db.count_file_hashes().unwrap(), 1);
}

#[test]
fn test_cmd_ingest_missing_input_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup_test_config(&dir);
    config.input_dir = dir.path().join("does-not-exist");

    assert!(commands::cmd_ingest(&config).is_err());
}

#[test]
fn test_build_pipeline_uses_configured_rules() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup_test_config(&dir);
    config.rules = Some(tally_core::CategoryRules {
        recipient_rules: Vec::new(),
        fallback: "Uncategorized".to_string(),
        ..Default::default()
    });

    let pipeline = commands::build_pipeline(&config).unwrap();
    assert_eq!(pipeline.categorizer().by_recipient("GITHUB"), "Uncategorized");
    assert_eq!(pipeline.input_dir(), config.input_dir.as_path());
}

// ========== Parse Command Tests ==========

#[test]
fn test_cmd_parse_table_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);
    let file = dir.path().join("statement.csv");
    write_statement(
        &file,
        &[
            r#"SEPA-Überweisung,15.01.2025,"2500,00","ACME GmbH, DE02120300000000202051",,,Gehalt,,Einkommen,Lohn/ Gehalt"#,
            r#"Kartenzahlung,not-a-date,"-1,00",REWE,,,,,Lebensmittel,Supermarkt"#,
        ],
    );

    assert!(commands::cmd_parse(&config, &file, false).is_ok());
    assert!(commands::cmd_parse(&config, &file, true).is_ok());

    // Parsing never touches the database
    assert!(!Path::new(&config.database.path).exists());
}

#[test]
fn test_cmd_parse_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);

    let result = commands::cmd_parse(&config, &dir.path().join("missing.csv"), false);
    assert!(result.is_err());
}

#[test]
fn test_cmd_classify() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup_test_config(&dir);

    // Prints only; must not panic on empty or unknown input
    commands::cmd_classify(&config, "Weitere Ausgaben", "", "GITHUB");
    commands::cmd_classify(&config, "", "", "");
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long string", 10), "this is...");
    assert_eq!(truncate("Bäckerei Müller", 8), "Bäcke...");
}
