//! Service configuration
//!
//! Loaded from TOML (an explicit path, else `~/.config/tally/config.toml` if
//! present, else built-in defaults), then overridden from the environment:
//!
//! - `TALLY_INPUT_DIR`: directory scanned for statement files
//! - `TALLY_RUN_EVERY_MINUTES`: scheduler interval
//! - `TALLY_DB`: SQLite database path
//!
//! ```toml
//! input_dir = "/srv/statements"
//! run_every_minutes = 60
//! run_on_start = true
//!
//! [database]
//! path = "/var/lib/tally/tally.db"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::categorize::{Categorizer, CategoryRules};
use crate::db::DEFAULT_POOL_SIZE;
use crate::error::{Error, Result};

/// Default interval: once a day
pub const DEFAULT_RUN_EVERY_MINUTES: u64 = 24 * 60;

/// Longest accepted interval: one year
pub const MAX_RUN_EVERY_MINUTES: u64 = 366 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input_dir: PathBuf,
    pub run_every_minutes: u64,
    pub run_on_start: bool,
    /// Log filter used when neither `RUST_LOG` nor `--verbose` is given
    pub log_level: String,
    pub database: DatabaseConfig,
    /// Replaces the built-in categorization tables entirely
    pub rules: Option<CategoryRules>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            run_every_minutes: DEFAULT_RUN_EVERY_MINUTES,
            run_on_start: false,
            log_level: "info".to_string(),
            database: DatabaseConfig::default(),
            rules: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "tally.db".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Default config location (`~/.config/tally/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}

impl Config {
    /// Load configuration, apply environment overrides and validate
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `TALLY_*` overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("TALLY_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }

        if let Some(minutes) = lookup("TALLY_RUN_EVERY_MINUTES") {
            self.run_every_minutes = minutes.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "TALLY_RUN_EVERY_MINUTES must be a whole number of minutes, got {:?}",
                    minutes
                ))
            })?;
        }

        if let Some(db) = lookup("TALLY_DB") {
            self.database.path = db;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.run_every_minutes == 0 {
            return Err(Error::Config(
                "run_every_minutes must be greater than 0".to_string(),
            ));
        }
        if self.run_every_minutes > MAX_RUN_EVERY_MINUTES {
            return Err(Error::Config(format!(
                "run_every_minutes must be at most {} (one year), got {}",
                MAX_RUN_EVERY_MINUTES, self.run_every_minutes
            )));
        }
        if self.database.pool_size == 0 {
            return Err(Error::Config(
                "database.pool_size must be greater than 0".to_string(),
            ));
        }
        if let Some(rules) = &self.rules {
            if rules.fallback.trim().is_empty() {
                warn!("rules.fallback is empty; unmatched recipients get an empty category");
            }
        }
        Ok(())
    }

    /// Scheduler interval; saturates if `validate` was skipped
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.run_every_minutes.saturating_mul(60))
    }

    /// Categorizer for the configured rules (built-in tables if none)
    pub fn categorizer(&self) -> Categorizer {
        Categorizer::new(self.rules.clone().unwrap_or_default())
    }
}
