//! Adapter configuration
//!
//! `AdapterConfig` is what an adapter is built from and owns for its whole
//! life. `AdapterSettings` is the serializable subset that can live in a TOML
//! file; it can only describe descriptor-based connections.

use std::path::Path;

use rusqlite::Connection;
use serde::Deserialize;

use crate::errors::{invalid_table_name, io_error, settings_parse, Result};

/// Table used when the configured name is empty
pub const DEFAULT_TABLE_NAME: &str = "casbin_policy";

/// Busy timeout applied to connections the adapter opens itself
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const MAX_TABLE_NAME_LEN: usize = 64;

/// Where the adapter's connection comes from
#[derive(Debug)]
pub enum Database {
    /// Path to a database file, or `:memory:`
    Dsn(String),
    /// Connection opened and configured by the caller
    Connection(Connection),
}

#[derive(Debug)]
pub struct AdapterConfig {
    pub database: Database,
    /// Rule table name; empty means [`DEFAULT_TABLE_NAME`]
    pub table: String,
    /// Only applied to connections opened from a descriptor
    pub busy_timeout_ms: u64,
    /// Route every executed statement to `tracing` at debug level
    pub log_statements: bool,
}

impl AdapterConfig {
    pub fn dsn(dsn: impl Into<String>) -> Self {
        Self::from_database(Database::Dsn(dsn.into()))
    }

    pub fn connection(conn: Connection) -> Self {
        Self::from_database(Database::Connection(conn))
    }

    fn from_database(database: Database) -> Self {
        Self {
            database,
            table: String::new(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_statements: false,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// The table name to use, defaulted and validated.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the name cannot be used as a bare SQL identifier.
    pub fn resolved_table(&self) -> Result<String> {
        let table = if self.table.is_empty() {
            DEFAULT_TABLE_NAME
        } else {
            self.table.as_str()
        };
        validate_table_name(table)?;
        Ok(table.to_string())
    }
}

/// Table names are spliced into SQL text, so only plain identifiers pass.
///
/// # Errors
///
/// `InvalidConfig` describing the first rule the name breaks.
pub fn validate_table_name(table: &str) -> Result<()> {
    let Some(first) = table.chars().next() else {
        return Err(invalid_table_name(table, "name is empty"));
    };
    if table.len() > MAX_TABLE_NAME_LEN {
        return Err(invalid_table_name(table, "name is longer than 64 characters"));
    }
    if first.is_ascii_digit() {
        return Err(invalid_table_name(table, "name starts with a digit"));
    }
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid_table_name(
            table,
            "only ASCII letters, digits and '_' are allowed",
        ));
    }
    Ok(())
}

/// File-friendly adapter settings
///
/// ```toml
/// dsn = "/var/lib/app/policy.db"
/// table = "casbin_policy"
/// busy_timeout_ms = 5000
/// log_statements = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterSettings {
    pub dsn: String,
    pub table: String,
    pub busy_timeout_ms: u64,
    pub log_statements: bool,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            dsn: ":memory:".to_string(),
            table: String::new(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_statements: false,
        }
    }
}

impl AdapterSettings {
    /// # Errors
    ///
    /// `Serialization` if the text is not valid TOML or has unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(settings_parse)
    }

    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| io_error("read_settings", e))?;
        Self::from_toml_str(&text)
    }

    pub fn into_config(self) -> AdapterConfig {
        AdapterConfig::dsn(self.dsn)
            .with_table(self.table)
            .with_busy_timeout_ms(self.busy_timeout_ms)
            .with_statement_logging(self.log_statements)
    }
}
