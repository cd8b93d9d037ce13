//! Database connection management
//!
//! Opens SQLite connections from a descriptor and applies connection settings

use crate::config::{AdapterConfig, Database};
use crate::errors::{from_rusqlite, invalid_config, Result};
use rusqlite::Connection;
use std::time::Duration;

/// Descriptor selecting a private in-memory database
pub const MEMORY_DSN: &str = ":memory:";

/// Open a SQLite database from a descriptor (file path or `:memory:`)
///
/// # Errors
///
/// `InvalidConfig` for a blank descriptor, `Persistence` if SQLite refuses it.
pub fn open(dsn: &str) -> Result<Connection> {
    if dsn.trim().is_empty() {
        return Err(invalid_config("database descriptor is empty"));
    }
    if dsn == MEMORY_DSN {
        return open_in_memory();
    }
    Connection::open(dsn).map_err(|e| from_rusqlite(e).with_op("open"))
}

/// Open an in-memory SQLite database (for testing)
///
/// # Errors
///
/// `Persistence` if SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| from_rusqlite(e).with_op("open"))
}

/// Wait up to `timeout` on a locked database instead of failing immediately
///
/// # Errors
///
/// `Persistence` if the setting is rejected.
pub fn configure(conn: &Connection, timeout: Duration) -> Result<()> {
    conn.busy_timeout(timeout).map_err(from_rusqlite)
}

/// Send every statement the connection executes to `tracing`
pub fn enable_statement_logging(conn: &mut Connection) {
    conn.trace(Some(log_statement));
}

fn log_statement(sql: &str) {
    tracing::debug!(target: "rulestore_store::sql", sql, "statement");
}

/// Resolve the configured database into a ready connection
///
/// Descriptor connections get the busy timeout; caller-supplied connections
/// are used as they are. Statement logging applies to both.
///
/// # Errors
///
/// As [`open`] and [`configure`].
pub fn connect(config: AdapterConfig) -> Result<Connection> {
    let mut conn = match config.database {
        Database::Dsn(dsn) => {
            let conn = open(&dsn)?;
            configure(&conn, Duration::from_millis(config.busy_timeout_ms))?;
            conn
        }
        Database::Connection(conn) => conn,
    };

    if config.log_statements {
        enable_statement_logging(&mut conn);
    }

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulestore_core::ExErrorKind;

    #[test]
    fn test_open_memory_descriptor() {
        let conn = open(MEMORY_DSN).unwrap();
        let one: i64 = conn.query_row("SELECT 1", [], |r| r.get(0)).unwrap();
        assert_eq!(one, 1);
    }

    #[test]
    fn test_blank_descriptor_rejected() {
        let err = open("  ").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_unopenable_path_is_persistence_error() {
        let err = open("/nonexistent-dir/for/sure/policy.db").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.op(), Some("open"));
    }
}
