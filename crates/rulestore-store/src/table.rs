//! Rule table lifecycle
//!
//! The schema is fixed and shared with other adapters reading the same table,
//! so it must not drift: `ptype VARCHAR(10)` and `v0..v5 VARCHAR(256)`, all
//! `NOT NULL DEFAULT ''`, no key.

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// `CREATE TABLE` statement for `table` (already validated)
pub fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS "{table}" (
    ptype VARCHAR(10) NOT NULL DEFAULT '',
    v0 VARCHAR(256) NOT NULL DEFAULT '',
    v1 VARCHAR(256) NOT NULL DEFAULT '',
    v2 VARCHAR(256) NOT NULL DEFAULT '',
    v3 VARCHAR(256) NOT NULL DEFAULT '',
    v4 VARCHAR(256) NOT NULL DEFAULT '',
    v5 VARCHAR(256) NOT NULL DEFAULT ''
)"#
    )
}

pub fn drop_table_sql(table: &str) -> String {
    format!(r#"DROP TABLE IF EXISTS "{table}""#)
}

/// Create the rule table unless it exists. A single statement, so it either
/// fully happens or not at all.
///
/// # Errors
///
/// `Persistence` with the backend message.
pub fn ensure_table(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(&create_table_sql(table), [])
        .map_err(|e| from_rusqlite(e).with_op("ensure_table").with_table(table))?;
    tracing::debug!(table, "Ensured policy table");
    Ok(())
}

/// Drop the rule table; a missing table is not an error.
///
/// # Errors
///
/// `Persistence` with the backend message.
pub fn drop_table(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(&drop_table_sql(table), [])
        .map_err(|e| from_rusqlite(e).with_op("drop_table").with_table(table))?;
    tracing::debug!(table, "Dropped policy table");
    Ok(())
}

/// Whether `table` exists in the main schema
///
/// # Errors
///
/// `Persistence` if the catalog cannot be read.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count > 0)
    .map_err(|e| from_rusqlite(e).with_op("table_exists").with_table(table))
}
