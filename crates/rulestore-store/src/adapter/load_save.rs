//! Bulk load into a policy sink and destructive bulk save from a source

use rulestore_core::model::{GROUPING_SECTION, POLICY_SECTION};
use rulestore_core::{PolicySink, PolicySource};
use rusqlite::Connection;

use crate::adapter::mutation::insert_rows;
use crate::codec::{decode, encode, PolicyRow};
use crate::errors::{from_rusqlite, Result};
use crate::query;
use crate::table::{drop_table, ensure_table};

/// Every stored row, in whatever order the table scan yields
///
/// # Errors
///
/// `Persistence` if the scan fails or a row holds a non-text value.
pub fn read_rows(conn: &Connection, table: &str) -> Result<Vec<PolicyRow>> {
    let mut stmt = conn
        .prepare(&query::select_all(table))
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], PolicyRow::from_sql_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

/// Decode every row and feed it to `sink`, returning how many lines it took.
///
/// A row that cannot be read as text, or that the sink rejects, is logged
/// and skipped so one bad row cannot block the rest of the policy.
pub fn load_all(conn: &Connection, table: &str, sink: &mut dyn PolicySink) -> Result<usize> {
    let mut stmt = conn
        .prepare(&query::select_all(table))
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], PolicyRow::from_sql_row)
        .map_err(from_rusqlite)?;

    let mut loaded = 0;
    let mut skipped = 0;
    for (index, row) in rows.enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(
                err @ (rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)),
            ) => {
                tracing::warn!(table, row = index, error = %err, "Skipping unreadable policy row");
                skipped += 1;
                continue;
            }
            Err(err) => return Err(from_rusqlite(err)),
        };

        let line = decode(&row);
        match sink.load_policy_line(&line) {
            Ok(true) => loaded += 1,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(table, line = %line, error = %err, "Skipping rejected policy line");
                skipped += 1;
            }
        }
    }

    tracing::debug!(table, loaded, skipped, "Loaded policy rows");
    Ok(loaded)
}

/// Drop and recreate the table, then insert every `p` rule followed by every
/// `g` rule of `source`. The three steps are not wrapped in a transaction:
/// a failure part way leaves the table dropped or empty, never partly filled.
pub fn save_all(conn: &Connection, table: &str, source: &dyn PolicySource) -> Result<usize> {
    drop_table(conn, table)?;
    ensure_table(conn, table)?;

    let rows: Vec<PolicyRow> = [POLICY_SECTION, GROUPING_SECTION]
        .into_iter()
        .flat_map(|sec| source.section_rules(sec))
        .map(|(ptype, fields)| encode(ptype, fields))
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }
    insert_rows(conn, table, &rows)
}
