//! Row mutations
//!
//! Free functions over a connection and a validated table name. Deletes are
//! single statements. Inserts too, until a batch outgrows one statement and
//! [`insert_rows`] falls back to a savepoint. [`update_many`] is the only
//! operation opening a transaction.

use rusqlite::Connection;

use crate::codec::{encode, PolicyRow};
use crate::errors::{from_rusqlite, Result};
use crate::query::{self, Conjunction, Disjunction, Statement, MAX_ROWS_PER_INSERT};

fn execute(conn: &Connection, stmt: &Statement) -> Result<usize> {
    conn.execute(&stmt.sql, stmt.bind()).map_err(from_rusqlite)
}

/// Insert rows as one failure unit: either every row lands or none does.
///
/// A batch past [`MAX_ROWS_PER_INSERT`] needs several statements, so they run
/// under a savepoint, which also nests inside a caller's open transaction.
/// Callers never pass an empty slice.
pub(crate) fn insert_rows(conn: &Connection, table: &str, rows: &[PolicyRow]) -> Result<usize> {
    if rows.len() <= MAX_ROWS_PER_INSERT {
        return execute(conn, &query::insert(table, rows));
    }

    conn.execute_batch("SAVEPOINT insert_rows").map_err(from_rusqlite)?;
    let mut inserted = 0;
    for batch in rows.chunks(MAX_ROWS_PER_INSERT) {
        match execute(conn, &query::insert(table, batch)) {
            Ok(count) => inserted += count,
            Err(err) => {
                if let Err(rollback) =
                    conn.execute_batch("ROLLBACK TO insert_rows; RELEASE insert_rows")
                {
                    tracing::warn!(
                        table,
                        error = %rollback,
                        "Failed to roll back partial insert"
                    );
                }
                return Err(err);
            }
        }
    }
    conn.execute_batch("RELEASE insert_rows").map_err(from_rusqlite)?;

    tracing::debug!(table, inserted, "Inserted policy rows under savepoint");
    Ok(inserted)
}

fn delete_where(conn: &Connection, table: &str, filter: &Disjunction) -> Result<usize> {
    let deleted = execute(conn, &query::delete(table, filter))?;
    tracing::debug!(table, branches = filter.len(), deleted, "Deleted policy rows");
    Ok(deleted)
}

/// Insert one rule. Calling it twice stores two identical rows.
pub fn add_one(conn: &Connection, table: &str, ptype: &str, fields: &[String]) -> Result<usize> {
    insert_rows(conn, table, &[encode(ptype, fields)])
}

pub fn add_many(
    conn: &Connection,
    table: &str,
    ptype: &str,
    rules: &[Vec<String>],
) -> Result<usize> {
    if rules.is_empty() {
        return Ok(0);
    }
    let rows: Vec<PolicyRow> = rules.iter().map(|rule| encode(ptype, rule)).collect();
    insert_rows(conn, table, &rows)
}

/// Delete rows equal to the rule on its non-empty fields
pub fn remove_one(
    conn: &Connection,
    table: &str,
    ptype: &str,
    fields: &[String],
) -> Result<usize> {
    let filter = Conjunction::non_empty(&encode(ptype, fields));
    delete_where(conn, table, &filter.into())
}

/// Delete rows whose columns `field_index..field_index + field_values.len()`
/// equal `field_values`. Empty values and columns outside the window are
/// unconstrained; `ptype` always is.
pub fn remove_filtered(
    conn: &Connection,
    table: &str,
    ptype: &str,
    field_index: usize,
    field_values: &[String],
) -> Result<usize> {
    let mut row = PolicyRow {
        ptype: ptype.to_string(),
        ..PolicyRow::default()
    };
    for (column, slot) in row.values.iter_mut().enumerate() {
        let value = column
            .checked_sub(field_index)
            .and_then(|offset| field_values.get(offset));
        if let Some(value) = value {
            slot.clone_from(value);
        }
    }
    delete_where(conn, table, &Conjunction::non_empty(&row).into())
}

/// Delete rows matching any rule. Each rule constrains `ptype` and exactly
/// as many leading columns as it has fields, empty values included.
pub fn remove_many(
    conn: &Connection,
    table: &str,
    ptype: &str,
    rules: &[Vec<String>],
) -> Result<usize> {
    if rules.is_empty() {
        return Ok(0);
    }
    let filter: Disjunction = rules
        .iter()
        .map(|rule| Conjunction::prefix(ptype, rule))
        .collect();
    delete_where(conn, table, &filter)
}

/// Rewrite rows matching every column of `old` (empty ones included) to `new`
pub fn update_one(
    conn: &Connection,
    table: &str,
    ptype: &str,
    old: &[String],
    new: &[String],
) -> Result<usize> {
    let filter = Conjunction::exact(&encode(ptype, old));
    let updated = execute(conn, &query::update(table, &encode(ptype, new), &filter))?;
    tracing::debug!(table, ptype, updated, "Updated policy rows");
    Ok(updated)
}

/// Pair `olds[i]` with `news[i]` up to the shorter list and apply every pair
/// in one transaction. A pair matching no rows is not a failure.
pub fn update_many(
    conn: &mut Connection,
    table: &str,
    ptype: &str,
    olds: &[Vec<String>],
    news: &[Vec<String>],
) -> Result<usize> {
    if olds.is_empty() || news.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    let mut updated = 0;
    for (old, new) in olds.iter().zip(news) {
        // Dropping `tx` on error rolls back the pairs already applied
        updated += update_one(&tx, table, ptype, old, new)?;
    }
    tx.commit().map_err(from_rusqlite)?;

    if olds.len() != news.len() {
        tracing::debug!(
            table,
            olds = olds.len(),
            news = news.len(),
            "Ignored unpaired update rules"
        );
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ensure_table;

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM rules", [], |r| r.get(0))
            .unwrap()
    }

    fn numbered_rows(count: usize) -> Vec<PolicyRow> {
        (0..count)
            .map(|i| encode("p", &[format!("user_{i}")]))
            .collect()
    }

    #[test]
    fn test_insert_rows_spanning_chunks_commits_all() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn, "rules").unwrap();

        let rows = numbered_rows(MAX_ROWS_PER_INSERT + 10);
        let inserted = insert_rows(&conn, "rules", &rows).unwrap();

        assert_eq!(inserted, MAX_ROWS_PER_INSERT + 10);
        assert_eq!(row_count(&conn), (MAX_ROWS_PER_INSERT + 10) as i64);
        assert!(conn.is_autocommit(), "savepoint released");
    }

    #[test]
    fn test_insert_rows_failing_late_chunk_keeps_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn, "rules").unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_bad BEFORE INSERT ON rules WHEN NEW.v0 = 'bad' \
             BEGIN SELECT RAISE(ABORT, 'bad value'); END;",
        )
        .unwrap();

        let mut rows = numbered_rows(MAX_ROWS_PER_INSERT + 100);
        rows[MAX_ROWS_PER_INSERT + 50] = encode("p", &["bad"]);

        let err = insert_rows(&conn, "rules", &rows).unwrap_err();

        assert!(err.message().contains("bad value"));
        assert_eq!(row_count(&conn), 0);
        assert!(conn.is_autocommit(), "savepoint released after rollback");
    }

    #[test]
    fn test_insert_rows_nests_inside_open_transaction() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn, "rules").unwrap();

        conn.execute_batch("BEGIN").unwrap();
        insert_rows(&conn, "rules", &numbered_rows(MAX_ROWS_PER_INSERT + 1)).unwrap();
        assert!(!conn.is_autocommit());
        conn.execute_batch("ROLLBACK").unwrap();

        assert_eq!(row_count(&conn), 0, "caller's rollback discards the batch");
    }
}
