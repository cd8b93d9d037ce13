//! SQLite-backed policy adapter
//!
//! ## Logging Ownership
//!
//! `SqliteAdapter` owns lifecycle logging for every engine-facing operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The mutation and load/save functions underneath only use `tracing::debug!`
//! and `tracing::warn!`.

pub mod load_save;
pub mod mutation;

use rulestore_core::{log_op_end, log_op_error, log_op_start};
use rulestore_core::{Adapter, PolicySink, PolicySource};
use rusqlite::Connection;

use crate::codec::PolicyRow;
use crate::config::AdapterConfig;
use crate::db;
use crate::errors::Result;
use crate::table;

/// Policy adapter persisting rules in one SQLite table
///
/// Holds nothing but its connection and table name. It adds no locking of
/// its own: writers on other connections to the same database are ordered by
/// SQLite alone.
#[derive(Debug)]
pub struct SqliteAdapter {
    conn: Connection,
    table: String,
}

/// Rules a mutation addresses, for boundary events and error context
#[derive(Debug, Clone, Copy)]
struct RuleScope<'a> {
    sec: &'a str,
    ptype: &'a str,
    rule_count: usize,
}

impl<'a> RuleScope<'a> {
    fn new(sec: &'a str, ptype: &'a str, rule_count: usize) -> Self {
        Self {
            sec,
            ptype,
            rule_count,
        }
    }
}

/// Run `f` inside start/end/error boundary events for `op`.
///
/// Table-wide operations pass no scope; mutations pass the rules they touch.
fn observe(
    op: &'static str,
    table: &str,
    scope: Option<RuleScope<'_>>,
    f: impl FnOnce() -> Result<usize>,
) -> Result<usize> {
    match scope {
        Some(scope) => {
            log_op_start!(
                op,
                table = table,
                sec = scope.sec,
                ptype = scope.ptype,
                rule_count = scope.rule_count as u64
            );
        }
        None => {
            log_op_start!(op, table = table);
        }
    }
    let start = std::time::Instant::now();

    match f() {
        Ok(rows) => {
            log_op_end!(
                op,
                duration_ms = start.elapsed().as_millis() as u64,
                table = table,
                rows_affected = rows as u64
            );
            Ok(rows)
        }
        Err(err) => {
            let err = err.with_op(op).with_table(table);
            let err = match scope {
                Some(scope) => err.with_ptype(scope.ptype),
                None => err,
            };
            log_op_error!(
                op,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

impl SqliteAdapter {
    /// Connect, then create the rule table if it does not exist.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a bad table name or descriptor, `Persistence` if
    /// the database cannot be opened or the table cannot be created.
    pub fn new(config: AdapterConfig) -> Result<Self> {
        let table = config.resolved_table()?;
        let conn = db::connect(config)?;

        observe("adapter_new", &table, None, || {
            table::ensure_table(&conn, &table).map(|()| 0)
        })?;

        Ok(Self { conn, table })
    }

    /// Adapter over a database descriptor using the default table
    ///
    /// # Errors
    ///
    /// As [`SqliteAdapter::new`].
    pub fn open(dsn: &str) -> Result<Self> {
        Self::new(AdapterConfig::dsn(dsn))
    }

    /// Adapter over a caller-supplied connection
    ///
    /// # Errors
    ///
    /// As [`SqliteAdapter::new`].
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        Self::new(AdapterConfig::connection(conn).with_table(table))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Every stored row, for diagnostics
    ///
    /// # Errors
    ///
    /// `Persistence` if the table cannot be scanned.
    pub fn rows(&self) -> Result<Vec<PolicyRow>> {
        load_save::read_rows(&self.conn, &self.table)
    }
}

impl Adapter for SqliteAdapter {
    fn load_policy(&self, sink: &mut dyn PolicySink) -> Result<usize> {
        observe("load_policy", &self.table, None, || {
            load_save::load_all(&self.conn, &self.table, sink)
        })
    }

    fn save_policy(&mut self, source: &dyn PolicySource) -> Result<()> {
        observe("save_policy", &self.table, None, || {
            load_save::save_all(&self.conn, &self.table, source)
        })
        .map(|_| ())
    }

    fn add_policy(&mut self, sec: &str, ptype: &str, rule: &[String]) -> Result<()> {
        let scope = RuleScope::new(sec, ptype, 1);
        observe("add_policy", &self.table, Some(scope), || {
            mutation::add_one(&self.conn, &self.table, ptype, rule)
        })
        .map(|_| ())
    }

    fn add_policies(&mut self, sec: &str, ptype: &str, rules: &[Vec<String>]) -> Result<()> {
        let scope = RuleScope::new(sec, ptype, rules.len());
        observe("add_policies", &self.table, Some(scope), || {
            mutation::add_many(&self.conn, &self.table, ptype, rules)
        })
        .map(|_| ())
    }

    fn remove_policy(&mut self, sec: &str, ptype: &str, rule: &[String]) -> Result<usize> {
        let scope = RuleScope::new(sec, ptype, 1);
        observe("remove_policy", &self.table, Some(scope), || {
            mutation::remove_one(&self.conn, &self.table, ptype, rule)
        })
    }

    fn remove_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> Result<usize> {
        let scope = RuleScope::new(sec, ptype, rules.len());
        observe("remove_policies", &self.table, Some(scope), || {
            mutation::remove_many(&self.conn, &self.table, ptype, rules)
        })
    }

    fn remove_filtered_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<usize> {
        let scope = RuleScope::new(sec, ptype, 1);
        observe("remove_filtered_policy", &self.table, Some(scope), || {
            mutation::remove_filtered(&self.conn, &self.table, ptype, field_index, field_values)
        })
    }

    fn update_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        old_rule: &[String],
        new_rule: &[String],
    ) -> Result<usize> {
        let scope = RuleScope::new(sec, ptype, 1);
        observe("update_policy", &self.table, Some(scope), || {
            mutation::update_one(&self.conn, &self.table, ptype, old_rule, new_rule)
        })
    }

    fn update_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        old_rules: &[Vec<String>],
        new_rules: &[Vec<String>],
    ) -> Result<usize> {
        // Only paired rules are applied
        let scope = RuleScope::new(sec, ptype, old_rules.len().min(new_rules.len()));
        observe("update_policies", &self.table, Some(scope), || {
            mutation::update_many(&mut self.conn, &self.table, ptype, old_rules, new_rules)
        })
    }
}
