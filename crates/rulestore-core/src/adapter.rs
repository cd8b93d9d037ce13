//! Seams between a storage adapter and the policy engine
//!
//! The engine owns the in-memory model; adapters only see it through
//! [`PolicySink`] (loading) and [`PolicySource`] (saving). Engines drive
//! persistence through [`Adapter`].

use crate::errors::Result;

/// Receives decoded policy lines during a load
pub trait PolicySink {
    /// Parse one policy line (`p, alice, data1, read`) into the model.
    ///
    /// Returns `Ok(false)` when the line carries no rule (blank or comment).
    ///
    /// # Errors
    ///
    /// Any error rejecting the line; adapters skip the line and continue.
    fn load_policy_line(&mut self, line: &str) -> Result<bool>;
}

/// Supplies every rule of a section during a full save
pub trait PolicySource {
    /// `(ptype, fields)` for every rule in `sec`
    fn section_rules(&self, sec: &str) -> Vec<(&str, &[String])>;
}

/// Persistence contract consumed by the policy engine
///
/// Every mutation takes the `sec` the engine addresses; storage is not
/// partitioned by it; rows are keyed by `ptype` alone.
pub trait Adapter {
    /// Load every stored rule into `sink`, returning how many it accepted.
    ///
    /// # Errors
    ///
    /// Backend failure reading the table. Rows the sink rejects are skipped.
    fn load_policy(&self, sink: &mut dyn PolicySink) -> Result<usize>;

    /// Replace the stored rules with every `p` and `g` rule of `source`.
    ///
    /// # Errors
    ///
    /// Backend failure dropping, recreating or filling the table.
    fn save_policy(&mut self, source: &dyn PolicySource) -> Result<()>;

    /// # Errors
    ///
    /// Backend failure inserting the row.
    fn add_policy(&mut self, sec: &str, ptype: &str, rule: &[String]) -> Result<()>;

    /// # Errors
    ///
    /// Backend failure inserting the batch.
    fn add_policies(&mut self, sec: &str, ptype: &str, rules: &[Vec<String>]) -> Result<()>;

    /// Delete rows equal to `rule` on its non-empty fields; returns rows deleted.
    ///
    /// # Errors
    ///
    /// Backend failure executing the delete.
    fn remove_policy(&mut self, sec: &str, ptype: &str, rule: &[String]) -> Result<usize>;

    /// Delete rows matching any of `rules` on their leading fields.
    ///
    /// # Errors
    ///
    /// Backend failure executing the delete.
    fn remove_policies(&mut self, sec: &str, ptype: &str, rules: &[Vec<String>])
        -> Result<usize>;

    /// Delete rows whose fields starting at `field_index` equal `field_values`.
    ///
    /// # Errors
    ///
    /// Backend failure executing the delete.
    fn remove_filtered_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<usize>;

    /// Rewrite rows exactly equal to `old_rule` into `new_rule`.
    ///
    /// # Errors
    ///
    /// Backend failure executing the update.
    fn update_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        old_rule: &[String],
        new_rule: &[String],
    ) -> Result<usize>;

    /// Pairwise [`Adapter::update_policy`] in one transaction.
    ///
    /// # Errors
    ///
    /// Backend failure on any pair; no pair is applied in that case.
    fn update_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        old_rules: &[Vec<String>],
        new_rules: &[Vec<String>],
    ) -> Result<usize>;
}
