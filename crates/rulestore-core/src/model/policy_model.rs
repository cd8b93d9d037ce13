//! Minimal in-memory policy model
//!
//! Stands in for the evaluation engine's model: it accepts decoded policy
//! lines from an adapter and hands rules back for a full save. Rules are kept
//! per section and policy type in insertion order, without duplicates.

use std::collections::BTreeMap;

use crate::adapter::{PolicySink, PolicySource};
use crate::errors::{Result, RuleError};
use crate::model::rule::{section_of, Rule, GROUPING_SECTION, POLICY_SECTION};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyModel {
    sections: BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>,
}

impl PolicyModel {
    /// Empty model with no policy types defined
    pub fn new() -> Self {
        Self::default()
    }

    /// Model defining the conventional `p` and `g` policy types
    pub fn with_defaults() -> Self {
        let mut model = Self::new();
        model.add_def(POLICY_SECTION).add_def(GROUPING_SECTION);
        model
    }

    /// Define a policy type; its section is derived from its first character.
    pub fn add_def(&mut self, ptype: &str) -> &mut Self {
        self.sections
            .entry(section_of(ptype).to_string())
            .or_default()
            .entry(ptype.to_string())
            .or_default();
        self
    }

    pub fn has_def(&self, sec: &str, ptype: &str) -> bool {
        self.sections
            .get(sec)
            .is_some_and(|types| types.contains_key(ptype))
    }

    /// Add a rule, returning `false` if an identical rule is already present.
    ///
    /// # Errors
    ///
    /// `UnknownPolicyType` if `ptype` was never defined in `sec`.
    pub fn add_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        rule: Vec<String>,
    ) -> std::result::Result<bool, RuleError> {
        let rules = self
            .sections
            .get_mut(sec)
            .and_then(|types| types.get_mut(ptype))
            .ok_or_else(|| RuleError::UnknownPolicyType {
                sec: sec.to_string(),
                ptype: ptype.to_string(),
            })?;

        if rules.contains(&rule) {
            return Ok(false);
        }
        rules.push(rule);
        Ok(true)
    }

    /// Remove a rule, returning whether it was present
    pub fn remove_policy(&mut self, sec: &str, ptype: &str, rule: &[String]) -> bool {
        let Some(rules) = self.sections.get_mut(sec).and_then(|t| t.get_mut(ptype)) else {
            return false;
        };
        let before = rules.len();
        rules.retain(|r| r.as_slice() != rule);
        rules.len() != before
    }

    pub fn has_policy(&self, sec: &str, ptype: &str, rule: &[String]) -> bool {
        self.get_policy(sec, ptype).iter().any(|r| r.as_slice() == rule)
    }

    /// Rules stored under a policy type; empty if undefined
    pub fn get_policy(&self, sec: &str, ptype: &str) -> &[Vec<String>] {
        self.sections
            .get(sec)
            .and_then(|types| types.get(ptype))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop every rule, keeping the policy type definitions
    pub fn clear_policy(&mut self) {
        for rules in self.sections.values_mut().flat_map(|t| t.values_mut()) {
            rules.clear();
        }
    }

    /// Total number of rules across all sections
    pub fn policy_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(|t| t.values())
            .map(Vec::len)
            .sum()
    }
}

impl PolicySink for PolicyModel {
    fn load_policy_line(&mut self, line: &str) -> Result<bool> {
        let Some(Rule { ptype, fields }) = Rule::parse_line(line)? else {
            return Ok(false);
        };
        let sec = section_of(&ptype).to_string();
        Ok(self.add_policy(&sec, &ptype, fields)?)
    }
}

impl PolicySource for PolicyModel {
    fn section_rules(&self, sec: &str) -> Vec<(&str, &[String])> {
        self.sections
            .get(sec)
            .into_iter()
            .flat_map(|types| types.iter())
            .flat_map(|(ptype, rules)| rules.iter().map(move |r| (ptype.as_str(), r.as_slice())))
            .collect()
    }
}
