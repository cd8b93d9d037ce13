#![allow(dead_code)]

use rulestore_core::{PolicySink, Result};
use rulestore_store::{decode, SqliteAdapter};

/// Sink recording every line it is fed
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl PolicySink for RecordingSink {
    fn load_policy_line(&mut self, line: &str) -> Result<bool> {
        self.lines.push(line.to_string());
        Ok(true)
    }
}

pub fn fields(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn rules(values: &[&[&str]]) -> Vec<Vec<String>> {
    values.iter().map(|r| fields(r)).collect()
}

/// Fresh adapter over a private in-memory database
pub fn memory_adapter() -> SqliteAdapter {
    SqliteAdapter::open(":memory:").expect("Failed to open in-memory adapter")
}

/// Stored rows decoded to lines, sorted so scan order does not matter
pub fn stored_lines(adapter: &SqliteAdapter) -> Vec<String> {
    let mut lines: Vec<String> = adapter
        .rows()
        .expect("Failed to read rows")
        .iter()
        .map(decode)
        .collect();
    lines.sort();
    lines
}
