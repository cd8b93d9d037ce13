//! Rule codec
//!
//! Maps variable-length rules onto the fixed `(ptype, v0..v5)` row and back.
//! Absent fields and empty strings are the same thing on both sides.

use rulestore_core::MAX_FIELDS;

/// Columns of the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    PType,
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl Column {
    /// Positional value columns, `v0` first
    pub const VALUES: [Column; MAX_FIELDS] = [
        Column::V0,
        Column::V1,
        Column::V2,
        Column::V3,
        Column::V4,
        Column::V5,
    ];

    /// Every column in table order
    pub const ALL: [Column; MAX_FIELDS + 1] = [
        Column::PType,
        Column::V0,
        Column::V1,
        Column::V2,
        Column::V3,
        Column::V4,
        Column::V5,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::PType => "ptype",
            Column::V0 => "v0",
            Column::V1 => "v1",
            Column::V2 => "v2",
            Column::V3 => "v3",
            Column::V4 => "v4",
            Column::V5 => "v5",
        }
    }
}

/// One stored rule row
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PolicyRow {
    pub ptype: String,
    pub values: [String; MAX_FIELDS],
}

impl PolicyRow {
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::PType => &self.ptype,
            Column::V0 => &self.values[0],
            Column::V1 => &self.values[1],
            Column::V2 => &self.values[2],
            Column::V3 => &self.values[3],
            Column::V4 => &self.values[4],
            Column::V5 => &self.values[5],
        }
    }

    /// Read a row selected as `ptype, v0, .., v5`
    ///
    /// # Errors
    ///
    /// Any column that is NULL or not text.
    pub fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ptype: row.get(0)?,
            values: [
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ],
        })
    }
}

/// Place `fields[i]` in `vi`; missing fields become `""`, extra fields are dropped.
pub fn encode<S: AsRef<str>>(ptype: &str, fields: &[S]) -> PolicyRow {
    let mut row = PolicyRow {
        ptype: ptype.to_string(),
        ..PolicyRow::default()
    };
    for (slot, field) in row.values.iter_mut().zip(fields) {
        *slot = field.as_ref().to_string();
    }
    row
}

/// Render a row as a policy line: `ptype` then every non-empty value.
///
/// Empty values are skipped wherever they sit, so `("p", "a", "", "c")`
/// decodes to `p, a, c` and `c` moves from `v2` to the second field.
pub fn decode(row: &PolicyRow) -> String {
    let mut line = row.ptype.clone();
    for value in row.values.iter().filter(|v| !v.is_empty()) {
        line.push_str(", ");
        line.push_str(value);
    }
    line
}
