//! Typed predicate builder
//!
//! Predicates are equality constraints over rule columns. A [`Conjunction`]
//! ANDs constraints, a [`Disjunction`] ORs conjunctions. Rendering produces
//! SQL with numbered placeholders and a matching parameter list; values never
//! enter the SQL text. The table name does, and must already be validated.

use rulestore_core::MAX_FIELDS;

use crate::codec::{Column, PolicyRow};

/// Largest row count sent in one `INSERT`. Seven bound values per row keeps
/// a full batch under SQLite's default limit of 32766 parameters.
pub const MAX_ROWS_PER_INSERT: usize = 4096;

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

impl Statement {
    /// Parameters in the form rusqlite binds them
    pub fn bind(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, String>> {
        rusqlite::params_from_iter(self.params.iter())
    }
}

/// `column = value AND ...`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conjunction {
    terms: Vec<(Column, String)>,
}

impl Conjunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: Column, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: Column, value: impl Into<String>) {
        self.terms.push((column, value.into()));
    }

    pub fn terms(&self) -> &[(Column, String)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `ptype` plus every non-empty value column; empty values match anything.
    pub fn non_empty(row: &PolicyRow) -> Self {
        let mut filter = Self::new().eq(Column::PType, row.ptype.as_str());
        for column in Column::VALUES {
            let value = row.get(column);
            if !value.is_empty() {
                filter.push(column, value);
            }
        }
        filter
    }

    /// Every column, empty values included
    pub fn exact(row: &PolicyRow) -> Self {
        let mut filter = Self::new();
        for column in Column::ALL {
            filter.push(column, row.get(column));
        }
        filter
    }

    /// `ptype` plus one constraint per supplied field, whatever its value.
    /// Columns past the end of `fields` are left unconstrained.
    pub fn prefix<S: AsRef<str>>(ptype: &str, fields: &[S]) -> Self {
        let mut filter = Self::new().eq(Column::PType, ptype);
        for (column, value) in Column::VALUES.into_iter().zip(fields) {
            filter.push(column, value.as_ref());
        }
        filter
    }

    fn render(&self, params: &mut Vec<String>) -> String {
        if self.terms.is_empty() {
            return "1 = 1".to_string();
        }
        let clauses: Vec<String> = self
            .terms
            .iter()
            .map(|(column, value)| {
                params.push(value.clone());
                format!("{} = ?{}", column.name(), params.len())
            })
            .collect();
        format!("({})", clauses.join(" AND "))
    }
}

/// `(conjunction) OR (conjunction) ...`; an empty disjunction matches nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Disjunction {
    branches: Vec<Conjunction>,
}

impl Disjunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn or(mut self, branch: Conjunction) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    fn render(&self, params: &mut Vec<String>) -> String {
        if self.branches.is_empty() {
            return "1 = 0".to_string();
        }
        self.branches
            .iter()
            .map(|branch| branch.render(params))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

impl From<Conjunction> for Disjunction {
    fn from(branch: Conjunction) -> Self {
        Self::new().or(branch)
    }
}

impl FromIterator<Conjunction> for Disjunction {
    fn from_iter<I: IntoIterator<Item = Conjunction>>(iter: I) -> Self {
        Self {
            branches: iter.into_iter().collect(),
        }
    }
}

fn column_list() -> String {
    Column::ALL
        .iter()
        .map(Column::name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select_all(table: &str) -> String {
    format!(r#"SELECT {} FROM "{}""#, column_list(), table)
}

/// Multi-row `INSERT` for `rows`; callers keep batches within
/// [`MAX_ROWS_PER_INSERT`] and never pass an empty slice.
pub fn insert(table: &str, rows: &[PolicyRow]) -> Statement {
    let mut params = Vec::with_capacity(rows.len() * (MAX_FIELDS + 1));
    let tuples: Vec<String> = rows
        .iter()
        .map(|row| {
            let placeholders: Vec<String> = Column::ALL
                .iter()
                .map(|column| {
                    params.push(row.get(*column).to_string());
                    format!("?{}", params.len())
                })
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    Statement {
        sql: format!(
            r#"INSERT INTO "{}" ({}) VALUES {}"#,
            table,
            column_list(),
            tuples.join(", ")
        ),
        params,
    }
}

pub fn delete(table: &str, filter: &Disjunction) -> Statement {
    let mut params = Vec::new();
    let predicate = filter.render(&mut params);
    Statement {
        sql: format!(r#"DELETE FROM "{}" WHERE {}"#, table, predicate),
        params,
    }
}

/// Set every column of the matching rows to `row`
pub fn update(table: &str, row: &PolicyRow, filter: &Conjunction) -> Statement {
    let mut params = Vec::with_capacity(2 * (MAX_FIELDS + 1));
    let assignments: Vec<String> = Column::ALL
        .iter()
        .map(|column| {
            params.push(row.get(*column).to_string());
            format!("{} = ?{}", column.name(), params.len())
        })
        .collect();
    let predicate = filter.render(&mut params);

    Statement {
        sql: format!(
            r#"UPDATE "{}" SET {} WHERE {}"#,
            table,
            assignments.join(", "),
            predicate
        ),
        params,
    }
}
