//! Rule tuples and the textual policy line format
//!
//! A policy line is the policy type followed by its fields, comma separated:
//! `p, alice, data1, read`. The section a policy type belongs to is its
//! first character (`p2` lives in section `p`).

use crate::errors::RuleError;

/// Number of positional fields a stored rule can carry
pub const MAX_FIELDS: usize = 6;

/// Section holding permission rules
pub const POLICY_SECTION: &str = "p";

/// Section holding role/grouping rules
pub const GROUPING_SECTION: &str = "g";

/// Section a policy type belongs to (its first character)
pub fn section_of(ptype: &str) -> &str {
    ptype
        .char_indices()
        .nth(1)
        .map_or(ptype, |(idx, _)| &ptype[..idx])
}

/// One policy or grouping rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub ptype: String,
    pub fields: Vec<String>,
}

impl Rule {
    pub fn new<S: Into<String>>(ptype: impl Into<String>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            ptype: ptype.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a policy line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments. Tokens are split
    /// on `,` and trimmed; the first token is the policy type.
    ///
    /// # Errors
    ///
    /// `MissingPolicyType` if the first token is empty, `TooManyFields` if
    /// more than [`MAX_FIELDS`] fields follow it.
    pub fn parse_line(line: &str) -> Result<Option<Self>, RuleError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut tokens = line.split(',').map(str::trim);
        let ptype = match tokens.next() {
            Some(ptype) if !ptype.is_empty() => ptype,
            _ => {
                return Err(RuleError::MissingPolicyType {
                    line: line.to_string(),
                })
            }
        };

        let fields: Vec<String> = tokens.map(str::to_string).collect();
        if fields.len() > MAX_FIELDS {
            return Err(RuleError::TooManyFields {
                ptype: ptype.to_string(),
                count: fields.len(),
                max: MAX_FIELDS,
            });
        }

        Ok(Some(Self::new(ptype, fields)))
    }

    /// Section this rule belongs to
    pub fn section(&self) -> &str {
        section_of(&self.ptype)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ptype)?;
        for field in &self.fields {
            write!(f, ", {}", field)?;
        }
        Ok(())
    }
}
