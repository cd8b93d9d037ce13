//! Rulestore Core - policy rule model and shared facilities
//!
//! This crate provides:
//! - The `Adapter`, `PolicySink` and `PolicySource` seams between a storage
//!   adapter and the policy engine
//! - `Rule` tuples, the policy line format and a minimal in-memory `PolicyModel`
//! - The structured error facility (`ExError`, `ExErrorKind`)
//! - The logging facility (`init`, boundary macros, test capture)

pub mod adapter;
pub mod errors;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use adapter::{Adapter, PolicySink, PolicySource};
pub use errors::{ExError, ExErrorKind, Result, RuleError};
pub use model::{PolicyModel, Rule, MAX_FIELDS};
