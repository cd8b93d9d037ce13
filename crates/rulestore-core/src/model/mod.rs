//! In-memory policy rule model
//!
//! - `Rule`: one tagged rule tuple and the policy line grammar
//! - `PolicyModel`: section → policy type → ordered rules

pub mod policy_model;
pub mod rule;

pub use policy_model::PolicyModel;
pub use rule::{section_of, Rule, GROUPING_SECTION, MAX_FIELDS, POLICY_SECTION};
