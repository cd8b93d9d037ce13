//! Rulestore Store - SQLite persistence for policy rules
//!
//! Provides:
//! - The rule codec between variable-length rules and fixed `(ptype, v0..v5)` rows
//! - Table lifecycle for the shared rule schema
//! - A typed predicate builder so rule values only ever travel as bound parameters
//! - `SqliteAdapter`, implementing the engine-facing `Adapter` contract
//!
//! ```no_run
//! use rulestore_core::{Adapter, PolicyModel};
//! use rulestore_store::SqliteAdapter;
//!
//! # fn main() -> rulestore_store::Result<()> {
//! let mut adapter = SqliteAdapter::open("policy.db")?;
//! adapter.add_policy("p", "p", &["alice".into(), "data1".into(), "read".into()])?;
//!
//! let mut model = PolicyModel::with_defaults();
//! adapter.load_policy(&mut model)?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod codec;
pub mod config;
pub mod db;
pub mod errors;
pub mod query;
pub mod table;

// Re-export key types
pub use adapter::SqliteAdapter;
pub use codec::{decode, encode, Column, PolicyRow};
pub use config::{AdapterConfig, AdapterSettings, Database, DEFAULT_TABLE_NAME};
pub use errors::Result;
