//! Core types shared across Rulestore facilities
//!
//! Holds the canonical schema constants used by the error and logging
//! facilities so that every crate emits the same field keys and event names.

pub mod schema;
