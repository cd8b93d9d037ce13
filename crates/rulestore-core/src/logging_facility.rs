//! Structured logging facility for Rulestore
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use rulestore_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Adapter entry points own the start/end boundary events. Lower layers
//! (codec, table manager, query builder) only emit `tracing::debug!`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
