//! Error handling for rulestore-store
//!
//! Wraps rulestore-core ExError with store-specific helpers

use rulestore_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
///
/// The backend message is kept verbatim; callers add op/table context.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a configuration error
pub fn invalid_config(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("configure")
        .with_message(reason)
}

/// Create an invalid table name error
pub fn invalid_table_name(table: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("validate_table_name")
        .with_table(table)
        .with_message(format!("Invalid table name {:?}: {}", table, reason))
}

/// Create a settings parse error
pub fn settings_parse(err: toml::de::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("parse_settings")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
