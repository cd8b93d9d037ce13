//! Boundary logging macros
//!
//! Every adapter operation is bracketed by a `start` event and either an
//! `end` or an `end_error` event, all at the operation's `op` name. Storage
//! context (`table`, `sec`, `ptype`, `rule_count`) rides along as extra
//! fields; error events take `table` and `ptype` from the error itself.
//!
//! Callers need `rulestore-core-types` in scope as a dependency, the macros
//! reference its event name constants by path.

/// Shared expansion of the boundary macros. Not part of the public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_boundary {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)+)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)+)?
        )
    };
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use rulestore_core::log_op_start;
/// log_op_start!("load_policy");
/// log_op_start!("add_policies", table = "casbin_policy", sec = "p", ptype = "p", rule_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::__log_boundary!(
            info,
            $op,
            rulestore_core_types::schema::EVENT_START
            $(, $($field)+)?
        )
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use rulestore_core::log_op_end;
/// log_op_end!("remove_policy", duration_ms = 3);
/// log_op_end!("remove_policy", duration_ms = 3, table = "casbin_policy", rows_affected = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        $crate::__log_boundary!(
            info,
            $op,
            rulestore_core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)+)?
        )
    };
}

/// Log an operation error
///
/// Accepts anything convertible into `ExError`. The error's code, kind,
/// message, table and policy type become event fields; a missing table or
/// policy type is logged as an empty string.
///
/// # Example
///
/// ```
/// # use rulestore_core::log_op_error;
/// # use rulestore_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Persistence)
///     .with_table("casbin_policy")
///     .with_message("disk full");
/// log_op_error!("save_policy", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_boundary!(
            error,
            $op,
            rulestore_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            table = ex_err.table().unwrap_or_default(),
            ptype = ex_err.ptype().unwrap_or_default(),
            message = ex_err.message()
            $(, $($field)+)?
        )
    }};
}
