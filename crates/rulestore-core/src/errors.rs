use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (typically the policy
/// engine sitting on top of the adapter) can match on without parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidConfig,
    InvalidPolicyLine,
    UnknownPolicyType,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidPolicyLine => "ERR_INVALID_POLICY_LINE",
            ExErrorKind::UnknownPolicyType => "ERR_UNKNOWN_POLICY_TYPE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context about which table and
/// policy type the failing operation touched.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    ptype: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            ptype: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add policy type context
    pub fn with_ptype(mut self, ptype: impl Into<String>) -> Self {
        self.ptype = Some(ptype.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the policy type context, if any
    pub fn ptype(&self) -> Option<&str> {
        self.ptype.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(ptype) = &self.ptype {
            write!(f, " (ptype: {})", ptype)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Errors raised while interpreting policy rules in memory
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// Policy line has no policy type token
    #[error("Policy line has no policy type: {line:?}")]
    MissingPolicyType { line: String },

    /// Policy type is not defined in the model
    #[error("Policy type {ptype} is not defined in section {sec}")]
    UnknownPolicyType { sec: String, ptype: String },

    /// Rule carries more fields than a row can hold
    #[error("Rule for {ptype} has {count} fields, at most {max} are supported")]
    TooManyFields {
        ptype: String,
        count: usize,
        max: usize,
    },
}

impl From<RuleError> for ExError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::MissingPolicyType { ref line } => {
                ExError::new(ExErrorKind::InvalidPolicyLine)
                    .with_op("load_policy_line")
                    .with_message(format!("Missing policy type in line {:?}", line))
            }
            RuleError::UnknownPolicyType { ref ptype, .. } => {
                ExError::new(ExErrorKind::UnknownPolicyType)
                    .with_ptype(ptype.clone())
                    .with_message(err.to_string())
            }
            RuleError::TooManyFields { ref ptype, .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_ptype(ptype.clone())
                .with_message(err.to_string()),
        }
    }
}
