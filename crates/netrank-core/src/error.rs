//! Error codes and the library error type shared by all netrank crates.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    MissingInput,
    InvalidInput,
    UnknownOperation,
    UnknownNode,
    InvalidPartition,
    InvalidWeight,
    NotConverged,
    ProcessingFailed,
    ParseFailed,
    IoFailed,
    DatabaseFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::MissingInput => "E2001",
            Self::InvalidInput => "E2002",
            Self::UnknownOperation => "E2003",
            Self::UnknownNode => "E2004",
            Self::InvalidPartition => "E3001",
            Self::InvalidWeight => "E3002",
            Self::NotConverged => "E3003",
            Self::ProcessingFailed => "E3004",
            Self::ParseFailed => "E4001",
            Self::IoFailed => "E5001",
            Self::DatabaseFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::MissingInput => "Required input missing",
            Self::InvalidInput => "Invalid input value",
            Self::UnknownOperation => "Unknown operation",
            Self::UnknownNode => "Unknown node",
            Self::InvalidPartition => "Invalid community count",
            Self::InvalidWeight => "Invalid edge weight",
            Self::NotConverged => "Algorithm did not converge",
            Self::ProcessingFailed => "Processing failed",
            Self::ParseFailed => "Input file parse error",
            Self::IoFailed => "I/O failure",
            Self::DatabaseFailed => "SQLite read failure",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .netrank/config.toml and retry."),
            Self::MissingInput | Self::InvalidInput => {
                Some("Run `nr describe <operation>` to see the expected inputs.")
            }
            Self::UnknownOperation => Some("Run `nr ops` to list the available operations."),
            Self::UnknownNode => None,
            Self::InvalidPartition => {
                Some("Request at most as many communities as the network has nodes.")
            }
            Self::InvalidWeight => Some("Cost weights must be non-zero to be inverted."),
            Self::NotConverged => Some("Increase the iteration limit and retry."),
            Self::ProcessingFailed => None,
            Self::ParseFailed => Some("Check the file format and the reported line."),
            Self::IoFailed => Some("Check that the path exists and is readable."),
            Self::DatabaseFailed => {
                Some("The database needs `nodes(id, ...)` and `edges(source, target, ...)` tables.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors produced by the netrank library crates.
#[derive(Debug, Error)]
pub enum NetrankError {
    #[error("failed to parse config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("missing required input '{field}'")]
    MissingInput { field: String },

    #[error("input '{field}' has type {actual}, expected {expected}")]
    InputType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("invalid community request: {0}")]
    InvalidPartition(String),

    #[error("invalid weight {weight} on edge {from} -> {to}: {reason}")]
    InvalidWeight {
        from: String,
        to: String,
        weight: f64,
        reason: &'static str,
    },

    #[error("{algorithm} did not converge within {iterations} iterations")]
    NotConverged {
        algorithm: &'static str,
        iterations: usize,
    },

    #[error("{0}")]
    Processing(String),

    #[error("{format} parse error at line {line}: {reason}")]
    Parse {
        format: &'static str,
        line: usize,
        reason: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl NetrankError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Config { .. } => ErrorCode::ConfigParseError,
            Self::MissingInput { .. } => ErrorCode::MissingInput,
            Self::InputType { .. } | Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::UnknownOperation(_) => ErrorCode::UnknownOperation,
            Self::UnknownNode(_) => ErrorCode::UnknownNode,
            Self::InvalidPartition(_) => ErrorCode::InvalidPartition,
            Self::InvalidWeight { .. } => ErrorCode::InvalidWeight,
            Self::NotConverged { .. } => ErrorCode::NotConverged,
            Self::Processing(_) => ErrorCode::ProcessingFailed,
            Self::Parse { .. } | Self::Json(_) | Self::Csv(_) => ErrorCode::ParseFailed,
            Self::Io { .. } => ErrorCode::IoFailed,
            Self::Sqlite(_) => ErrorCode::DatabaseFailed,
            Self::Internal(_) => ErrorCode::InternalUnexpected,
        }
    }

    /// Remediation hint for this error, if one exists.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// Shorthand for [`NetrankError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the library crates.
pub type Result<T, E = NetrankError> = std::result::Result<T, E>;
