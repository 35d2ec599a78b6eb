//! Error types for the ORM system
//!
//! Builder and validation errors are raised before any SQL reaches the
//! database. Driver failures are classified into a [`DataAccessKind`] so
//! callers can tell a lost connection from a constraint violation.

use std::fmt;

use crate::event_error::EventError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Classification of a failure reported by the database driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAccessKind {
    /// The connection could not be opened, was lost, or the pool gave up
    Connection,
    /// Unique, foreign key, not-null or check constraint rejected the write
    ConstraintViolation,
    /// The server refused to parse the statement
    Syntax,
    /// Anything else the driver reported (decode failures, protocol quirks)
    Other,
}

impl fmt::Display for DataAccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAccessKind::Connection => write!(f, "connection"),
            DataAccessKind::ConstraintViolation => write!(f, "constraint violation"),
            DataAccessKind::Syntax => write!(f, "syntax"),
            DataAccessKind::Other => write!(f, "other"),
        }
    }
}

/// Error types for ORM operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Entity or connection configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input rejected before any SQL was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation was called in a state that does not allow it
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The database driver reported a failure
    #[error("Database error ({kind}): {message}")]
    DataAccess {
        kind: DataAccessKind,
        message: String,
    },

    /// Transaction already finished or could not be completed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A lifecycle callback aborted the operation
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Row could not be converted to or from a record
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Build a data access error of the given kind
    pub fn data_access(kind: DataAccessKind, message: impl Into<String>) -> Self {
        ModelError::DataAccess {
            kind,
            message: message.into(),
        }
    }

    /// The driver classification, when this is a data access error
    pub fn data_access_kind(&self) -> Option<DataAccessKind> {
        match self {
            ModelError::DataAccess { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.data_access_kind() == Some(DataAccessKind::ConstraintViolation)
    }
}

// Convert from sqlx errors, keeping the driver's classification
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        let kind = classify_sqlx_error(&err);
        ModelError::data_access(kind, err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

fn classify_sqlx_error(err: &sqlx::Error) -> DataAccessKind {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_) => DataAccessKind::Connection,
        sqlx::Error::Database(db_err) => {
            use sqlx::error::ErrorKind;

            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => return DataAccessKind::ConstraintViolation,
                _ => {}
            }

            // SQLSTATE class 23 is integrity, 42 is syntax/access rule
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            if code.starts_with("23") {
                DataAccessKind::ConstraintViolation
            } else if code.starts_with("42") || db_err.message().contains("syntax error") {
                DataAccessKind::Syntax
            } else {
                DataAccessKind::Other
            }
        }
        _ => DataAccessKind::Other,
    }
}
