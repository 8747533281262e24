//! Error types for daylog core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these to
//! user-facing messages. Backend failures never escape the storage
//! abstraction (they are converted into the downgrade decision at the
//! operation boundary), so the variants here cover what callers can
//! actually observe.

use thiserror::Error;

/// Result type alias for daylog operations.
pub type Result<T> = std::result::Result<T, DaylogError>;

/// Core error type for daylog operations.
#[derive(Debug, Error)]
pub enum DaylogError {
    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Unparseable import file (whole-file abort, nothing written)
    #[error("Import error: {0}")]
    Import(String),

    /// Invalid date key or date arithmetic input
    #[error("Invalid date: {0}")]
    Date(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for DaylogError {
    fn from(err: std::io::Error) -> Self {
        DaylogError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DaylogError {
    fn from(err: serde_json::Error) -> Self {
        DaylogError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for DaylogError {
    fn from(err: rusqlite::Error) -> Self {
        DaylogError::Storage(err.to_string())
    }
}
