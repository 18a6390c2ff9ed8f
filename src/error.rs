//! Error types for the pmtrack library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by storage backends and date handling.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Repeating task '{0}' needs a due date")]
    MissingDueDate(String),

    #[error("Interval of {days} days from {from} is out of range")]
    InvalidInterval { from: chrono::NaiveDate, days: i64 },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the stored text is not JSON at all, as opposed to JSON of
    /// the wrong shape or a read failure
    pub fn is_unparsable(&self) -> bool {
        matches!(self, StoreError::Json(e) if e.is_syntax() || e.is_eof())
    }
}

/// Result type alias using the pmtrack error type.
pub type Result<T> = std::result::Result<T, StoreError>;
