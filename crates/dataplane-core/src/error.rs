//! Error types for the dataplane service.
//!
//! `DataplaneError` is the single error type shared by the client contract,
//! the in-process transport and the reference server. The cloning client never
//! constructs one of these itself; it only hands back what the delegate returned.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dataplane calls.
#[derive(Debug, Error)]
pub enum DataplaneError {
    // Call lifecycle errors
    #[error("Call cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    // Request errors
    #[error("Invalid argument {field}: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Failed precondition: {message}")]
    FailedPrecondition { message: String },

    // Loading catalog snapshots and config files
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for dataplane operations.
pub type Result<T> = std::result::Result<T, DataplaneError>;

impl From<std::io::Error> for DataplaneError {
    fn from(err: std::io::Error) -> Self {
        DataplaneError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for DataplaneError {
    fn from(err: serde_json::Error) -> Self {
        DataplaneError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl DataplaneError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        DataplaneError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Shorthand for an `InvalidArgument` error.
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        DataplaneError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Map to the equivalent gRPC status code.
    ///
    /// - 1: Cancelled
    /// - 3: InvalidArgument
    /// - 4: DeadlineExceeded
    /// - 5: NotFound
    /// - 9: FailedPrecondition
    /// - 13: Internal (local IO and decoding failures)
    pub fn status_code(&self) -> u32 {
        match self {
            DataplaneError::Cancelled => 1,
            DataplaneError::InvalidArgument { .. } => 3,
            DataplaneError::DeadlineExceeded => 4,
            DataplaneError::NotFound { .. } => 5,
            DataplaneError::FailedPrecondition { .. } => 9,
            DataplaneError::Io { .. } | DataplaneError::Json { .. } => 13,
        }
    }

    /// Check if a caller may reasonably retry the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataplaneError::DeadlineExceeded)
    }
}
