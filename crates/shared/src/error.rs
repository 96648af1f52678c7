//! Application-wide error taxonomy.
//!
//! Every failure that reaches a caller of the engine is one of three kinds:
//! nothing archived to compare against, malformed caller input, or an
//! unexpected failure of a collaborator.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Requested archive or report does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller input was rejected before evaluation began.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collaborator failure (store unreachable, snapshot unreadable).
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Unexpected(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unexpected error.
    #[must_use]
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }
}
