//! Reconciliation error types.

use thiserror::Error;
use xref_shared::{AppError, FiscalYear};

use crate::archive::StoreError;

/// Errors that abort a reconciliation request.
///
/// Failures inside a single rule group never surface here; they become a
/// failing group in the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Caller input was rejected before evaluation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No archived snapshot exists for the report and year.
    #[error("No archived {report_type} snapshot for year {fiscal_year}")]
    SnapshotNotFound {
        /// Requested report type.
        report_type: String,
        /// Requested fiscal year.
        fiscal_year: FiscalYear,
    },

    /// The profit sharing report suffix is not one of `1..=8`.
    #[error("Unknown profit sharing report suffix '{0}'")]
    UnknownReport(String),

    /// The store could not serve the request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "VALIDATION_ERROR",
            Self::SnapshotNotFound { .. } => "SNAPSHOT_NOT_FOUND",
            Self::UnknownReport(_) => "REPORT_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::SnapshotNotFound { .. } | Self::UnknownReport(_) => 404,
            Self::Store(_) => 500,
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::InvalidInput(msg) => Self::Validation(msg),
            ReconcileError::SnapshotNotFound { .. } | ReconcileError::UnknownReport(_) => {
                Self::NotFound(err.to_string())
            }
            ReconcileError::Store(e) => {
                Self::Unexpected(format!("Cross-reference validation failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReconcileError::InvalidInput("x".into()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            ReconcileError::UnknownReport("9".into()).error_code(),
            "REPORT_NOT_FOUND"
        );
        assert_eq!(
            ReconcileError::Store(StoreError::Unavailable("down".into())).error_code(),
            "STORE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ReconcileError::InvalidInput("x".into()).http_status_code(), 400);
        assert_eq!(
            ReconcileError::SnapshotNotFound {
                report_type: "PAY443".into(),
                fiscal_year: FiscalYear::new(2024).unwrap(),
            }
            .http_status_code(),
            404
        );
        assert_eq!(
            ReconcileError::Store(StoreError::Query("x".into())).http_status_code(),
            500
        );
    }

    #[test]
    fn test_into_app_error() {
        let not_found: AppError = ReconcileError::SnapshotNotFound {
            report_type: "PAY443".into(),
            fiscal_year: FiscalYear::new(2024).unwrap(),
        }
        .into();
        assert!(matches!(not_found, AppError::NotFound(ref m) if m.contains("PAY443")));

        let invalid: AppError = ReconcileError::InvalidInput("report type must not be empty".into()).into();
        assert!(matches!(invalid, AppError::Validation(_)));

        let unexpected: AppError = ReconcileError::Store(StoreError::Unavailable("down".into())).into();
        assert!(matches!(unexpected, AppError::Unexpected(ref m) if m.contains("down")));
    }
}
