//! Report codes and `"ReportCode.FieldName"` keys.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Code identifying a report type in the archive (e.g. `PAY443`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportCode(String);

impl ReportCode {
    /// Creates a report code.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the code is blank or contains `.`.
    pub fn new(code: impl Into<String>) -> Result<Self, AppError> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("report type must not be empty"));
        }
        if trimmed.contains('.') {
            return Err(AppError::validation(format!(
                "report type '{trimmed}' must not contain '.'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReportCode {
    type Error = AppError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<ReportCode> for String {
    fn from(code: ReportCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ReportCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `"ReportCode.FieldName"` key into the caller's current values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    /// Report the field belongs to.
    pub report: ReportCode,
    /// Field name within the report's archived key fields.
    pub field: String,
}

impl FieldKey {
    /// Creates a key from its parts.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either part is blank.
    pub fn new(report: impl Into<String>, field: impl Into<String>) -> Result<Self, AppError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(AppError::validation("field name must not be empty"));
        }
        Ok(Self {
            report: ReportCode::new(report)?,
            field,
        })
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.report, self.field)
    }
}

impl std::str::FromStr for FieldKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (report, field) = s
            .split_once('.')
            .ok_or_else(|| AppError::validation(format!("'{s}' is not a ReportCode.FieldName key")))?;
        Self::new(report, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_report_code_trims() {
        assert_eq!(ReportCode::new("  PAY443 ").unwrap().as_str(), "PAY443");
    }

    #[test]
    fn test_report_code_rejects_blank() {
        assert!(matches!(ReportCode::new(""), Err(AppError::Validation(_))));
        assert!(matches!(ReportCode::new("   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_report_code_rejects_dot() {
        assert!(ReportCode::new("PAY.443").is_err());
    }

    #[test]
    fn test_field_key_display_and_parse() {
        let key = FieldKey::new("QPAY129", "QPAY129_DistributionTotals").unwrap();
        assert_eq!(key.to_string(), "QPAY129.QPAY129_DistributionTotals");
        assert_eq!(FieldKey::from_str(&key.to_string()).unwrap(), key);
    }

    #[test]
    fn test_field_key_splits_on_first_dot() {
        let key = FieldKey::from_str("PAY444.Level1.Amount").unwrap();
        assert_eq!(key.report.as_str(), "PAY444");
        assert_eq!(key.field, "Level1.Amount");
    }

    #[test]
    fn test_field_key_rejects_missing_dot() {
        assert!(FieldKey::from_str("PAY444").is_err());
        assert!(FieldKey::from_str("PAY444.").is_err());
    }
}
