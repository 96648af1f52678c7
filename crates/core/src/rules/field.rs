//! Single-field comparison against the archive.

use rust_decimal::Decimal;
use xref_shared::FiscalYear;

use super::CurrentValues;
use crate::archive::{ArchivedLookup, ArchivedValueProvider, SnapshotStore, StoreError};
use crate::validation::{Comparison, Validation, format_currency};

/// A `report.field` reference into the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Report type holding the field.
    pub report_code: String,
    /// Archived key field name.
    pub field_name: String,
}

impl FieldRef {
    /// Creates a field reference.
    #[must_use]
    pub fn new(report_code: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            report_code: report_code.into(),
            field_name: field_name.into(),
        }
    }

    /// The `"ReportCode.FieldName"` key used in current values.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.report_code, self.field_name)
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.report_code, self.field_name)
    }
}

/// Compares one current value to its archived value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldValidator {
    comparison: Comparison,
    tolerance: Decimal,
}

impl FieldValidator {
    /// Creates a validator with a comparison policy.
    ///
    /// `tolerance` only applies to [`Comparison::Tolerant`].
    #[must_use]
    pub fn new(comparison: Comparison, tolerance: Decimal) -> Self {
        Self {
            comparison,
            tolerance,
        }
    }

    /// Looks up the archived value and evaluates the field.
    ///
    /// # Errors
    ///
    /// Returns the store error if the lookup failed.
    pub async fn validate<S: SnapshotStore>(
        &self,
        provider: &ArchivedValueProvider<S>,
        field: &FieldRef,
        current_values: &CurrentValues,
        fiscal_year: FiscalYear,
    ) -> Result<Validation, StoreError> {
        let lookup = provider
            .lookup(&field.report_code, &field.field_name, fiscal_year)
            .await?;
        let current = current_values.get(&field.key()).copied();
        Ok(self.evaluate(field, current, &lookup, fiscal_year))
    }

    /// Evaluates a field given its current value and archived lookup.
    #[must_use]
    pub fn evaluate(
        &self,
        field: &FieldRef,
        current: Option<Decimal>,
        lookup: &ArchivedLookup,
        fiscal_year: FiscalYear,
    ) -> Validation {
        let expected = lookup.expected_value();
        let mut validation = Validation {
            field_name: field.field_name.clone(),
            report_code: field.report_code.clone(),
            current_value: current,
            expected_value: expected,
            variance: None,
            is_valid: false,
            message: String::new(),
            notes: None,
            archived_at: lookup.archived_at,
        };

        let Some(current) = current else {
            validation.message = format!("Current value not provided for {field}");
            validation.notes = Some(match expected {
                Some(value) => format!("Archived value available: {}", format_currency(value)),
                None => "No archived value found".to_string(),
            });
            return validation;
        };

        let Some(archived) = lookup.field.as_ref() else {
            validation.message = format!("No archived value found for {field} for year {fiscal_year}");
            validation.notes = Some(if lookup.snapshot_found() {
                format!("Archived {} snapshot has no {} field", field.report_code, field.field_name)
            } else {
                format!("No archived {} snapshot for year {fiscal_year}", field.report_code)
            });
            return validation;
        };

        let Some(variance) = current.checked_sub(archived.value) else {
            validation.message = format!("{field} comparison failed: arithmetic overflow");
            validation.notes = Some(format!(
                "Current {} and archived {} cannot be compared",
                format_currency(current),
                format_currency(archived.value)
            ));
            return validation;
        };
        validation.variance = Some(variance);

        if !archived.is_intact() {
            validation.message = format!("{field} archived value failed digest verification");
            validation.notes =
                Some("Archived digest does not match archived value; the snapshot has drifted".to_string());
            return validation;
        }

        validation.is_valid = self
            .comparison
            .values_match(current, archived.value, self.tolerance);
        validation.message = if validation.is_valid {
            format!("{field} matches archived value")
        } else {
            format!("{field} does NOT match archived value")
        };
        validation
    }
}
