//! Validation and validation group types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Severity of a rule group.
///
/// A failing `Critical` group blocks the Master Update; a failing `High`
/// group only produces a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Blocks the Master Update when failing.
    Critical,
    /// Warns when failing.
    High,
}

impl Priority {
    /// Returns true for [`Priority::Critical`].
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => f.write_str("Critical"),
            Self::High => f.write_str("High"),
        }
    }
}

/// Result of a single field or rule check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    /// Field or computed check name.
    pub field_name: String,
    /// Report the value belongs to.
    pub report_code: String,
    /// Value supplied by the caller, if any.
    pub current_value: Option<Decimal>,
    /// Archived or computed expected value, if any.
    pub expected_value: Option<Decimal>,
    /// `current - expected` when both are known.
    pub variance: Option<Decimal>,
    /// Whether the check passed.
    pub is_valid: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Optional extra context.
    pub notes: Option<String>,
    /// Creation time of the snapshot the expected value came from.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Validation {
    /// Creates an always-valid component entry that only reports a value.
    #[must_use]
    pub fn informational(
        field_name: impl Into<String>,
        report_code: impl Into<String>,
        value: Decimal,
        message: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            report_code: report_code.into(),
            current_value: Some(value),
            expected_value: None,
            variance: None,
            is_valid: true,
            message: message.into(),
            notes: Some(notes.into()),
            archived_at: None,
        }
    }

    /// Creates an invalid entry describing an error that stopped the check.
    #[must_use]
    pub fn error(
        field_name: impl Into<String>,
        report_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            report_code: report_code.into(),
            current_value: None,
            expected_value: None,
            variance: None,
            is_valid: false,
            message: message.into(),
            notes: None,
            archived_at: None,
        }
    }
}

/// A named set of validations evaluated together.
///
/// `is_valid` is always the conjunction of the member validations; build
/// groups through [`ValidationGroup::new`] or [`ValidationGroup::failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationGroup {
    /// Group name, e.g. `Total Distributions`.
    pub group_name: String,
    /// What the group checks.
    pub description: String,
    /// True iff every validation in the group passed.
    pub is_valid: bool,
    /// Member validations in evaluation order.
    pub validations: Vec<Validation>,
    /// Human-readable summary.
    pub summary: String,
    /// Group severity.
    pub priority: Priority,
    /// The rule text checked by the group.
    pub validation_rule: String,
}

impl ValidationGroup {
    /// Builds a group, deriving `is_valid` from its validations.
    #[must_use]
    pub fn new(
        group_name: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        validation_rule: impl Into<String>,
        validations: Vec<Validation>,
        summary: impl Into<String>,
    ) -> Self {
        let is_valid = validations.iter().all(|v| v.is_valid);
        Self {
            group_name: group_name.into(),
            description: description.into(),
            is_valid,
            validations,
            summary: summary.into(),
            priority,
            validation_rule: validation_rule.into(),
        }
    }

    /// Builds the stand-in for a group whose evaluation raised an error.
    ///
    /// The group is always invalid and `Critical` so that an evaluation
    /// failure can never let a Master Update through.
    #[must_use]
    pub fn failed(
        group_name: impl Into<String>,
        description: impl Into<String>,
        validation_rule: impl Into<String>,
        error: &str,
    ) -> Self {
        let group_name = group_name.into();
        let validation = Validation::error(
            group_name.clone(),
            "ERROR",
            format!("Evaluation failed: {error}"),
        );
        Self::new(
            group_name,
            description,
            Priority::Critical,
            validation_rule,
            vec![validation],
            format!("Service error: {error}"),
        )
    }

    /// Number of failing validations.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.validations.iter().filter(|v| !v.is_valid).count()
    }
}
