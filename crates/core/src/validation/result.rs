//! Aggregation of validation groups into a Master Update verdict.

use serde::{Deserialize, Serialize};
use xref_shared::FiscalYear;

use super::types::ValidationGroup;

/// Overall outcome of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At least one `Critical` group failed.
    Block,
    /// Only non-critical groups failed.
    AllowWithWarnings,
    /// Every group passed.
    Allow,
}

impl Decision {
    /// Canonical message for this decision.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Block => "BLOCK Master Update submission. Critical validation failures detected.",
            Self::AllowWithWarnings => {
                "Allow Master Update submission with warnings. Review non-critical issues."
            }
            Self::Allow => "All cross-reference validations passed. Safe to submit Master Update.",
        }
    }
}

/// Aggregate reconciliation verdict for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Fiscal year that was reconciled.
    pub fiscal_year: FiscalYear,
    /// Groups in catalog order.
    pub validation_groups: Vec<ValidationGroup>,
    /// Number of validations across all groups.
    pub total_validations: usize,
    /// Number of passing validations.
    pub passed_validations: usize,
    /// Number of failing validations.
    pub failed_validations: usize,
    /// Names of failing `Critical` groups.
    pub critical_issues: Vec<String>,
    /// Names of failing non-critical groups.
    pub warnings: Vec<String>,
    /// True iff `critical_issues` is non-empty.
    pub block_master_update: bool,
    /// Human-readable verdict.
    pub message: String,
}

impl ReconciliationResult {
    /// Summarizes groups into a result carrying the Master Update message.
    #[must_use]
    pub fn summarize(fiscal_year: FiscalYear, validation_groups: Vec<ValidationGroup>) -> Self {
        let mut critical_issues = Vec::new();
        let mut warnings = Vec::new();
        let mut total_validations = 0;
        let mut failed_validations = 0;

        for group in &validation_groups {
            total_validations += group.validations.len();
            failed_validations += group.failed_count();

            if !group.is_valid {
                if group.priority.is_critical() {
                    critical_issues.push(group.group_name.clone());
                } else {
                    warnings.push(group.group_name.clone());
                }
            }
        }

        let block_master_update = !critical_issues.is_empty();
        let mut result = Self {
            fiscal_year,
            validation_groups,
            total_validations,
            passed_validations: total_validations - failed_validations,
            failed_validations,
            critical_issues,
            warnings,
            block_master_update,
            message: String::new(),
        };
        result.message = result.decision().message().to_string();
        result
    }

    /// Replaces the verdict message, keeping every derived field.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Decision implied by the classified issues.
    #[must_use]
    pub fn decision(&self) -> Decision {
        if self.block_master_update {
            Decision::Block
        } else if !self.warnings.is_empty() {
            Decision::AllowWithWarnings
        } else {
            Decision::Allow
        }
    }

    /// Renders the result as JSON.
    ///
    /// Output is byte-identical for identical inputs: field order is fixed
    /// and groups keep catalog order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Renders the result as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
