//! Reconciliation observers.
//!
//! Hosts receive per-group outcomes and timings through this port instead
//! of the engine emitting telemetry on its own.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use xref_shared::FiscalYear;

use crate::validation::{ReconciliationResult, ValidationGroup};

/// Receives reconciliation progress.
pub trait ReconciliationObserver: Send + Sync {
    /// A group finished evaluating (including failed stand-in groups).
    fn group_completed(&self, fiscal_year: FiscalYear, group: &ValidationGroup, elapsed: Duration);

    /// A group's evaluation raised an error and was replaced by a failing group.
    fn group_errored(&self, fiscal_year: FiscalYear, group_name: &str, error: &str) {
        let _ = (fiscal_year, group_name, error);
    }

    /// A reconciliation request produced its result.
    fn reconciliation_completed(&self, result: &ReconciliationResult);
}

impl<T: ReconciliationObserver + ?Sized> ReconciliationObserver for Arc<T> {
    fn group_completed(&self, fiscal_year: FiscalYear, group: &ValidationGroup, elapsed: Duration) {
        (**self).group_completed(fiscal_year, group, elapsed);
    }

    fn group_errored(&self, fiscal_year: FiscalYear, group_name: &str, error: &str) {
        (**self).group_errored(fiscal_year, group_name, error);
    }

    fn reconciliation_completed(&self, result: &ReconciliationResult) {
        (**self).reconciliation_completed(result);
    }
}

/// Logs progress with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconciliationObserver for TracingObserver {
    fn group_completed(&self, fiscal_year: FiscalYear, group: &ValidationGroup, elapsed: Duration) {
        info!(
            fiscal_year = fiscal_year.value(),
            group = %group.group_name,
            priority = %group.priority,
            is_valid = group.is_valid,
            failed = group.failed_count(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Validation group evaluated"
        );
    }

    fn group_errored(&self, fiscal_year: FiscalYear, group_name: &str, error: &str) {
        warn!(
            fiscal_year = fiscal_year.value(),
            group = group_name,
            error,
            "Validation group failed to evaluate"
        );
    }

    fn reconciliation_completed(&self, result: &ReconciliationResult) {
        if result.block_master_update {
            warn!(
                fiscal_year = result.fiscal_year.value(),
                critical_issues = ?result.critical_issues,
                failed = result.failed_validations,
                "Master Update blocked by critical validation failures"
            );
        } else {
            info!(
                fiscal_year = result.fiscal_year.value(),
                total = result.total_validations,
                passed = result.passed_validations,
                warnings = ?result.warnings,
                "Cross-reference validation completed"
            );
        }
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ReconciliationObserver for NoopObserver {
    fn group_completed(&self, _: FiscalYear, _: &ValidationGroup, _: Duration) {}

    fn reconciliation_completed(&self, _: &ReconciliationResult) {}
}
