//! The reconciliation service.

use std::any::Any;
use std::collections::BTreeSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{join_all, try_join_all};
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use xref_shared::config::ReconciliationConfig;
use xref_shared::{FieldKey, FiscalYear, ReportCode};

use super::error::ReconcileError;
use super::observer::{ReconciliationObserver, TracingObserver};
use crate::archive::{ArchivedValueProvider, SnapshotStore, StoreError, TransferCode, TransferLedger};
use crate::checksum::{ArchivedReportSnapshot, ChecksumReport, SchemaRegistry};
use crate::rules::{
    AllocTransferEvaluator, BalanceEquationEvaluator, BreakoutTotals, CurrentValues,
    FieldValidator, RuleCatalog, RuleGroupSpec, RuleKind, profit_sharing_prefix,
};
use crate::validation::{ReconciliationResult, ValidationGroup};

/// Runs cross-reference reconciliations against an archive and a ledger.
pub struct Reconciler<S, L, O = TracingObserver> {
    store: Arc<S>,
    ledger: Arc<L>,
    observer: O,
    config: ReconciliationConfig,
    catalog: RuleCatalog,
    schemas: SchemaRegistry,
}

impl<S, L> Reconciler<S, L, TracingObserver>
where
    S: SnapshotStore,
    L: TransferLedger,
{
    /// Creates a reconciler with the Master Update catalog that logs
    /// progress through `tracing`.
    #[must_use]
    pub fn new(store: Arc<S>, ledger: Arc<L>, config: ReconciliationConfig) -> Self {
        Self {
            store,
            ledger,
            observer: TracingObserver,
            config,
            catalog: RuleCatalog::master_update(),
            schemas: SchemaRegistry::new(),
        }
    }
}

impl<S, L, O> Reconciler<S, L, O>
where
    S: SnapshotStore,
    L: TransferLedger,
    O: ReconciliationObserver,
{
    /// Replaces the observer.
    #[must_use]
    pub fn with_observer<P: ReconciliationObserver>(self, observer: P) -> Reconciler<S, L, P> {
        Reconciler {
            store: self.store,
            ledger: self.ledger,
            observer,
            config: self.config,
            catalog: self.catalog,
            schemas: self.schemas,
        }
    }

    /// Replaces the catalog used by [`Self::reconcile`].
    #[must_use]
    pub fn with_catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the field schemas snapshots were archived with.
    #[must_use]
    pub fn with_schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// The catalog used by [`Self::reconcile`].
    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.config.lookup_timeout_ms)
    }

    // ========== Master Update ==========

    /// Reconciles current year-end figures against the archive.
    ///
    /// `current_values` are keyed `"ReportCode.FieldName"`. The result holds
    /// one group per catalog entry in catalog order; a group whose
    /// evaluation fails is reported as a failing `Critical` group.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed key and `Store` when the
    /// archive or ledger is unavailable.
    pub async fn reconcile(
        &self,
        fiscal_year: FiscalYear,
        current_values: &CurrentValues,
    ) -> Result<ReconciliationResult, ReconcileError> {
        validate_keys(current_values)?;

        let groups = self
            .run_catalog(&self.catalog, fiscal_year, current_values)
            .await?;
        let result = ReconciliationResult::summarize(fiscal_year, groups);

        self.observer.reconciliation_completed(&result);
        Ok(result)
    }

    async fn run_catalog(
        &self,
        catalog: &RuleCatalog,
        fiscal_year: FiscalYear,
        current_values: &CurrentValues,
    ) -> Result<Vec<ValidationGroup>, ReconcileError> {
        let provider = ArchivedValueProvider::new(Arc::clone(&self.store), self.lookup_timeout());
        let started = Instant::now();

        let groups = if self.config.parallel_groups {
            try_join_all(
                catalog
                    .groups()
                    .iter()
                    .map(|spec| self.run_group(spec, &provider, fiscal_year, current_values)),
            )
            .await?
        } else {
            let mut groups = Vec::with_capacity(catalog.len());
            for spec in catalog.groups() {
                groups.push(
                    self.run_group(spec, &provider, fiscal_year, current_values)
                        .await?,
                );
            }
            groups
        };

        debug!(
            fiscal_year = fiscal_year.value(),
            groups = groups.len(),
            store_reads = provider.store_reads(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Rule catalog evaluated"
        );
        Ok(groups)
    }

    /// Evaluates one group, turning any non-fatal failure into a failing group.
    async fn run_group(
        &self,
        spec: &RuleGroupSpec,
        provider: &ArchivedValueProvider<S>,
        fiscal_year: FiscalYear,
        current_values: &CurrentValues,
    ) -> Result<ValidationGroup, ReconcileError> {
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.evaluate_group(spec, provider, fiscal_year, current_values))
            .catch_unwind()
            .await;

        let group = match outcome {
            Ok(Ok(group)) => group,
            Ok(Err(e)) if e.is_fatal() => return Err(ReconcileError::Store(e)),
            Ok(Err(e)) => self.failed_group(spec, fiscal_year, &e.to_string()),
            Err(panic) => {
                let reason = format!("internal error: {}", panic_message(panic.as_ref()));
                self.failed_group(spec, fiscal_year, &reason)
            }
        };

        self.observer
            .group_completed(fiscal_year, &group, started.elapsed());
        Ok(group)
    }

    fn failed_group(&self, spec: &RuleGroupSpec, fiscal_year: FiscalYear, error: &str) -> ValidationGroup {
        self.observer.group_errored(fiscal_year, &spec.name, error);
        ValidationGroup::failed(
            spec.name.clone(),
            RuleGroupSpec::render(&spec.description, fiscal_year),
            spec.rule.clone(),
            error,
        )
    }

    async fn evaluate_group(
        &self,
        spec: &RuleGroupSpec,
        provider: &ArchivedValueProvider<S>,
        fiscal_year: FiscalYear,
        current_values: &CurrentValues,
    ) -> Result<ValidationGroup, StoreError> {
        match &spec.kind {
            RuleKind::FieldMatch { fields, comparison } => {
                let validator = FieldValidator::new(*comparison, self.config.field_tolerance);
                let validations = join_all(
                    fields
                        .iter()
                        .map(|field| validator.validate(provider, field, current_values, fiscal_year)),
                )
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()?;

                let template = if validations.iter().all(|v| v.is_valid) {
                    &spec.pass_summary
                } else {
                    &spec.fail_summary
                };

                Ok(ValidationGroup::new(
                    spec.name.clone(),
                    RuleGroupSpec::render(&spec.description, fiscal_year),
                    spec.priority,
                    spec.rule.clone(),
                    validations,
                    RuleGroupSpec::render(template, fiscal_year),
                ))
            }
            RuleKind::BalanceEquation => Ok(BalanceEquationEvaluator::new(self.config.balance_tolerance)
                .evaluate(fiscal_year, current_values)),
            RuleKind::AllocTransfers => {
                let (incoming, outgoing) = futures::try_join!(
                    self.postings(fiscal_year, TransferCode::IncomingAllocation),
                    self.postings(fiscal_year, TransferCode::OutgoingAllocation),
                )?;
                Ok(AllocTransferEvaluator::evaluate(fiscal_year, &incoming, &outgoing))
            }
        }
    }

    async fn postings(
        &self,
        fiscal_year: FiscalYear,
        code: TransferCode,
    ) -> Result<Vec<Decimal>, StoreError> {
        with_timeout(
            self.lookup_timeout(),
            format!("{} postings for {fiscal_year}", code.label()),
            self.ledger.postings(fiscal_year, code),
        )
        .await
    }

    async fn summarize_catalog(
        &self,
        catalog: &RuleCatalog,
        fiscal_year: FiscalYear,
        current_values: &CurrentValues,
        message: &str,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let groups = self.run_catalog(catalog, fiscal_year, current_values).await?;
        let result = ReconciliationResult::summarize(fiscal_year, groups).with_message(message);
        self.observer.reconciliation_completed(&result);
        Ok(result)
    }

    // ========== Report Validations ==========

    /// Checks one section of the profit sharing report against the archived
    /// profit sharing summary.
    ///
    /// `suffix` selects the section (`"1"` to `"8"`). `current_values` may
    /// carry the section's figures keyed `PAY426N.<prefix>Members` and so
    /// on; missing figures fail with the archived value attached.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReport` for an unknown suffix.
    pub async fn validate_profit_sharing_report(
        &self,
        fiscal_year: FiscalYear,
        suffix: &str,
        frozen: bool,
        current_values: &CurrentValues,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let prefix = profit_sharing_prefix(suffix)
            .ok_or_else(|| ReconcileError::UnknownReport(suffix.to_string()))?;
        validate_keys(current_values)?;

        self.summarize_catalog(
            &RuleCatalog::profit_sharing(prefix, frozen),
            fiscal_year,
            current_values,
            "Profit sharing report validation completed.",
        )
        .await
    }

    /// Checks QPAY129 distribution and forfeiture totals.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the archive is unavailable.
    pub async fn validate_forfeitures_and_points(
        &self,
        fiscal_year: FiscalYear,
        distribution_total: Decimal,
        forfeit_total: Decimal,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let current_values: CurrentValues = [
            ("QPAY129.QPAY129_DistributionTotals".to_string(), distribution_total),
            ("QPAY129.ForfeitureTotal".to_string(), forfeit_total),
        ]
        .into_iter()
        .collect();

        self.summarize_catalog(
            &RuleCatalog::forfeitures_and_points(),
            fiscal_year,
            &current_values,
            "Forfeitures and Points validation completed.",
        )
        .await
    }

    /// Checks the PAY444 breakout report grand totals.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the archive is unavailable.
    pub async fn validate_breakout_totals(
        &self,
        fiscal_year: FiscalYear,
        totals: &BreakoutTotals,
    ) -> Result<ReconciliationResult, ReconcileError> {
        self.summarize_catalog(
            &RuleCatalog::breakout_totals(),
            fiscal_year,
            &totals.current_values(),
            "Breakout report grand total validations completed.",
        )
        .await
    }

    // ========== Checksums ==========

    /// Checks the latest archived snapshot of a report for drift.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank report type, `SnapshotNotFound`
    /// when nothing is archived, and `Store` when the store fails.
    pub async fn validate_report_checksum(
        &self,
        fiscal_year: FiscalYear,
        report_type: &str,
    ) -> Result<ChecksumReport, ReconcileError> {
        let report_type =
            ReportCode::new(report_type).map_err(|e| ReconcileError::InvalidInput(e.to_string()))?;

        let snapshot = self
            .latest_snapshot(report_type.as_str(), fiscal_year)
            .await?
            .ok_or_else(|| ReconcileError::SnapshotNotFound {
                report_type: report_type.to_string(),
                fiscal_year,
            })?;

        let report = self
            .schemas
            .validator_for(report_type.as_str())
            .check_snapshot(&snapshot);
        if !report.is_valid {
            warn!(
                fiscal_year = fiscal_year.value(),
                report_type = %report_type,
                "Archived snapshot drifted"
            );
        }
        Ok(report)
    }

    /// Checks the latest snapshot of every archived report, optionally for
    /// one year.
    ///
    /// Unreadable records produce invalid entries and the batch continues.
    ///
    /// # Errors
    ///
    /// Returns `Store` only when the store is unavailable.
    pub async fn validate_all_checksums(
        &self,
        fiscal_year: Option<FiscalYear>,
    ) -> Result<Vec<ChecksumReport>, ReconcileError> {
        let keys = with_timeout(
            self.lookup_timeout(),
            "listing archived snapshots".to_string(),
            self.store.list_keys(fiscal_year),
        )
        .await?;

        // One entry per (report, year), in key order.
        let keys: BTreeSet<_> = keys.into_iter().collect();
        let mut entries: Vec<Result<ArchivedReportSnapshot, ChecksumReport>> =
            Vec::with_capacity(keys.len());

        for key in keys {
            match self
                .latest_snapshot(key.report_type.as_str(), key.fiscal_year)
                .await
            {
                Ok(Some(snapshot)) => entries.push(Ok(snapshot)),
                Ok(None) => {}
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(
                        report_type = %key.report_type,
                        fiscal_year = key.fiscal_year.value(),
                        error = %e,
                        "Archived snapshot unreadable"
                    );
                    entries.push(Err(ChecksumReport {
                        fiscal_year: key.fiscal_year,
                        report_type: key.report_type.to_string(),
                        is_valid: false,
                        message: format!("Archived snapshot is unreadable: {e}"),
                        archived_checksum: String::new(),
                        current_checksum: String::new(),
                        archived_at: None,
                    }));
                }
            }
        }

        let schemas = &self.schemas;
        let reports: Vec<ChecksumReport> = entries
            .into_par_iter()
            .map(|entry| match entry {
                Ok(snapshot) => schemas
                    .validator_for(snapshot.report_type.as_str())
                    .check_snapshot(&snapshot),
                Err(report) => report,
            })
            .collect();

        debug!(
            checked = reports.len(),
            drifted = reports.iter().filter(|r| !r.is_valid).count(),
            "Checksum batch validated"
        );
        Ok(reports)
    }

    async fn latest_snapshot(
        &self,
        report_type: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Option<ArchivedReportSnapshot>, StoreError> {
        with_timeout(
            self.lookup_timeout(),
            format!("lookup of {report_type}/{fiscal_year}"),
            self.store.get_latest(report_type, fiscal_year),
        )
        .await
    }
}

/// Rejects current-value keys that are not `"ReportCode.FieldName"`.
fn validate_keys(current_values: &CurrentValues) -> Result<(), ReconcileError> {
    for key in current_values.keys() {
        key.parse::<FieldKey>()
            .map_err(|_| ReconcileError::InvalidInput(format!("'{key}' is not a ReportCode.FieldName key")))?;
    }
    Ok(())
}

async fn with_timeout<T>(
    timeout: Duration,
    what: String,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(timeout, fut).await.unwrap_or_else(|_| {
        Err(StoreError::Unavailable(format!(
            "{what} timed out after {}ms",
            timeout.as_millis()
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic during evaluation".to_string()
    }
}
