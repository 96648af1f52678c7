//! Archived value lookups for one reconciliation run.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::debug;
use xref_shared::FiscalYear;

use super::ports::{SnapshotStore, StoreError};
use crate::checksum::{ArchivedReportSnapshot, FieldHash};

/// Upper bound on distinct snapshots a single run can hold.
const REQUEST_CACHE_CAPACITY: u64 = 256;

/// Archived value of one field, as found in the latest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivedLookup {
    /// Creation time of the snapshot; `None` if no snapshot exists.
    pub archived_at: Option<DateTime<Utc>>,
    /// The archived field; `None` if the snapshot or field is missing.
    pub field: Option<FieldHash>,
}

impl ArchivedLookup {
    /// Returns true if a snapshot exists for the report and year.
    #[must_use]
    pub fn snapshot_found(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Archived value of the field, if present.
    #[must_use]
    pub fn expected_value(&self) -> Option<Decimal> {
        self.field.as_ref().map(|f| f.value)
    }
}

/// Looks up archived values, reading each snapshot at most once.
///
/// Create one provider per reconciliation run. Groups evaluated
/// concurrently share it; simultaneous requests for the same snapshot wait
/// on a single store read. Failed reads are not cached.
pub struct ArchivedValueProvider<S> {
    store: Arc<S>,
    cache: Cache<(String, FiscalYear), Option<Arc<ArchivedReportSnapshot>>>,
    timeout: Duration,
    store_reads: AtomicUsize,
}

impl<S: SnapshotStore> ArchivedValueProvider<S> {
    /// Creates a provider whose store reads time out after `timeout`.
    #[must_use]
    pub fn new(store: Arc<S>, timeout: Duration) -> Self {
        Self {
            store,
            cache: Cache::builder().max_capacity(REQUEST_CACHE_CAPACITY).build(),
            timeout,
            store_reads: AtomicUsize::new(0),
        }
    }

    /// Latest snapshot for a report type and year.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or `Unavailable` if the read timed out.
    pub async fn latest_snapshot(
        &self,
        report_type: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Option<Arc<ArchivedReportSnapshot>>, StoreError> {
        self.cache
            .try_get_with(
                (report_type.to_string(), fiscal_year),
                self.read(report_type, fiscal_year),
            )
            .await
            .map_err(|e| (*e).clone())
    }

    async fn read(
        &self,
        report_type: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Option<Arc<ArchivedReportSnapshot>>, StoreError> {
        self.store_reads.fetch_add(1, Ordering::Relaxed);
        debug!(report_type, fiscal_year = fiscal_year.value(), "Reading archived snapshot");

        match tokio::time::timeout(self.timeout, self.store.get_latest(report_type, fiscal_year))
            .await
        {
            Ok(result) => result.map(|snapshot| snapshot.map(Arc::new)),
            Err(_) => Err(StoreError::Unavailable(format!(
                "lookup of {report_type}/{fiscal_year} timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Archived value of `report_type.field_name` for a year.
    ///
    /// # Errors
    ///
    /// Same as [`Self::latest_snapshot`].
    pub async fn lookup(
        &self,
        report_type: &str,
        field_name: &str,
        fiscal_year: FiscalYear,
    ) -> Result<ArchivedLookup, StoreError> {
        let lookup = match self.latest_snapshot(report_type, fiscal_year).await? {
            Some(snapshot) => ArchivedLookup {
                archived_at: Some(snapshot.created_at),
                field: snapshot.field(field_name).cloned(),
            },
            None => ArchivedLookup::default(),
        };
        Ok(lookup)
    }

    /// Number of reads that reached the store.
    #[must_use]
    pub fn store_reads(&self) -> usize {
        self.store_reads.load(Ordering::Relaxed)
    }
}
