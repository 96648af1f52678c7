//! In-memory snapshot store.

use dashmap::DashMap;
use xref_core::archive::{SnapshotKey, SnapshotStore, StoreError};
use xref_core::checksum::ArchivedReportSnapshot;
use xref_shared::FiscalYear;

/// Snapshot store backed by a concurrent map.
///
/// Every archived snapshot is kept; lookups return the one with the
/// greatest `created_at`.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: DashMap<(String, FiscalYear), Vec<ArchivedReportSnapshot>>,
}

impl InMemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Archives a snapshot.
    pub fn archive(&self, snapshot: ArchivedReportSnapshot) {
        self.snapshots
            .entry((snapshot.report_type.to_string(), snapshot.fiscal_year))
            .or_default()
            .push(snapshot);
    }

    /// Number of archived snapshots across all reports and years.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.iter().map(|entry| entry.value().len()).sum()
    }

    /// Returns true if nothing is archived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    async fn get_latest(
        &self,
        report_type: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Option<ArchivedReportSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .get(&(report_type.to_string(), fiscal_year))
            .and_then(|entry| entry.value().iter().max_by_key(|s| s.created_at).cloned()))
    }

    async fn list_keys(&self, fiscal_year: Option<FiscalYear>) -> Result<Vec<SnapshotKey>, StoreError> {
        let mut keys: Vec<SnapshotKey> = self
            .snapshots
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .filter(|entry| fiscal_year.is_none_or(|year| entry.key().1 == year))
            .filter_map(|entry| {
                entry.value().first().map(|s| SnapshotKey {
                    report_type: s.report_type.clone(),
                    fiscal_year: s.fiscal_year,
                })
            })
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use xref_core::checksum::SnapshotBuilder;
    use xref_shared::ReportCode;

    fn year(y: i16) -> FiscalYear {
        FiscalYear::new(y).unwrap()
    }

    fn snapshot(report: &str, y: i16, day: u32, balance: i64) -> ArchivedReportSnapshot {
        SnapshotBuilder::new(ReportCode::new(report).unwrap(), year(y))
            .created_at(Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap())
            .build(&json!({ "TotalProfitSharingBalance": balance }))
    }

    #[tokio::test]
    async fn test_latest_wins() {
        let store = InMemorySnapshotStore::new();
        store.archive(snapshot("PAY443", 2024, 5, 1000));
        store.archive(snapshot("PAY443", 2024, 9, 1200));
        store.archive(snapshot("PAY443", 2024, 7, 1100));

        let latest = store.get_latest("PAY443", year(2024)).await.unwrap().unwrap();
        assert_eq!(
            latest.field("TotalProfitSharingBalance").unwrap().value,
            dec!(1200)
        );
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_missing() {
        let store = InMemorySnapshotStore::new();
        store.archive(snapshot("PAY443", 2024, 5, 1000));

        assert!(store.get_latest("PAY443", year(2023)).await.unwrap().is_none());
        assert!(store.get_latest("PAY444", year(2024)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keys() {
        let store = InMemorySnapshotStore::new();
        store.archive(snapshot("QPAY129", 2024, 5, 1));
        store.archive(snapshot("PAY443", 2024, 5, 1));
        store.archive(snapshot("PAY443", 2024, 6, 2));
        store.archive(snapshot("PAY443", 2023, 5, 1));

        let all = store.list_keys(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].report_type.as_str(), "PAY443");
        assert_eq!(all[0].fiscal_year, year(2023));

        let filtered = store.list_keys(Some(year(2024))).await.unwrap();
        assert_eq!(filtered.len(), 2);
    }
}
