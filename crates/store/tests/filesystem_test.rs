//! Filesystem archive tests against a scratch directory.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;
use xref_core::archive::{SnapshotStore, StoreError};
use xref_core::checksum::{ArchivedReportSnapshot, SnapshotBuilder};
use xref_core::{ReconcileError, Reconciler};
use xref_shared::config::ReconciliationConfig;
use xref_shared::{FiscalYear, ReportCode};
use xref_store::{FsSnapshotStore, InMemorySnapshotStore, InMemoryTransferLedger};

/// Scratch archive root removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("xref-store-{}", Uuid::new_v4())))
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn year() -> FiscalYear {
    FiscalYear::new(2024).unwrap()
}

fn snapshot(report: &str, y: i16, hour: u32, balance: i64) -> ArchivedReportSnapshot {
    SnapshotBuilder::new(ReportCode::new(report).unwrap(), FiscalYear::new(y).unwrap())
        .created_at(Utc.with_ymd_and_hms(2025, 1, 10, hour, 0, 0).unwrap())
        .build(&json!({ "TotalProfitSharingBalance": balance, "TotalEarnings": 30 }))
}

#[tokio::test]
async fn test_archive_then_read_back() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);
    let archived = snapshot("PAY443", 2024, 9, 1000);

    let path = store.archive(&archived).await.unwrap();
    assert!(path.starts_with(scratch.0.join("PAY443").join("2024")));

    let read = store.get_latest("PAY443", year()).await.unwrap().unwrap();
    assert_eq!(read, archived);
    assert_eq!(read.field("TotalProfitSharingBalance").unwrap().value, dec!(1000));
}

#[tokio::test]
async fn test_latest_document_wins() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);
    store.archive(&snapshot("PAY443", 2024, 15, 1200)).await.unwrap();
    store.archive(&snapshot("PAY443", 2024, 9, 1000)).await.unwrap();

    let read = store.get_latest("PAY443", year()).await.unwrap().unwrap();
    assert_eq!(read.field("TotalProfitSharingBalance").unwrap().value, dec!(1200));
}

#[tokio::test]
async fn test_sub_microsecond_ordering_matches_memory_store() {
    let scratch = ScratchDir::new();
    let fs_store = FsSnapshotStore::new(&scratch.0);
    let memory = InMemorySnapshotStore::new();
    let base = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();

    let build = |nanos: i64, balance: i64| {
        SnapshotBuilder::new(ReportCode::new("PAY443").unwrap(), year())
            .created_at(base + Duration::nanoseconds(nanos))
            .build(&json!({ "TotalProfitSharingBalance": balance }))
    };
    let later = build(700, 2000);
    let earlier = build(200, 1000);
    for snapshot in [&later, &earlier] {
        fs_store.archive(snapshot).await.unwrap();
        memory.archive(snapshot.clone());
    }

    let from_fs = fs_store.get_latest("PAY443", year()).await.unwrap().unwrap();
    let from_memory = memory.get_latest("PAY443", year()).await.unwrap().unwrap();
    assert_eq!(from_fs, later);
    assert_eq!(from_fs, from_memory);
}

#[tokio::test]
async fn test_missing_root_is_empty() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);

    assert!(store.get_latest("PAY443", year()).await.unwrap().is_none());
    assert!(store.list_keys(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_keys_walks_tree() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);
    store.archive(&snapshot("PAY443", 2024, 9, 1)).await.unwrap();
    store.archive(&snapshot("PAY443", 2023, 9, 1)).await.unwrap();
    store.archive(&snapshot("QPAY129", 2024, 9, 1)).await.unwrap();
    // Stray entries are ignored.
    std::fs::create_dir_all(scratch.0.join("PAY443").join("not-a-year")).unwrap();
    std::fs::create_dir_all(scratch.0.join("PAY444").join("2024")).unwrap();

    let all = store.list_keys(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let keys = store.list_keys(Some(year())).await.unwrap();
    let names: Vec<&str> = keys.iter().map(|k| k.report_type.as_str()).collect();
    assert_eq!(names, ["PAY443", "QPAY129"]);
}

#[tokio::test]
async fn test_undecodable_document_is_corrupt() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);
    let dir = scratch.0.join("PAY443").join("2024");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("99991231T000000.000000000Z-broken.json"), b"{ not json").unwrap();

    let err = store.get_latest("PAY443", year()).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { fiscal_year: 2024, .. }), "{err}");
}

#[tokio::test]
async fn test_misfiled_document_is_corrupt() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);
    let path = store.archive(&snapshot("PAY443", 2023, 9, 1)).await.unwrap();
    let dir = scratch.0.join("PAY443").join("2024");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::rename(&path, dir.join(path.file_name().unwrap())).unwrap();

    let err = store.get_latest("PAY443", year()).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "{err}");
}

#[tokio::test]
async fn test_checksum_batch_continues_past_corrupt_document() {
    let scratch = ScratchDir::new();
    let store = FsSnapshotStore::new(&scratch.0);
    store.archive(&snapshot("PAY443", 2024, 9, 1000)).await.unwrap();
    let dir = scratch.0.join("QPAY129").join("2024");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("20250110T090000.000000000Z-broken.json"), b"[]").unwrap();

    let reconciler = Reconciler::new(
        Arc::new(store),
        Arc::new(InMemoryTransferLedger::new()),
        ReconciliationConfig::default(),
    );
    let reports = reconciler.validate_all_checksums(Some(year())).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].is_valid);
    assert_eq!(reports[0].report_type, "PAY443");
    assert!(!reports[1].is_valid);
    assert_eq!(reports[1].report_type, "QPAY129");
    assert!(reports[1].archived_at.is_none());
}

#[tokio::test]
async fn test_report_checksum_not_found() {
    let scratch = ScratchDir::new();
    let reconciler = Reconciler::new(
        Arc::new(FsSnapshotStore::new(&scratch.0)),
        Arc::new(InMemoryTransferLedger::new()),
        ReconciliationConfig::default(),
    );

    let err = reconciler
        .validate_report_checksum(year(), "PAY443")
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::SnapshotNotFound { .. }));
}
