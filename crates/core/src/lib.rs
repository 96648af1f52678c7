//! Core reconciliation logic for the cross-reference engine.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached only through the ports in `archive`.
//!
//! # Modules
//!
//! - `validation` - Validation results and Master Update verdicts
//! - `checksum` - Snapshot digests and drift detection
//! - `archive` - Store and ledger ports, archived value lookups
//! - `rules` - Field, balance equation and transfer evaluators, rule catalogs
//! - `reconcile` - The reconciliation service

pub mod archive;
pub mod checksum;
pub mod reconcile;
pub mod rules;
pub mod validation;

pub use archive::{SnapshotKey, SnapshotStore, StoreError, TransferCode, TransferLedger};
pub use checksum::{ArchivedReportSnapshot, ChecksumReport, ChecksumValidator, SnapshotBuilder};
pub use reconcile::{ReconcileError, Reconciler};
pub use rules::{BreakoutTotals, CurrentValues, RuleCatalog};
pub use validation::{Priority, ReconciliationResult, Validation, ValidationGroup};
