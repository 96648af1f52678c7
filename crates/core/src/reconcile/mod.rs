//! Reconciliation orchestration.
//!
//! `Reconciler` runs a rule catalog for a fiscal year: it fans the groups
//! out concurrently, feeds the pure evaluators from the archive and the
//! transfer ledger, isolates failures to the group that raised them, and
//! aggregates the outcome into a `ReconciliationResult`.

mod error;
mod observer;
mod service;


pub use error::ReconcileError;
pub use observer::{NoopObserver, ReconciliationObserver, TracingObserver};
pub use service::Reconciler;
