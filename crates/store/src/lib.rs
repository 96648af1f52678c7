//! Storage adapters for the cross-reference engine.
//!
//! This crate provides:
//! - An in-memory snapshot store for tests and embedding hosts
//! - A filesystem snapshot archive of JSON documents
//! - An in-memory transfer ledger

pub mod repositories;

pub use repositories::{FsSnapshotStore, InMemorySnapshotStore, InMemoryTransferLedger};
