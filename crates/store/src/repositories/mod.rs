//! Snapshot store and transfer ledger implementations.

mod filesystem;
mod ledger;
mod memory;

pub use filesystem::FsSnapshotStore;
pub use ledger::InMemoryTransferLedger;
pub use memory::InMemorySnapshotStore;
