//! Archive access: collaborator ports and the archived value provider.

mod ports;
mod provider;

pub use ports::{SnapshotKey, SnapshotStore, StoreError, TransferCode, TransferLedger};
pub use provider::{ArchivedLookup, ArchivedValueProvider};
