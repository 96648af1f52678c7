//! Snapshot checksums and drift detection.
//!
//! An archived report snapshot keeps its raw JSON payload next to a map of
//! numeric key fields, each with a SHA-256 digest of its canonical value.
//! Re-deriving that map from the payload and comparing the canonical
//! digests tells whether the archive drifted since it was written.
//!
//! - `extract` - numeric leaf walker and typed field schemas
//! - `digest` - canonical value encoding and digests
//! - `snapshot` - archived snapshot type and builder
//! - `validator` - `ChecksumValidator` and per-report outcomes

mod digest;
mod error;
mod extract;
mod snapshot;
mod validator;

#[cfg(test)]
mod digest_props;

pub use digest::{FieldHash, canonical_decimal, canonical_digest, digests_match, hash_fields, leaf_digest};
pub use error::ChecksumError;
pub use extract::{FieldDescriptor, FieldSchema, SchemaRegistry, extract_fields, walk_numeric_leaves};
pub use snapshot::{ArchivedReportSnapshot, SnapshotBuilder};
pub use validator::{ChecksumOutcome, ChecksumReport, ChecksumValidator};
