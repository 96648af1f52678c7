//! Drift detection for archived snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xref_shared::FiscalYear;

use super::digest::{canonical_digest, digests_match, hash_fields};
use super::error::ChecksumError;
use super::extract::{FieldSchema, extract_fields};
use super::snapshot::ArchivedReportSnapshot;

/// Outcome of re-deriving a payload's digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumOutcome {
    /// True iff the recomputed digest equals the archived one byte for byte.
    pub is_valid: bool,
    /// Digest recomputed from the payload.
    pub recomputed_digest: String,
}

/// Checksum verdict for one archived report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecksumReport {
    /// Fiscal year of the snapshot.
    pub fiscal_year: FiscalYear,
    /// Report type of the snapshot.
    pub report_type: String,
    /// True iff no drift was detected.
    pub is_valid: bool,
    /// Human-readable verdict.
    pub message: String,
    /// Digest of the archived key fields.
    pub archived_checksum: String,
    /// Digest recomputed from the archived payload; empty if unreadable.
    pub current_checksum: String,
    /// When the snapshot was archived; `None` if the record was unreadable.
    pub archived_at: Option<DateTime<Utc>>,
}

/// Re-derives key-field digests from a raw payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumValidator<'a> {
    schema: Option<&'a FieldSchema>,
}

impl<'a> ChecksumValidator<'a> {
    /// Validator that walks every numeric leaf.
    #[must_use]
    pub fn new() -> Self {
        Self { schema: None }
    }

    /// Validator that extracts the fields declared by `schema`.
    #[must_use]
    pub fn with_schema(schema: &'a FieldSchema) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    /// Recomputes the canonical digest of `raw_payload` and compares it to
    /// `archived_digest` with exact string equality.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` if the payload is not JSON. Malformed
    /// leaves inside a valid document are skipped, never reported.
    pub fn validate(
        &self,
        archived_digest: &str,
        raw_payload: &[u8],
    ) -> Result<ChecksumOutcome, ChecksumError> {
        let payload: serde_json::Value = serde_json::from_slice(raw_payload)
            .map_err(|e| ChecksumError::MalformedPayload(e.to_string()))?;

        let fields = hash_fields(extract_fields(&payload, self.schema));
        let recomputed_digest = canonical_digest(&fields);

        Ok(ChecksumOutcome {
            is_valid: digests_match(archived_digest, &recomputed_digest),
            recomputed_digest,
        })
    }

    /// Checks a snapshot's payload against its own archived key fields.
    ///
    /// An unreadable payload yields an invalid report rather than an error.
    #[must_use]
    pub fn check_snapshot(&self, snapshot: &ArchivedReportSnapshot) -> ChecksumReport {
        let archived_checksum = snapshot.archived_digest();

        let (is_valid, current_checksum, message) =
            match self.validate(&archived_checksum, snapshot.raw_payload_bytes()) {
                Ok(outcome) if outcome.is_valid => (
                    true,
                    outcome.recomputed_digest,
                    "Checksums match - no data drift detected".to_string(),
                ),
                Ok(outcome) => (
                    false,
                    outcome.recomputed_digest,
                    "Checksums do not match - data drift detected".to_string(),
                ),
                Err(e) => (false, String::new(), format!("Archived payload is unreadable: {e}")),
            };

        ChecksumReport {
            fiscal_year: snapshot.fiscal_year,
            report_type: snapshot.report_type.to_string(),
            is_valid,
            message,
            archived_checksum,
            current_checksum,
            archived_at: Some(snapshot.created_at),
        }
    }
}
