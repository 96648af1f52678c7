//! Archived report snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xref_shared::{FiscalYear, ReportCode};

use super::digest::{FieldHash, canonical_digest, hash_fields};
use super::error::ChecksumError;
use super::extract::{FieldSchema, extract_fields};

/// An immutable archived copy of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedReportSnapshot {
    /// Report type, e.g. `PAY443`.
    pub report_type: ReportCode,
    /// Fiscal year the report covers.
    pub fiscal_year: FiscalYear,
    /// When the snapshot was archived.
    pub created_at: DateTime<Utc>,
    /// The report exactly as archived (JSON text).
    pub raw_payload: String,
    /// Numeric key fields with their digests.
    pub field_hashes: BTreeMap<String, FieldHash>,
}

impl ArchivedReportSnapshot {
    /// Canonical digest of the archived key fields.
    #[must_use]
    pub fn archived_digest(&self) -> String {
        canonical_digest(&self.field_hashes)
    }

    /// Archived key field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldHash> {
        self.field_hashes.get(name)
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn raw_payload_bytes(&self) -> &[u8] {
        self.raw_payload.as_bytes()
    }
}

/// Builds snapshots ready to be archived.
///
/// ```ignore
/// let snapshot = SnapshotBuilder::new(report_type, year)
///     .schema(schema)
///     .build(&payload);
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    report_type: ReportCode,
    fiscal_year: FiscalYear,
    created_at: DateTime<Utc>,
    schema: Option<FieldSchema>,
}

impl SnapshotBuilder {
    /// Starts a snapshot stamped with the current time.
    #[must_use]
    pub fn new(report_type: ReportCode, fiscal_year: FiscalYear) -> Self {
        Self {
            report_type,
            fiscal_year,
            created_at: Utc::now(),
            schema: None,
        }
    }

    /// Overrides the archive timestamp.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Extracts key fields with a schema instead of the walker.
    #[must_use]
    pub fn schema(mut self, schema: FieldSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Builds a snapshot of a JSON payload.
    #[must_use]
    pub fn build(self, payload: &serde_json::Value) -> ArchivedReportSnapshot {
        let field_hashes = hash_fields(extract_fields(payload, self.schema.as_ref()));
        ArchivedReportSnapshot {
            report_type: self.report_type,
            fiscal_year: self.fiscal_year,
            created_at: self.created_at,
            raw_payload: payload.to_string(),
            field_hashes,
        }
    }

    /// Builds a snapshot of any serializable report.
    pub fn build_from<T: Serialize>(self, report: &T) -> Result<ArchivedReportSnapshot, ChecksumError> {
        let payload =
            serde_json::to_value(report).map_err(|e| ChecksumError::Serialization(e.to_string()))?;
        Ok(self.build(&payload))
    }
}
