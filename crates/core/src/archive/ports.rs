//! Ports implemented by storage adapters.
//!
//! The store crate provides in-memory and filesystem implementations;
//! hosts may plug in their own.

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xref_shared::{FiscalYear, ReportCode};

use crate::checksum::ArchivedReportSnapshot;

/// Errors raised by storage collaborators.
///
/// `Clone` so that one failed lookup can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store cannot be reached or did not answer in time.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("Corrupt snapshot {report_type}/{fiscal_year}: {reason}")]
    Corrupt {
        /// Report type of the record.
        report_type: String,
        /// Fiscal year of the record.
        fiscal_year: i16,
        /// Decoder message.
        reason: String,
    },

    /// A query failed for a reason specific to the request.
    #[error("Query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Returns true if the error means no group can be evaluated at all.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Corrupt { .. } => "CORRUPT_SNAPSHOT",
            Self::Query(_) => "QUERY_FAILED",
        }
    }
}

/// Identity of the latest snapshot for a report and year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    /// Report type.
    pub report_type: ReportCode,
    /// Fiscal year.
    pub fiscal_year: FiscalYear,
}

/// Read access to archived report snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Latest snapshot (greatest `created_at`) for a report type and year.
    fn get_latest(
        &self,
        report_type: &str,
        fiscal_year: FiscalYear,
    ) -> impl Future<Output = Result<Option<ArchivedReportSnapshot>, StoreError>> + Send;

    /// Every archived (report type, year) pair, optionally for one year.
    fn list_keys(
        &self,
        fiscal_year: Option<FiscalYear>,
    ) -> impl Future<Output = Result<Vec<SnapshotKey>, StoreError>> + Send;
}

/// Internal transfer kinds posted to the profit ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferCode {
    /// ALLOC: transfer into a participant account, recorded as a contribution.
    IncomingAllocation,
    /// PAID ALLOC: transfer out of a participant account, recorded as a forfeiture.
    OutgoingAllocation,
}

impl TransferCode {
    /// Profit code id used by the ledger for this transfer kind.
    #[must_use]
    pub fn profit_code_id(self) -> u8 {
        match self {
            Self::IncomingAllocation => 6,
            Self::OutgoingAllocation => 5,
        }
    }

    /// Short display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::IncomingAllocation => "ALLOC",
            Self::OutgoingAllocation => "PAID ALLOC",
        }
    }
}

/// Read access to internal transfer postings.
pub trait TransferLedger: Send + Sync {
    /// Signed amounts posted in a year for a transfer kind.
    ///
    /// Outgoing transfers are negative.
    fn postings(
        &self,
        fiscal_year: FiscalYear,
        code: TransferCode,
    ) -> impl Future<Output = Result<Vec<Decimal>, StoreError>> + Send;
}
