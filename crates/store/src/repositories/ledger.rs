//! In-memory transfer ledger.

use dashmap::DashMap;
use rust_decimal::Decimal;
use xref_core::archive::{StoreError, TransferCode, TransferLedger};
use xref_shared::FiscalYear;

/// Transfer postings held in memory.
#[derive(Debug, Default)]
pub struct InMemoryTransferLedger {
    postings: DashMap<(FiscalYear, TransferCode), Vec<Decimal>>,
}

impl InMemoryTransferLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a posting. Outgoing amounts are expected to be negative.
    pub fn post(&self, fiscal_year: FiscalYear, code: TransferCode, amount: Decimal) {
        self.postings
            .entry((fiscal_year, code))
            .or_default()
            .push(amount);
    }
}

impl TransferLedger for InMemoryTransferLedger {
    async fn postings(
        &self,
        fiscal_year: FiscalYear,
        code: TransferCode,
    ) -> Result<Vec<Decimal>, StoreError> {
        Ok(self
            .postings
            .get(&(fiscal_year, code))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
