//! ALLOC / PAID ALLOC zero-sum check.

use rust_decimal::Decimal;
use xref_shared::FiscalYear;

use crate::validation::{Priority, Validation, ValidationGroup, format_currency};

const REPORT: &str = "PAY444";

/// Checks that internal transfers net to exactly zero.
///
/// Comparison is exact: a transfer imbalance of any size, even a fraction
/// of a cent, fails the group.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocTransferEvaluator;

impl AllocTransferEvaluator {
    /// Group name.
    pub const GROUP_NAME: &'static str = "ALLOC/PAID ALLOC Transfers";

    /// Rule text.
    pub const RULE: &'static str = "Sum(ALLOC) + Sum(PAID ALLOC) must equal 0";

    /// Description template; `{year}` is the fiscal year.
    pub const DESCRIPTION: &'static str =
        "Validates that ALLOC (code 6) and PAID ALLOC (code 5) transfers sum to zero for year {year}";

    /// Group description for a year.
    #[must_use]
    pub fn description(fiscal_year: FiscalYear) -> String {
        Self::DESCRIPTION.replace("{year}", &fiscal_year.to_string())
    }

    /// Evaluates posted transfer amounts. Outgoing amounts are negative.
    #[must_use]
    pub fn evaluate(
        fiscal_year: FiscalYear,
        incoming: &[Decimal],
        outgoing: &[Decimal],
    ) -> ValidationGroup {
        match (checked_sum(incoming), checked_sum(outgoing)) {
            (Some(alloc_total), Some(paid_alloc_total)) => {
                Self::evaluate_totals(fiscal_year, alloc_total, paid_alloc_total)
            }
            (alloc_total, paid_alloc_total) => {
                Self::overflow_group(fiscal_year, alloc_total, paid_alloc_total)
            }
        }
    }

    /// Evaluates transfer totals.
    #[must_use]
    pub fn evaluate_totals(
        fiscal_year: FiscalYear,
        alloc_total: Decimal,
        paid_alloc_total: Decimal,
    ) -> ValidationGroup {
        let Some(net) = alloc_total.checked_add(paid_alloc_total) else {
            return Self::overflow_group(fiscal_year, Some(alloc_total), Some(paid_alloc_total));
        };
        let is_valid = net.is_zero();

        let validations = vec![
            Validation::informational(
                "IncomingAllocations",
                REPORT,
                alloc_total,
                format!("ALLOC (code 6) total: {}", format_currency(alloc_total)),
                "Incoming beneficiary allocations (profit code 6, contribution field)",
            ),
            Validation::informational(
                "OutgoingAllocations",
                REPORT,
                paid_alloc_total,
                format!("PAID ALLOC (code 5) total: {}", format_currency(paid_alloc_total)),
                "Outgoing beneficiary allocations (profit code 5, forfeiture field)",
            ),
            Validation {
                field_name: "NetAllocTransfer".to_string(),
                report_code: REPORT.to_string(),
                current_value: Some(net),
                expected_value: Some(Decimal::ZERO),
                variance: Some(net),
                is_valid,
                message: if is_valid {
                    format!(
                        "Net transfer balances to zero: {} + {} = {}",
                        format_currency(alloc_total),
                        format_currency(paid_alloc_total),
                        format_currency(net)
                    )
                } else {
                    format!(
                        "Transfer imbalance: {} + {} = {} (expected 0)",
                        format_currency(alloc_total),
                        format_currency(paid_alloc_total),
                        format_currency(net)
                    )
                },
                notes: Some(
                    if is_valid {
                        "Transfers balance correctly"
                    } else {
                        "CRITICAL: Transfers do not balance"
                    }
                    .to_string(),
                ),
                archived_at: None,
            },
        ];

        let summary = if is_valid {
            format!(
                "ALLOC transfers balance to zero for year {fiscal_year} (ALLOC: {}, PAID ALLOC: {})",
                format_currency(alloc_total),
                format_currency(paid_alloc_total)
            )
        } else {
            format!(
                "ALLOC transfer IMBALANCE for year {fiscal_year}: Net difference is {}",
                format_currency(net)
            )
        };

        ValidationGroup::new(
            Self::GROUP_NAME,
            Self::description(fiscal_year),
            Priority::Critical,
            Self::RULE,
            validations,
            summary,
        )
    }

    /// Group for totals that do not fit in a `Decimal`.
    fn overflow_group(
        fiscal_year: FiscalYear,
        alloc_total: Option<Decimal>,
        paid_alloc_total: Option<Decimal>,
    ) -> ValidationGroup {
        let total = |field: &str, label: &str, value: Option<Decimal>| match value {
            Some(value) => Validation::informational(
                field,
                REPORT,
                value,
                format!("{label} total: {}", format_currency(value)),
                "Total computed",
            ),
            None => Validation::error(field, REPORT, format!("{label} total: arithmetic overflow")),
        };

        let validations = vec![
            total("IncomingAllocations", "ALLOC (code 6)", alloc_total),
            total("OutgoingAllocations", "PAID ALLOC (code 5)", paid_alloc_total),
            Validation {
                expected_value: Some(Decimal::ZERO),
                notes: Some("CRITICAL: Transfers could not be netted".to_string()),
                ..Validation::error(
                    "NetAllocTransfer",
                    REPORT,
                    "Transfer net failed: arithmetic overflow",
                )
            },
        ];

        ValidationGroup::new(
            Self::GROUP_NAME,
            Self::description(fiscal_year),
            Priority::Critical,
            Self::RULE,
            validations,
            format!("ALLOC transfers could not be evaluated for year {fiscal_year}: arithmetic overflow"),
        )
    }
}

fn checked_sum(amounts: &[Decimal]) -> Option<Decimal> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(*amount))
}
