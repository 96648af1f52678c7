//! Ending-balance identity over the PAY444 components.
//!
//! `Ending = Beginning + Contributions + ALLOC - Distributions - PAID ALLOC
//! + Earnings - Forfeitures`

use rust_decimal::Decimal;
use xref_shared::FiscalYear;

use super::CurrentValues;
use crate::validation::{Priority, Validation, ValidationGroup, format_currency};

const REPORT: &str = "PAY444";

/// Component inputs, read from current values under these keys.
const BEGINNING_KEY: &str = "PAY444.BeginningBalance";
const CONTRIBUTIONS_KEY: &str = "PAY444.CONTRIB";
const ALLOC_IN_KEY: &str = "PAY444.ALLOC";
const DISTRIBUTIONS_KEY: &str = "PAY444.DISTRIB";
const ALLOC_OUT_KEY: &str = "PAY444.PAIDALLOC";
const EARNINGS_KEY: &str = "PAY444.EARNINGS";
const FORFEITURES_KEY: &str = "PAY444.FORFEITS";
const ENDING_KEY: &str = "PAY444.EndingBalance";

/// The PAY444 balance components for one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceComponents {
    /// Starting balance carried from the prior year.
    pub beginning_balance: Decimal,
    /// Contributions, excluding ALLOC transfers.
    pub contributions: Decimal,
    /// ALLOC transfers in.
    pub alloc_in: Decimal,
    /// Distributions, excluding PAID ALLOC transfers.
    pub distributions: Decimal,
    /// PAID ALLOC transfers out.
    pub alloc_out: Decimal,
    /// Earnings for the year.
    pub earnings: Decimal,
    /// Forfeitures for the year.
    pub forfeitures: Decimal,
    /// Reported ending balance.
    pub expected_ending_balance: Decimal,
}

impl BalanceComponents {
    /// Reads components from current values.
    ///
    /// Missing components default to zero; their keys are returned so the
    /// caller can flag them.
    #[must_use]
    pub fn from_current_values(values: &CurrentValues) -> (Self, Vec<&'static str>) {
        let mut missing = Vec::new();
        let mut read = |key: &'static str| {
            values.get(key).copied().unwrap_or_else(|| {
                missing.push(key);
                Decimal::ZERO
            })
        };

        let components = Self {
            beginning_balance: read(BEGINNING_KEY),
            contributions: read(CONTRIBUTIONS_KEY),
            alloc_in: read(ALLOC_IN_KEY),
            distributions: read(DISTRIBUTIONS_KEY),
            alloc_out: read(ALLOC_OUT_KEY),
            earnings: read(EARNINGS_KEY),
            forfeitures: read(FORFEITURES_KEY),
            expected_ending_balance: read(ENDING_KEY),
        };
        (components, missing)
    }

    /// Ending balance implied by the components, or `None` if it does not
    /// fit in a `Decimal`.
    #[must_use]
    pub fn calculated_ending_balance(&self) -> Option<Decimal> {
        self.beginning_balance
            .checked_add(self.contributions)?
            .checked_add(self.alloc_in)?
            .checked_sub(self.distributions)?
            .checked_sub(self.alloc_out)?
            .checked_add(self.earnings)?
            .checked_sub(self.forfeitures)
    }

    /// One-line breakdown of the equation with its result.
    #[must_use]
    pub fn breakdown(&self) -> String {
        format!(
            "Beginning: {} + Contrib: {} + ALLOC: {} - Distrib: {} - Paid ALLOC: {} + Earnings: {} - Forfeits: {} = {}",
            format_currency(self.beginning_balance),
            format_currency(self.contributions),
            format_currency(self.alloc_in),
            format_currency(self.distributions),
            format_currency(self.alloc_out),
            format_currency(self.earnings),
            format_currency(self.forfeitures),
            self.calculated_ending_balance()
                .map_or_else(|| "overflow".to_string(), format_currency),
        )
    }
}

/// Checks the ending-balance identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceEquationEvaluator {
    tolerance: Decimal,
}

impl BalanceEquationEvaluator {
    /// Group name.
    pub const GROUP_NAME: &'static str = "Balance Equation";

    /// Rule text.
    pub const RULE: &'static str = "Ending Balance = Beginning Balance + Contributions + ALLOC - Distributions - PAID ALLOC + Earnings - Forfeitures";

    /// Creates an evaluator; the identity holds when
    /// `|calculated - expected| < tolerance`.
    #[must_use]
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Description template; `{year}` is the fiscal year.
    pub const DESCRIPTION: &'static str = "Validates PAY444 balance equation for year {year}: Ending Balance = Beginning + Contributions + ALLOC - Distributions - PAID ALLOC + Earnings - Forfeitures";

    /// Group description for a year.
    #[must_use]
    pub fn description(fiscal_year: FiscalYear) -> String {
        Self::DESCRIPTION.replace("{year}", &fiscal_year.to_string())
    }

    /// Evaluates the identity over current values.
    #[must_use]
    pub fn evaluate(&self, fiscal_year: FiscalYear, values: &CurrentValues) -> ValidationGroup {
        let (components, missing) = BalanceComponents::from_current_values(values);
        self.evaluate_components(fiscal_year, &components, &missing)
    }

    /// Evaluates the identity over explicit components.
    ///
    /// `missing` lists component keys that were defaulted to zero.
    #[must_use]
    pub fn evaluate_components(
        &self,
        fiscal_year: FiscalYear,
        components: &BalanceComponents,
        missing: &[&str],
    ) -> ValidationGroup {
        let component = |field: &str, key: &str, value: Decimal, notes: &str| {
            let notes = if missing.contains(&key) {
                format!("{notes} (not provided, defaulted to 0)")
            } else {
                notes.to_string()
            };
            Validation::informational(
                field,
                REPORT,
                value,
                format!("{field}: {}", format_currency(value)),
                notes,
            )
        };

        let mut validations = vec![
            component(
                "BeginningBalance",
                BEGINNING_KEY,
                components.beginning_balance,
                "Starting balance from prior year PAY443",
            ),
            component(
                "Contributions",
                CONTRIBUTIONS_KEY,
                components.contributions,
                "Employer + employee contributions (excluding ALLOC transfers)",
            ),
            component(
                "ALLOC",
                ALLOC_IN_KEY,
                components.alloc_in,
                "Internal transfers IN from other accounts",
            ),
            component(
                "Distributions",
                DISTRIBUTIONS_KEY,
                components.distributions,
                "Withdrawals and distributions (excluding PAID ALLOC)",
            ),
            component(
                "PAID ALLOC",
                ALLOC_OUT_KEY,
                components.alloc_out,
                "Internal transfers OUT to other accounts",
            ),
            component(
                "Earnings",
                EARNINGS_KEY,
                components.earnings,
                "Investment gains/losses for the year",
            ),
            component(
                "Forfeitures",
                FORFEITURES_KEY,
                components.forfeitures,
                "Forfeited amounts redistributed",
            ),
        ];

        let calculated = components.calculated_ending_balance();
        let expected = components.expected_ending_balance;
        let variance = calculated.and_then(|c| c.checked_sub(expected));
        let is_valid = variance.is_some_and(|v| v.abs() < self.tolerance);
        let breakdown = components.breakdown();

        let (message, mut summary) = match (calculated, variance) {
            (Some(calculated), Some(_)) if is_valid => (
                format!(
                    "Balance equation validates: {} matches expected {}",
                    format_currency(calculated),
                    format_currency(expected)
                ),
                format!(
                    "Balance equation validates for year {fiscal_year}: {} = {}",
                    format_currency(calculated),
                    format_currency(expected)
                ),
            ),
            (Some(calculated), Some(variance)) => (
                format!(
                    "Balance equation MISMATCH: Calculated {} vs Expected {} (variance: {})",
                    format_currency(calculated),
                    format_currency(expected),
                    format_currency(variance)
                ),
                format!(
                    "Balance equation MISMATCH for year {fiscal_year}: Calculated {} vs Expected {} (variance: {})",
                    format_currency(calculated),
                    format_currency(expected),
                    format_currency(variance)
                ),
            ),
            _ => (
                "Balance equation failed: arithmetic overflow".to_string(),
                format!("Balance equation could not be evaluated for year {fiscal_year}: arithmetic overflow"),
            ),
        };

        validations.push(Validation {
            field_name: "CalculatedVsExpected".to_string(),
            report_code: REPORT.to_string(),
            current_value: calculated,
            expected_value: Some(expected),
            variance,
            is_valid,
            message,
            notes: Some(breakdown.clone()),
            archived_at: None,
        });

        summary.push('\n');
        summary.push_str(&breakdown);
        if !missing.is_empty() {
            summary.push_str(&format!("\nDefaulted to 0: {}", missing.join(", ")));
        }

        ValidationGroup::new(
            Self::GROUP_NAME,
            Self::description(fiscal_year),
            Priority::Critical,
            Self::RULE,
            validations,
            summary,
        )
    }
}
