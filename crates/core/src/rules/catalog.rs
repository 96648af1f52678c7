//! Declarative rule groups.
//!
//! Every group the reconciler evaluates is described here as data. Field
//! comparison groups are table-driven; the balance equation and transfer
//! checks are dedicated kinds with their own evaluators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xref_shared::FiscalYear;

use super::{AllocTransferEvaluator, BalanceEquationEvaluator, CurrentValues, FieldRef};
use crate::validation::{Comparison, Priority};

/// How a group is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Compare each field's current value to its archived value.
    FieldMatch {
        /// Fields checked, in order.
        fields: Vec<FieldRef>,
        /// Comparison applied to every field of the group.
        comparison: Comparison,
    },
    /// The PAY444 ending-balance identity.
    BalanceEquation,
    /// The ALLOC / PAID ALLOC zero-sum check.
    AllocTransfers,
}

/// One rule group. Text fields may contain `{year}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroupSpec {
    /// Group name.
    pub name: String,
    /// Description template.
    pub description: String,
    /// Severity.
    pub priority: Priority,
    /// Rule text.
    pub rule: String,
    /// Evaluation kind.
    pub kind: RuleKind,
    /// Summary template when the group passes.
    pub pass_summary: String,
    /// Summary template when the group fails.
    pub fail_summary: String,
}

impl RuleGroupSpec {
    /// Field comparison group.
    #[must_use]
    pub fn field_match(
        name: &str,
        description: &str,
        priority: Priority,
        rule: &str,
        fields: Vec<FieldRef>,
        comparison: Comparison,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            priority,
            rule: rule.to_string(),
            kind: RuleKind::FieldMatch { fields, comparison },
            pass_summary: format!("{name} matches archived values for year {{year}}"),
            fail_summary: format!("{name} does NOT match archived values for year {{year}}"),
        }
    }

    /// Sets the summary templates.
    #[must_use]
    pub fn summaries(mut self, pass: &str, fail: &str) -> Self {
        self.pass_summary = pass.to_string();
        self.fail_summary = fail.to_string();
        self
    }

    /// The balance equation group.
    #[must_use]
    pub fn balance_equation() -> Self {
        Self {
            name: BalanceEquationEvaluator::GROUP_NAME.to_string(),
            description: BalanceEquationEvaluator::DESCRIPTION.to_string(),
            priority: Priority::Critical,
            rule: BalanceEquationEvaluator::RULE.to_string(),
            kind: RuleKind::BalanceEquation,
            pass_summary: String::new(),
            fail_summary: String::new(),
        }
    }

    /// The ALLOC / PAID ALLOC transfer group.
    #[must_use]
    pub fn alloc_transfers() -> Self {
        Self {
            name: AllocTransferEvaluator::GROUP_NAME.to_string(),
            description: AllocTransferEvaluator::DESCRIPTION.to_string(),
            priority: Priority::Critical,
            rule: AllocTransferEvaluator::RULE.to_string(),
            kind: RuleKind::AllocTransfers,
            pass_summary: String::new(),
            fail_summary: String::new(),
        }
    }

    /// Fills `{year}` in a template.
    #[must_use]
    pub fn render(template: &str, fiscal_year: FiscalYear) -> String {
        template.replace("{year}", &fiscal_year.to_string())
    }
}

fn field(report_code: &str, field_name: &str) -> FieldRef {
    FieldRef::new(report_code, field_name)
}

/// An ordered list of rule groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCatalog {
    groups: Vec<RuleGroupSpec>,
}

impl RuleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group.
    #[must_use]
    pub fn with_group(mut self, group: RuleGroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Groups in evaluation order.
    #[must_use]
    pub fn groups(&self) -> &[RuleGroupSpec] {
        &self.groups
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if the catalog has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The nine groups checked before a Master Update.
    #[must_use]
    pub fn master_update() -> Self {
        Self::new()
            .with_group(
                RuleGroupSpec::field_match(
                    "Beginning Balance",
                    "Validates PAY444.BeginningBalance matches archived PAY443.TotalProfitSharingBalance for year {year}",
                    Priority::Critical,
                    "PAY444.BeginningBalance should equal archived PAY443.TotalProfitSharingBalance",
                    vec![field("PAY443", "TotalProfitSharingBalance")],
                    Comparison::Exact,
                )
                .summaries(
                    "Beginning balance matches archived PAY443 for year {year}",
                    "Beginning balance does NOT match archived PAY443 for year {year}",
                ),
            )
            .with_group(
                RuleGroupSpec::field_match(
                    "Total Distributions",
                    "Cross-validation of distribution totals across year-end reports",
                    Priority::Critical,
                    "PAY444.DISTRIB = PAY443.DistributionTotals = QPAY129.Distributions = QPAY066TA.TotalDisbursements",
                    vec![
                        field("PAY443", "DistributionTotals"),
                        field("QPAY129", "QPAY129_DistributionTotals"),
                        field("QPAY066TA", "TotalDisbursements"),
                    ],
                    Comparison::Exact,
                )
                .summaries(
                    "All distribution totals are in sync across PAY443, QPAY129, and QPAY066TA.",
                    "Distribution totals are OUT OF SYNC. This is a critical financial discrepancy.",
                ),
            )
            .with_group(
                RuleGroupSpec::field_match(
                    "Total Forfeitures",
                    "Cross-validation of forfeiture totals across year-end reports",
                    Priority::Critical,
                    "PAY444.FORFEITS = PAY443.TotalForfeitures = QPAY129.ForfeitedAmount",
                    vec![
                        field("PAY443", "TotalForfeitures"),
                        field("QPAY129", "ForfeitedAmount"),
                    ],
                    Comparison::Exact,
                )
                .summaries(
                    "All forfeiture totals are in sync across PAY443 and QPAY129.",
                    "Forfeiture totals are OUT OF SYNC. Review PAY443 and QPAY129 data.",
                ),
            )
            .with_group(
                RuleGroupSpec::field_match(
                    "Total Contributions",
                    "Cross-validation of contribution totals",
                    Priority::High,
                    "PAY444.CONTRIB = PAY443.TotalContributions",
                    vec![field("PAY443", "TotalContributions")],
                    Comparison::Tolerant,
                )
                .summaries(
                    "Contribution totals are in sync.",
                    "Contribution totals mismatch detected.",
                ),
            )
            .with_group(
                RuleGroupSpec::field_match(
                    "Total Earnings",
                    "Cross-validation of earnings totals",
                    Priority::High,
                    "PAY444.EARNINGS = PAY443.TotalEarnings",
                    vec![field("PAY443", "TotalEarnings")],
                    Comparison::Tolerant,
                )
                .summaries(
                    "Earnings totals are in sync.",
                    "Earnings totals mismatch detected.",
                ),
            )
            .with_group(RuleGroupSpec::alloc_transfers())
            .with_group(RuleGroupSpec::balance_equation())
            .with_group(
                RuleGroupSpec::field_match(
                    "Total Forfeit Points",
                    "Cross-validation of forfeit point totals",
                    Priority::High,
                    "PAY444.FORFEIT_POINTS = PAY443.TotalForfeitPoints",
                    vec![field("PAY443", "TotalForfeitPoints")],
                    Comparison::Exact,
                )
                .summaries(
                    "Forfeit point totals are in sync.",
                    "Forfeit point totals mismatch detected.",
                ),
            )
            .with_group(
                RuleGroupSpec::field_match(
                    "Total Earning Points",
                    "Cross-validation of earning point totals",
                    Priority::High,
                    "PAY444.EARNING_POINTS = PAY443.TotalEarningPoints",
                    vec![field("PAY443", "TotalEarningPoints")],
                    Comparison::Exact,
                )
                .summaries(
                    "Earning point totals are in sync.",
                    "Earning point totals mismatch detected.",
                ),
            )
    }

    /// Members, Balance and Wages of one profit sharing report section.
    ///
    /// `prefix` comes from [`profit_sharing_prefix`]; frozen reports are
    /// checked against `PAY426N_FROZEN`.
    #[must_use]
    pub fn profit_sharing(prefix: &str, frozen: bool) -> Self {
        let report = profit_sharing_report_code(frozen);
        ["Members", "Balance", "Wages"]
            .into_iter()
            .fold(Self::new(), |catalog, name| {
                catalog.with_group(
                    RuleGroupSpec::field_match(
                        name,
                        &format!(
                            "Validates Profit Sharing Report. Matches archived Profit Sharing Summary {name} for year {{year}}"
                        ),
                        Priority::Critical,
                        &format!(
                            "Profit Sharing Report {name} should equal archived Profit Sharing Summary {name}"
                        ),
                        vec![field(report, &format!("{prefix}{name}"))],
                        Comparison::Exact,
                    )
                    .summaries(
                        &format!("{name} matches archived Profit Sharing Summary for year {{year}}"),
                        &format!("{name} does NOT match archived Profit Sharing Summary for year {{year}}"),
                    ),
                )
            })
    }

    /// QPAY129 distribution and forfeiture totals.
    #[must_use]
    pub fn forfeitures_and_points() -> Self {
        Self::new().with_group(
            RuleGroupSpec::field_match(
                "Forfeitures and Points",
                "Validates PAY444 Forfeitures and Points against archived values",
                Priority::High,
                "PAY444 Distribution Totals, and Forfeit Totals should match archived values",
                vec![
                    field("QPAY129", "QPAY129_DistributionTotals"),
                    field("QPAY129", "ForfeitureTotal"),
                ],
                Comparison::Exact,
            )
            .summaries(
                "Forfeitures and Points validation completed.",
                "Forfeitures and Points validation completed.",
            ),
        )
    }

    /// PAY444 breakout report grand totals.
    #[must_use]
    pub fn breakout_totals() -> Self {
        let group = |name: &str, subject: &str, field_name: &str| {
            RuleGroupSpec::field_match(
                name,
                &format!("Validates {subject} between Master Update and the breakdown report"),
                Priority::High,
                &format!("Store breakdown {subject} should match archived values"),
                vec![field("PAY444", field_name)],
                Comparison::Exact,
            )
            .summaries(
                &format!("{name} validation passed."),
                &format!("{name} validation failed."),
            )
        };

        Self::new()
            .with_group(group("Beginning Balance", "beginning balance", "BeginningBalanceTotal"))
            .with_group(group("Earnings Total", "earnings total", "EarningsGrandTotal"))
            .with_group(group("Contributions Total", "contributions total", "ContributionsGrandTotal"))
    }
}

/// Report code of the profit sharing summary.
#[must_use]
pub fn profit_sharing_report_code(frozen: bool) -> &'static str {
    if frozen { "PAY426N_FROZEN" } else { "PAY426N" }
}

/// Key-field prefix of a profit sharing report section, by report suffix.
#[must_use]
pub fn profit_sharing_prefix(suffix: &str) -> Option<&'static str> {
    match suffix.trim() {
        "1" => Some("18_20WillVest"),
        "2" => Some("Over21WillVest"),
        "3" => Some("Under18"),
        "4" => Some("Ovr18WillNotVestPrior"),
        "5" => Some("Ovr18WillNotVestNoPrior"),
        "6" => Some("TermOvr18WouldVest"),
        "7" => Some("TermUndrWouldNotVestNoPrior"),
        "8" => Some("TermOvr18WouldNotVestNoPrior"),
        _ => None,
    }
}

/// Grand totals of the PAY444 store breakout report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutTotals {
    /// Employees on the report.
    pub number_of_employees: u32,
    /// Beginning balance grand total.
    pub beginning_balance: Decimal,
    /// Earnings grand total.
    pub earnings_total: Decimal,
    /// Contributions grand total.
    pub contributions_total: Decimal,
    /// Disbursements grand total.
    pub disbursement_totals: Decimal,
    /// Ending balance grand total.
    pub ending_balance: Decimal,
}

impl BreakoutTotals {
    /// Current values for the totals the breakout catalog checks.
    #[must_use]
    pub fn current_values(&self) -> CurrentValues {
        [
            ("PAY444.BeginningBalanceTotal", self.beginning_balance),
            ("PAY444.EarningsGrandTotal", self.earnings_total),
            ("PAY444.ContributionsGrandTotal", self.contributions_total),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}
