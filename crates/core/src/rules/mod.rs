//! Reconciliation rules and their evaluators.
//!
//! - `field` - one current value against its archived value
//! - `balance` - the ending-balance identity over PAY444 components
//! - `transfer` - ALLOC / PAID ALLOC zero-sum check
//! - `catalog` - declarative rule groups evaluated by the reconciler
//!
//! Evaluators are pure; the reconciler performs all I/O and hands them
//! the values they need.

mod balance;
mod catalog;
mod field;
mod transfer;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod transfer_props;

use std::collections::HashMap;

use rust_decimal::Decimal;

pub use balance::{BalanceComponents, BalanceEquationEvaluator};
pub use catalog::{
    BreakoutTotals, RuleCatalog, RuleGroupSpec, RuleKind, profit_sharing_prefix,
    profit_sharing_report_code,
};
pub use field::{FieldRef, FieldValidator};
pub use transfer::AllocTransferEvaluator;

/// Current figures keyed `"ReportCode.FieldName"`.
pub type CurrentValues = HashMap<String, Decimal>;
