//! Validation results and their aggregation.
//!
//! This module provides:
//! - `Validation` - a single field or rule check
//! - `ValidationGroup` - a named, prioritized set of checks
//! - `ReconciliationResult` - the aggregate verdict over all groups
//! - `Comparison` - how a current value is compared to its archived value

mod comparison;
mod format;
mod result;
mod types;

#[cfg(test)]
mod result_props;

pub use comparison::Comparison;
pub use format::format_currency;
pub use result::{Decision, ReconciliationResult};
pub use types::{Priority, Validation, ValidationGroup};
