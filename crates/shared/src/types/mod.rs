//! Common types used across the engine.

pub mod fiscal_year;
pub mod report;

pub use fiscal_year::FiscalYear;
pub use report::{FieldKey, ReportCode};
