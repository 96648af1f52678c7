//! Shared types, errors, and configuration for the cross-reference engine.
//!
//! This crate provides common pieces used across all other crates:
//! - Fiscal year and report/field key types
//! - Application-wide error taxonomy
//! - Configuration management
//! - Tracing bootstrap for embedding hosts

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::{FieldKey, FiscalYear, ReportCode};
