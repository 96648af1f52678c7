//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reconciliation engine settings.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Snapshot archive settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reconciliation engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Tolerance for the ending-balance identity (penny rounding).
    #[serde(default = "default_tolerance")]
    pub balance_tolerance: Decimal,
    /// Tolerance for field rules that compare tolerantly.
    #[serde(default = "default_tolerance")]
    pub field_tolerance: Decimal,
    /// Upper bound for a single snapshot lookup, in milliseconds.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Evaluate rule groups concurrently.
    #[serde(default = "default_parallel_groups")]
    pub parallel_groups: bool,
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_lookup_timeout_ms() -> u64 {
    5_000
}

fn default_parallel_groups() -> bool {
    true
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_tolerance(),
            field_tolerance: default_tolerance(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            parallel_groups: default_parallel_groups(),
        }
    }
}

/// Snapshot archive configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the filesystem archive.
    #[serde(default = "default_store_root")]
    pub root: String,
}

fn default_store_root() -> String {
    "archive".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "xref=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Reads `.env` first, then `config/default`, then `config/{RUN_MODE}`,
    /// then `XREF__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("XREF").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
