//! Configuration for the wallet batch tooling

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_sdk::native_token::sol_to_lamports;

use crate::exec::RetryPolicy;
use crate::utils::error::{Error, Result};
use crate::utils::fs;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint and retry/confirmation tuning
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Sweep workflow settings
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Scan workflow settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Console level and run-log file paths
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// RPC endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Commitment level (processed, confirmed, finalized)
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Hard bound on total attempts for rate-limited calls
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in milliseconds; doubles on every retry
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Wall-clock bound for observing a submitted transfer settle
    #[serde(default = "default_confirmation_timeout_seconds")]
    pub confirmation_timeout_seconds: u64,

    /// Interval between confirmation status polls in milliseconds
    #[serde(default = "default_confirmation_poll_ms")]
    pub confirmation_poll_ms: u64,
}

/// Sweep workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Newline-delimited credentials; the first line is the recipient
    #[serde(default = "default_keys_file")]
    pub keys_file: String,

    /// Fixed fee reserve withheld from every transfer, in SOL
    #[serde(default = "default_transaction_fee_sol")]
    pub transaction_fee_sol: f64,
}

/// Scan workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Newline-delimited wallet addresses to scan
    #[serde(default = "default_wallets_file")]
    pub wallets_file: String,

    /// Destination for the JSON result array
    #[serde(default = "default_results_file")]
    pub results_file: String,

    /// Wallets below this balance are excluded without a history query
    #[serde(default = "default_min_balance_sol")]
    pub min_balance_sol: f64,

    /// Inclusive [min, max] bounds on the observed transaction count
    #[serde(default = "default_transaction_count_range")]
    pub transaction_count_range: (usize, usize),

    /// Concurrency bound for in-flight wallet queries
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Console log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append-only transaction/info event log
    #[serde(default = "default_transaction_log")]
    pub transaction_log: String,

    /// Append-only error event log
    #[serde(default = "default_error_log")]
    pub error_log: String,
}

fn default_endpoint() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}
fn default_commitment() -> String {
    "confirmed".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_confirmation_timeout_seconds() -> u64 {
    60
}
fn default_confirmation_poll_ms() -> u64 {
    2_000
}
fn default_keys_file() -> String {
    "keys.txt".to_string()
}
fn default_transaction_fee_sol() -> f64 {
    0.001
}
fn default_wallets_file() -> String {
    "wallets.txt".to_string()
}
fn default_results_file() -> String {
    "scan_results.json".to_string()
}
fn default_min_balance_sol() -> f64 {
    0.05
}
fn default_transaction_count_range() -> (usize, usize) {
    (1, 1000)
}
fn default_max_concurrent_requests() -> usize {
    8
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_transaction_log() -> String {
    "logs/transactions.log".to_string()
}
fn default_error_log() -> String {
    "logs/errors.log".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            commitment: default_commitment(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            confirmation_timeout_seconds: default_confirmation_timeout_seconds(),
            confirmation_poll_ms: default_confirmation_poll_ms(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            keys_file: default_keys_file(),
            transaction_fee_sol: default_transaction_fee_sol(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            wallets_file: default_wallets_file(),
            results_file: default_results_file(),
            min_balance_sol: default_min_balance_sol(),
            transaction_count_range: default_transaction_count_range(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            transaction_log: default_transaction_log(),
            error_log: default_error_log(),
        }
    }
}

impl RpcConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_backoff_ms),
        }
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_ms)
    }
}

impl SweepConfig {
    pub fn fee_lamports(&self) -> u64 {
        sol_to_lamports(self.transaction_fee_sol)
    }
}

impl ScanConfig {
    pub fn min_balance_lamports(&self) -> u64 {
        sol_to_lamports(self.min_balance_sol)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_file(path.as_ref())
            .map_err(|e| Error::ConfigError(format!("{e:#}")))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise the default configuration, for `walletops init`
    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    fn validate(&self) -> Result<()> {
        let (min, max) = self.scan.transaction_count_range;
        if min > max {
            return Err(Error::ConfigError(format!(
                "transaction_count_range minimum {min} exceeds maximum {max}"
            )));
        }
        if self.sweep.transaction_fee_sol < 0.0 {
            return Err(Error::ConfigError(
                "transaction_fee_sol must not be negative".to_string(),
            ));
        }
        if self.scan.min_balance_sol < 0.0 {
            return Err(Error::ConfigError(
                "min_balance_sol must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
