//! Error handling for the wallet batch tooling.

use std::time::Duration;

use thiserror::Error;

use crate::rpc::RpcFailure;

/// Main error type for the wallet batch tooling
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors; always fatal before any processing begins
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A key line that does not decode to a usable keypair
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// A wallet line that does not parse as a public key
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A remote call failed; carries the boundary classification
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcFailure),

    /// The backoff loop hit its attempt bound while still rate limited
    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: String },

    /// Confirmation was not observed before the deadline. The transfer may
    /// still settle out-of-band: the outcome is unknown, not negative.
    #[error("Confirmation timed out after {}s", .after.as_secs())]
    ConfirmationTimeout { after: Duration },

    /// The cluster executed the transaction and reported failure
    #[error("Transaction failed on-chain: {0}")]
    TransactionFailed(String),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

/// Result type for the wallet batch tooling
pub type Result<T> = std::result::Result<T, Error>;

impl From<bs58::decode::Error> for Error {
    fn from(err: bs58::decode::Error) -> Self {
        Error::InvalidCredential(format!("bs58 decode error: {}", err))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(format!("{err:#}"))
    }
}

impl Error {
    /// True for the outcome-unknown failure shape, which callers log
    /// differently from a negative result.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Error::ConfirmationTimeout { .. })
    }
}
