//! RPC gateway boundary.
//!
//! Every remote interaction goes through the [`RpcGateway`] trait so the
//! workflows can run against an in-memory fake in tests. Failure
//! classification happens exactly once, at this boundary: callers only ever
//! see the closed [`RpcFailure`] tag, never transport error strings.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use thiserror::Error;

use crate::wallet::TransferIntent;

pub mod solana;

pub use solana::SolanaGateway;

/// Closed classification of remote-call failures, decided once at the
/// client boundary. The retry layer matches on this enum only.
#[derive(Debug, Clone, Error)]
pub enum RpcFailure {
    /// Rate-limit shaped (HTTP 429 or an equivalent JSON-RPC code);
    /// eligible for backoff retry
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Any other failure; surfaced immediately, never retried
    #[error("{0}")]
    Other(String),
}

/// Settlement state of a submitted transaction as observed by polling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Not yet visible at the configured commitment level
    Pending,
    /// Settled successfully
    Confirmed,
    /// Executed and failed on-chain
    Failed(String),
}

/// The remote collaborator: a Solana JSON-RPC node.
#[async_trait]
pub trait RpcGateway: Send + Sync {
    /// Current balance of `account`, in lamports
    async fn balance(&self, account: &Pubkey) -> Result<u64, RpcFailure>;

    /// Minimum lamports an account of `data_len` bytes must hold to stay
    /// rent exempt
    async fn minimum_rent_exemption(&self, data_len: usize) -> Result<u64, RpcFailure>;

    /// Number of historical signatures for `account`, capped at `limit`
    /// (one page; deeper history is not visible through this call)
    async fn signature_count(&self, account: &Pubkey, limit: usize) -> Result<usize, RpcFailure>;

    /// Build, sign and submit a system transfer for `intent`. Returns the
    /// signature as soon as the node accepts the submission; acceptance is
    /// not confirmation.
    async fn submit_transfer(
        &self,
        intent: &TransferIntent,
        signer: &Keypair,
    ) -> Result<Signature, RpcFailure>;

    /// One status poll for a submitted signature
    async fn confirmation_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, RpcFailure>;

    /// On-chain execution logs for a transaction, used for diagnostics on
    /// failed sweeps
    async fn transaction_logs(&self, signature: &Signature) -> Result<Vec<String>, RpcFailure>;
}
