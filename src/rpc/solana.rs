//! Production [`RpcGateway`] over `solana-client`'s non-blocking client.

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcError as JsonRpcError;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::UiTransactionEncoding;

use super::{ConfirmationStatus, RpcFailure, RpcGateway};
use crate::wallet::TransferIntent;

/// Gateway backed by a real Solana JSON-RPC node
pub struct SolanaGateway {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaGateway {
    /// Create a gateway for `endpoint` with the given commitment level
    pub fn new(endpoint: &str, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(endpoint.to_string(), commitment),
            commitment,
        }
    }
}

/// Classify a client error into the closed retry taxonomy. Rate limiting
/// shows up either as a transport-level HTTP 429 or as a JSON-RPC response
/// error carrying the same code.
fn classify(err: ClientError) -> RpcFailure {
    let rate_limited = match err.kind() {
        | ClientErrorKind::Reqwest(e) => e
            .status()
            .map_or(false, |s| s == reqwest::StatusCode::TOO_MANY_REQUESTS),
        | ClientErrorKind::RpcError(JsonRpcError::RpcResponseError { code, .. }) => *code == 429,
        | _ => false,
    };
    if rate_limited {
        RpcFailure::RateLimited(err.to_string())
    } else {
        RpcFailure::Other(err.to_string())
    }
}

#[async_trait]
impl RpcGateway for SolanaGateway {
    async fn balance(&self, account: &Pubkey) -> Result<u64, RpcFailure> {
        self.client.get_balance(account).await.map_err(classify)
    }

    async fn minimum_rent_exemption(&self, data_len: usize) -> Result<u64, RpcFailure> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(classify)
    }

    async fn signature_count(&self, account: &Pubkey, limit: usize) -> Result<usize, RpcFailure> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(self.commitment),
        };
        let signatures = self
            .client
            .get_signatures_for_address_with_config(account, config)
            .await
            .map_err(classify)?;
        Ok(signatures.len())
    }

    async fn submit_transfer(
        &self,
        intent: &TransferIntent,
        signer: &Keypair,
    ) -> Result<Signature, RpcFailure> {
        let blockhash = self.client.get_latest_blockhash().await.map_err(classify)?;
        let instruction = system_instruction::transfer(&intent.from, &intent.to, intent.lamports);
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&intent.from),
            &[signer],
            blockhash,
        );
        // send only: confirmation is the caller's deadline-bounded concern
        self.client.send_transaction(&transaction).await.map_err(classify)
    }

    async fn confirmation_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, RpcFailure> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(classify)?;
        let status = match response.value.into_iter().next().flatten() {
            | Some(status) => status,
            | None => return Ok(ConfirmationStatus::Pending),
        };
        if let Some(err) = status.err {
            return Ok(ConfirmationStatus::Failed(err.to_string()));
        }
        if status.satisfies_commitment(self.commitment) {
            Ok(ConfirmationStatus::Confirmed)
        } else {
            Ok(ConfirmationStatus::Pending)
        }
    }

    async fn transaction_logs(&self, signature: &Signature) -> Result<Vec<String>, RpcFailure> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };
        let transaction = self
            .client
            .get_transaction_with_config(signature, config)
            .await
            .map_err(classify)?;
        let logs = transaction
            .transaction
            .meta
            .and_then(|meta| Option::<Vec<String>>::from(meta.log_messages))
            .unwrap_or_default();
        Ok(logs)
    }
}
