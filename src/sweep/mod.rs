//! Sequential sweep workflow: drain each sender wallet into one recipient.
//!
//! Wallets are processed strictly one at a time. The sweep mutates real
//! external financial state, so ordering must stay deterministic and the
//! logs readable as a ledger of what was attempted.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};

use crate::exec::{with_backoff, within_deadline, RetryPolicy};
use crate::rpc::{ConfirmationStatus, RpcGateway};
use crate::utils::error::{Error, Result};
use crate::utils::logging::RunLogger;
use crate::wallet::{self, parse_credential, TransferIntent};

/// Tunables for one sweep run, derived from the config file
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    pub retry: RetryPolicy,
    /// Fixed fee reserve withheld from every transfer, in lamports
    pub fee_lamports: u64,
    /// Wall-clock bound on observing a submitted transfer settle
    pub confirmation_timeout: Duration,
    /// Pause between confirmation status polls
    pub poll_interval: Duration,
}

/// Outcome counters for one sweep run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Sender lines examined (the recipient line is not counted)
    pub processed: usize,
    /// Transfers submitted and confirmed
    pub swept: usize,
    /// Wallets whose balance could not cover reserve plus fee
    pub skipped: usize,
    /// Wallets that failed to parse, submit or confirm
    pub failed: usize,
}

enum Outcome {
    Swept,
    Insufficient,
    Failed,
}

pub struct SweepWorkflow {
    gateway: Arc<dyn RpcGateway>,
    logger: RunLogger,
    settings: SweepSettings,
}

impl SweepWorkflow {
    pub fn new(gateway: Arc<dyn RpcGateway>, logger: RunLogger, settings: SweepSettings) -> Self {
        Self {
            gateway,
            logger,
            settings,
        }
    }

    /// Run the sweep over the raw lines of a keys file. Blank lines are
    /// skipped; the first usable line is the recipient and is never swept
    /// itself.
    ///
    /// Per-wallet failures are logged and counted, never fatal. The only
    /// errors returned here are configuration-shaped: fewer than two
    /// usable lines, or a recipient line that does not decode.
    pub async fn run(&self, lines: &[String]) -> Result<SweepReport> {
        let entries: Vec<&str> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        if entries.len() < 2 {
            return Err(Error::ConfigError(format!(
                "keys file must contain a recipient plus at least one sender, found {} usable lines",
                entries.len()
            )));
        }

        let recipient = parse_credential(entries[0])
            .map_err(|e| Error::ConfigError(format!("recipient (first line) is unusable: {e}")))?
            .pubkey();
        self.logger.info(&format!(
            "sweep started: {} sender wallets, recipient {}",
            entries.len() - 1,
            wallet::mask(&recipient)
        ));

        let mut report = SweepReport::default();
        for line in &entries[1..] {
            report.processed += 1;
            let sender = match parse_credential(line) {
                | Ok(keypair) => keypair,
                | Err(e) => {
                    self.logger
                        .error(&format!("skipping unparseable key line: {e}"));
                    report.failed += 1;
                    continue;
                }
            };
            match self.sweep_one(&sender, &recipient).await {
                | Outcome::Swept => report.swept += 1,
                | Outcome::Insufficient => report.skipped += 1,
                | Outcome::Failed => report.failed += 1,
            }
        }

        self.logger.info(&format!(
            "sweep finished: {} processed, {} swept, {} skipped, {} failed",
            report.processed, report.swept, report.skipped, report.failed
        ));
        Ok(report)
    }

    /// One wallet through the full pipeline: balance and reserve queries,
    /// amount computation, submission, deadline-bounded confirmation.
    async fn sweep_one(&self, sender: &Keypair, recipient: &Pubkey) -> Outcome {
        let from = sender.pubkey();

        let balance = match with_backoff(self.settings.retry, || self.gateway.balance(&from)).await
        {
            | Ok(balance) => balance,
            | Err(e) => {
                self.report_failure(&from, None, &e).await;
                return Outcome::Failed;
            }
        };
        let reserve =
            match with_backoff(self.settings.retry, || self.gateway.minimum_rent_exemption(0))
                .await
            {
                | Ok(reserve) => reserve,
                | Err(e) => {
                    self.report_failure(&from, None, &e).await;
                    return Outcome::Failed;
                }
            };

        // lamports arithmetic in i128 so a deficit stays representable
        let sendable = balance as i128 - reserve as i128 - self.settings.fee_lamports as i128;
        if sendable <= 0 {
            self.logger.info(&format!(
                "{}: insufficient balance, skipping (balance {} lamports, reserve {}, fee {})",
                wallet::mask(&from),
                balance,
                reserve,
                self.settings.fee_lamports
            ));
            return Outcome::Insufficient;
        }

        let intent = match TransferIntent::new(from, *recipient, sendable as u64) {
            | Ok(intent) => intent,
            | Err(e) => {
                self.report_failure(&from, None, &e).await;
                return Outcome::Failed;
            }
        };
        let signature = match with_backoff(self.settings.retry, || {
            self.gateway.submit_transfer(&intent, sender)
        })
        .await
        {
            | Ok(signature) => signature,
            | Err(e) => {
                self.report_failure(&from, None, &e).await;
                return Outcome::Failed;
            }
        };

        match within_deadline(
            self.settings.confirmation_timeout,
            self.poll_until_settled(&signature),
        )
        .await
        {
            | Ok(Ok(())) => {
                self.logger.info(&format!(
                    "swept {:.9} SOL from {} to {} ({})",
                    intent.amount_sol(),
                    wallet::mask(&from),
                    wallet::mask(recipient),
                    signature
                ));
                Outcome::Swept
            }
            | Ok(Err(e)) | Err(e) => {
                self.report_failure(&from, Some(&signature), &e).await;
                Outcome::Failed
            }
        }
    }

    /// Poll confirmation status until the transaction settles. Transient
    /// poll failures keep polling: the surrounding deadline bounds the
    /// loop.
    async fn poll_until_settled(&self, signature: &Signature) -> Result<()> {
        loop {
            match self.gateway.confirmation_status(signature).await {
                | Ok(ConfirmationStatus::Confirmed) => return Ok(()),
                | Ok(ConfirmationStatus::Failed(reason)) => {
                    return Err(Error::TransactionFailed(reason))
                }
                | Ok(ConfirmationStatus::Pending) => {}
                | Err(e) => log::debug!("confirmation poll failed, will poll again: {e}"),
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Write one failure to the error log. A confirmation timeout is
    /// phrased as outcome-unknown: the transfer was submitted and may still
    /// settle after we stopped watching. When a signature exists, on-chain
    /// execution logs are fetched best-effort; a fetch failure is
    /// swallowed.
    async fn report_failure(&self, sender: &Pubkey, signature: Option<&Signature>, err: &Error) {
        let mut detail = if err.is_outcome_unknown() {
            format!(
                "{}: confirmation not observed before the deadline, outcome unknown: {err}",
                wallet::mask(sender)
            )
        } else {
            format!("{}: sweep failed: {err}", wallet::mask(sender))
        };
        if let Some(signature) = signature {
            detail.push_str(&format!(" (signature {signature})"));
            if let Ok(logs) = self.gateway.transaction_logs(signature).await {
                if !logs.is_empty() {
                    detail.push_str(&format!("; execution logs: {}", logs.join(" | ")));
                }
            }
        }
        self.logger.error(&detail);
    }
}
