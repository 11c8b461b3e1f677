//! Concurrent wallet scan: filter a wallet list by balance and history
//! depth, under bounded concurrency.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use solana_sdk::native_token::lamports_to_sol;

use crate::exec::{run_bounded, with_backoff, RetryPolicy};
use crate::rpc::RpcGateway;
use crate::utils::error::{Error, Result};
use crate::utils::fs;
use crate::utils::logging::RunLogger;
use crate::wallet;

/// One signature page per wallet. Wallets with deeper history than this
/// report the cap, not their true count: a known approximation, kept
/// because a range filter over recent activity does not justify paging
/// through the full history of every wallet.
pub const SIGNATURE_PAGE_LIMIT: usize = 1000;

/// A wallet that passed both range predicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: String,
    pub balance_sol: f64,
    pub transaction_count: usize,
}

/// Tunables for one scan run, derived from the config file
#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub retry: RetryPolicy,
    /// Wallets below this balance are excluded without a history query
    pub min_balance_lamports: u64,
    /// Inclusive bounds on the observed transaction count
    pub tx_count_range: (usize, usize),
    /// Concurrency bound; backpressure against the remote rate limiter
    pub max_concurrent_requests: usize,
}

/// Outcome counters for one scan run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Non-blank wallet lines examined
    pub scanned: usize,
    /// Wallets that passed both predicates
    pub matched: usize,
    /// Wallets that failed to parse or query
    pub failed: usize,
}

pub struct ScanWorkflow {
    gateway: Arc<dyn RpcGateway>,
    logger: RunLogger,
    settings: ScanSettings,
}

impl ScanWorkflow {
    pub fn new(gateway: Arc<dyn RpcGateway>, logger: RunLogger, settings: ScanSettings) -> Self {
        Self {
            gateway,
            logger,
            settings,
        }
    }

    /// Scan every address in the raw lines of a wallets file (blank lines
    /// skipped). Records come back in input order; per-wallet failures are
    /// logged, counted and excluded.
    pub async fn run(&self, lines: &[String]) -> (Vec<WalletRecord>, ScanReport) {
        let addresses: Vec<String> = lines
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        let mut report = ScanReport {
            scanned: addresses.len(),
            ..ScanReport::default()
        };
        self.logger.info(&format!(
            "scan started: {} wallets, concurrency {}",
            report.scanned, self.settings.max_concurrent_requests
        ));

        let slots = run_bounded(
            addresses,
            self.settings.max_concurrent_requests,
            |address| self.scan_one(address),
        )
        .await;

        let mut records = Vec::new();
        for slot in slots {
            match slot {
                | Some(Some(record)) => records.push(record),
                | Some(None) => {} // excluded by a predicate
                | None => report.failed += 1, // task error, already logged
            }
        }
        report.matched = records.len();

        self.logger.info(&format!(
            "scan finished: {} scanned, {} matched, {} failed",
            report.scanned, report.matched, report.failed
        ));
        (records, report)
    }

    /// One wallet through the pipeline. `Ok(None)` is a predicate
    /// exclusion; `Err` is a real per-wallet failure.
    async fn scan_one(&self, address: String) -> Result<Option<WalletRecord>> {
        let pubkey = match wallet::parse_address(&address) {
            | Ok(pubkey) => pubkey,
            | Err(e) => {
                self.logger.error(&format!("scan: {e}"));
                return Err(e);
            }
        };

        let balance =
            match with_backoff(self.settings.retry, || self.gateway.balance(&pubkey)).await {
                | Ok(balance) => balance,
                | Err(e) => {
                    self.logger.error(&format!(
                        "scan {}: balance query failed: {e}",
                        wallet::mask(&pubkey)
                    ));
                    return Err(e);
                }
            };
        if balance < self.settings.min_balance_lamports {
            // below the floor: skip the history query entirely
            return Ok(None);
        }

        let count = match with_backoff(self.settings.retry, || {
            self.gateway.signature_count(&pubkey, SIGNATURE_PAGE_LIMIT)
        })
        .await
        {
            | Ok(count) => count,
            | Err(e) => {
                self.logger.error(&format!(
                    "scan {}: signature query failed: {e}",
                    wallet::mask(&pubkey)
                ));
                return Err(e);
            }
        };
        let (min, max) = self.settings.tx_count_range;
        if count < min || count > max {
            return Ok(None);
        }

        Ok(Some(WalletRecord {
            address: pubkey.to_string(),
            balance_sol: lamports_to_sol(balance),
            transaction_count: count,
        }))
    }

    /// Serialise the matched records to the results file in one write,
    /// after the whole run has finished.
    pub fn write_results(&self, path: &Path, records: &[WalletRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write_file(path, json).map_err(Error::from)?;
        self.logger
            .info(&format!("wrote {} records to {}", records.len(), path.display()));
        Ok(())
    }
}
