//! Shared in-memory RPC gateway fake for workflow tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};

use walletops::rpc::{ConfirmationStatus, RpcFailure, RpcGateway};
use walletops::utils::logging::RunLogger;
use walletops::wallet::TransferIntent;

/// Scripted gateway: balances and signature counts come from maps,
/// confirmation statuses from a queue (the last entry repeats), and every
/// method keeps a call counter so tests can assert which RPCs were issued.
#[derive(Default)]
pub struct FakeGateway {
    rent_exemption: u64,
    balances: Mutex<HashMap<Pubkey, u64>>,
    counts: Mutex<HashMap<Pubkey, usize>>,
    status_script: Mutex<VecDeque<ConfirmationStatus>>,
    execution_logs: Vec<String>,
    submit_failure: Mutex<Option<RpcFailure>>,
    rate_limit_balance_times: AtomicUsize,

    pub balance_calls: AtomicUsize,
    pub rent_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub last_count_limit: AtomicUsize,
    pub submitted: Mutex<Vec<TransferIntent>>,
}

impl FakeGateway {
    pub fn new(rent_exemption: u64) -> Self {
        Self {
            rent_exemption,
            ..Self::default()
        }
    }

    pub fn with_balance(self, account: Pubkey, lamports: u64) -> Self {
        self.balances.lock().unwrap().insert(account, lamports);
        self
    }

    pub fn with_count(self, account: Pubkey, count: usize) -> Self {
        self.counts.lock().unwrap().insert(account, count);
        self
    }

    /// Script the sequence of confirmation statuses; the final entry
    /// repeats for any further polls.
    pub fn with_status_script(self, script: Vec<ConfirmationStatus>) -> Self {
        *self.status_script.lock().unwrap() = script.into();
        self
    }

    pub fn with_execution_logs(self, logs: Vec<String>) -> Self {
        Self {
            execution_logs: logs,
            ..self
        }
    }

    pub fn failing_submission(self, failure: RpcFailure) -> Self {
        *self.submit_failure.lock().unwrap() = Some(failure);
        self
    }

    /// Make the first `times` balance calls fail with a rate-limit signal.
    pub fn rate_limiting_balance(self, times: usize) -> Self {
        self.rate_limit_balance_times.store(times, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl RpcGateway for FakeGateway {
    async fn balance(&self, account: &Pubkey) -> Result<u64, RpcFailure> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.rate_limit_balance_times.load(Ordering::SeqCst);
        if remaining > 0 {
            self.rate_limit_balance_times
                .store(remaining - 1, Ordering::SeqCst);
            return Err(RpcFailure::RateLimited("429 Too Many Requests".into()));
        }
        self.balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .ok_or_else(|| RpcFailure::Other(format!("AccountNotFound: {account}")))
    }

    async fn minimum_rent_exemption(&self, _data_len: usize) -> Result<u64, RpcFailure> {
        self.rent_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rent_exemption)
    }

    async fn signature_count(&self, account: &Pubkey, limit: usize) -> Result<usize, RpcFailure> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.last_count_limit.store(limit, Ordering::SeqCst);
        let count = self
            .counts
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .ok_or_else(|| RpcFailure::Other(format!("AccountNotFound: {account}")))?;
        Ok(count.min(limit))
    }

    async fn submit_transfer(
        &self,
        intent: &TransferIntent,
        _signer: &Keypair,
    ) -> Result<Signature, RpcFailure> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.submit_failure.lock().unwrap().clone() {
            return Err(failure);
        }
        self.submitted.lock().unwrap().push(*intent);
        Ok(Signature::default())
    }

    async fn confirmation_status(
        &self,
        _signature: &Signature,
    ) -> Result<ConfirmationStatus, RpcFailure> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.status_script.lock().unwrap();
        match script.len() {
            | 0 => Ok(ConfirmationStatus::Confirmed),
            | 1 => Ok(script.front().cloned().unwrap()),
            | _ => Ok(script.pop_front().unwrap()),
        }
    }

    async fn transaction_logs(&self, _signature: &Signature) -> Result<Vec<String>, RpcFailure> {
        Ok(self.execution_logs.clone())
    }
}

/// A run logger writing into a temp directory, plus the paths of both
/// files so tests can read the records back.
pub fn temp_logger(dir: &tempfile::TempDir) -> (RunLogger, PathBuf, PathBuf) {
    let tx_path = dir.path().join("transactions.log");
    let err_path = dir.path().join("errors.log");
    let logger = RunLogger::open(&tx_path, &err_path).unwrap();
    (logger, tx_path, err_path)
}

pub fn read_log(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
