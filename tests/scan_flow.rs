//! Scan workflow behaviour against a scripted gateway.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::signature::{Keypair, Signer};
use tempfile::tempdir;

use common::{read_log, temp_logger, FakeGateway};
use walletops::exec::RetryPolicy;
use walletops::scan::{ScanReport, ScanSettings, ScanWorkflow, WalletRecord, SIGNATURE_PAGE_LIMIT};

const MIN_BALANCE: u64 = 50_000_000; // 0.05 SOL

fn settings() -> ScanSettings {
    ScanSettings {
        retry: RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
        },
        min_balance_lamports: MIN_BALANCE,
        tx_count_range: (1, 1000),
        max_concurrent_requests: 4,
    }
}

fn address() -> (Keypair, String) {
    let keypair = Keypair::new();
    let address = keypair.pubkey().to_string();
    (keypair, address)
}

#[tokio::test(start_paused = true)]
async fn test_in_range_wallet_produces_one_record() {
    let (wallet, line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(wallet.pubkey(), 2_000_000_000)
            .with_count(wallet.pubkey(), 10),
    );
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway, logger, settings());
    let (records, report) = workflow.run(&[line]).await;

    assert_eq!(
        report,
        ScanReport { scanned: 1, matched: 1, failed: 0 }
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, wallet.pubkey().to_string());
    // decimal-converted balance
    assert!((records[0].balance_sol - 2.0).abs() < 1e-9);
    assert_eq!(records[0].transaction_count, 10);
}

#[tokio::test(start_paused = true)]
async fn test_low_balance_short_circuits_history_query() {
    let (wallet, line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(wallet.pubkey(), MIN_BALANCE - 1)
            .with_count(wallet.pubkey(), 10),
    );
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway.clone(), logger, settings());
    let (records, report) = workflow.run(&[line]).await;

    assert!(records.is_empty());
    assert_eq!(report.matched, 0);
    assert_eq!(report.failed, 0);
    // the transaction-count RPC was never issued for the excluded wallet
    assert_eq!(gateway.balance_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.count_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_count_outside_range_excluded() {
    let (quiet, quiet_line) = address();
    let (busy, busy_line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(quiet.pubkey(), 2_000_000_000)
            .with_count(quiet.pubkey(), 0)
            .with_balance(busy.pubkey(), 2_000_000_000)
            .with_count(busy.pubkey(), 1000),
    );
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let mut narrowed = settings();
    narrowed.tx_count_range = (1, 500);
    let workflow = ScanWorkflow::new(gateway.clone(), logger, narrowed);
    let (records, report) = workflow.run(&[quiet_line, busy_line]).await;

    assert!(records.is_empty());
    assert_eq!(report.failed, 0);
    // both wallets got a history query; both fell outside [1, 500]
    assert_eq!(gateway.count_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_address_is_a_per_wallet_failure() {
    let (wallet, line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(wallet.pubkey(), 2_000_000_000)
            .with_count(wallet.pubkey(), 5),
    );
    let dir = tempdir().unwrap();
    let (logger, _, err_path) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway.clone(), logger, settings());
    let (records, report) = workflow
        .run(&["definitely-not-base58!".to_string(), line])
        .await;

    assert_eq!(
        report,
        ScanReport { scanned: 2, matched: 1, failed: 1 }
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, wallet.pubkey().to_string());
    // the bad line never reached the RPC layer
    assert_eq!(gateway.balance_calls.load(Ordering::SeqCst), 1);
    assert!(read_log(&err_path).contains("Invalid address"));
}

#[tokio::test(start_paused = true)]
async fn test_results_preserve_input_order() {
    let wallets: Vec<(Keypair, String)> = (0..6).map(|_| address()).collect();
    let mut gateway = FakeGateway::new(0);
    for (i, (keypair, _)) in wallets.iter().enumerate() {
        gateway = gateway
            .with_balance(keypair.pubkey(), 1_000_000_000 + i as u64)
            .with_count(keypair.pubkey(), 10 + i);
    }
    let gateway = Arc::new(gateway);
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway, logger, settings());
    let lines: Vec<String> = wallets.iter().map(|(_, line)| line.clone()).collect();
    let (records, _) = workflow.run(&lines).await;

    let expected: Vec<String> = wallets
        .iter()
        .map(|(keypair, _)| keypair.pubkey().to_string())
        .collect();
    let actual: Vec<String> = records.into_iter().map(|r| r.address).collect();
    assert_eq!(actual, expected);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_account_fails_without_stopping_the_run() {
    let (known, known_line) = address();
    let (unknown, unknown_line) = address();
    let _ = unknown; // scripted as missing from the gateway
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(known.pubkey(), 2_000_000_000)
            .with_count(known.pubkey(), 3),
    );
    let dir = tempdir().unwrap();
    let (logger, _, err_path) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway, logger, settings());
    let (records, report) = workflow.run(&[unknown_line, known_line]).await;

    assert_eq!(
        report,
        ScanReport { scanned: 2, matched: 1, failed: 1 }
    );
    assert_eq!(records.len(), 1);
    assert!(read_log(&err_path).contains("balance query failed"));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_balance_is_retried_through() {
    let (wallet, line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(wallet.pubkey(), 2_000_000_000)
            .with_count(wallet.pubkey(), 10)
            .rate_limiting_balance(2),
    );
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway.clone(), logger, settings());
    let (records, report) = workflow.run(&[line]).await;

    assert_eq!(report.matched, 1);
    assert_eq!(records.len(), 1);
    // two rate-limited attempts, then the successful third
    assert_eq!(gateway.balance_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_history_query_uses_the_fixed_page_cap() {
    let (wallet, line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(wallet.pubkey(), 2_000_000_000)
            .with_count(wallet.pubkey(), 10),
    );
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway.clone(), logger, settings());
    let _ = workflow.run(&[line]).await;

    assert_eq!(
        gateway.last_count_limit.load(Ordering::SeqCst),
        SIGNATURE_PAGE_LIMIT
    );
}

#[tokio::test(start_paused = true)]
async fn test_results_written_once_as_json_array() {
    let (wallet, line) = address();
    let gateway = Arc::new(
        FakeGateway::new(0)
            .with_balance(wallet.pubkey(), 1_500_000_000)
            .with_count(wallet.pubkey(), 7),
    );
    let dir = tempdir().unwrap();
    let (logger, _, _) = temp_logger(&dir);

    let workflow = ScanWorkflow::new(gateway, logger, settings());
    let (records, _) = workflow.run(&[line]).await;

    let out = dir.path().join("results").join("scan_results.json");
    workflow.write_results(&out, &records).unwrap();

    let parsed: Vec<WalletRecord> =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed, records);
    assert_eq!(parsed[0].transaction_count, 7);
}
