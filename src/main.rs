//! walletops CLI: sweep many wallets into one recipient, or scan a wallet
//! list for balance and history matches.

use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use solana_sdk::commitment_config::CommitmentConfig;

use walletops::config::Config;
use walletops::rpc::{RpcGateway, SolanaGateway};
use walletops::scan::{ScanSettings, ScanWorkflow};
use walletops::sweep::{SweepSettings, SweepWorkflow};
use walletops::utils::error::Error;
use walletops::utils::logging::{init_logging, RunLogger};
use walletops::utils::fs;

#[derive(Debug, Parser)]
#[command(name = "walletops", author, version, about = "Batch wallet operations against a Solana RPC node", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sweep near-all balances from every sender wallet into the recipient
    /// (the first line of the keys file)
    Sweep,
    /// Scan the wallet list for balances and history depth within the
    /// configured ranges
    Scan,
    /// Write a default configuration file
    Init {
        /// Output path for the config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    // Per-wallet failures are logged and absorbed by the workflows; an
    // error surfacing here is configuration-shaped and fatal.
    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::Init { output, force } = &args.command {
        return init_config(output, *force);
    }

    let config = Config::from_file(&args.config)?;
    let level = if args.debug { "debug" } else { config.logging.level.as_str() };
    init_logging(level);

    let logger = RunLogger::open(
        Path::new(&config.logging.transaction_log),
        Path::new(&config.logging.error_log),
    )?;
    let commitment = CommitmentConfig::from_str(&config.rpc.commitment).map_err(|e| {
        Error::ConfigError(format!(
            "unknown commitment level {:?}: {e}",
            config.rpc.commitment
        ))
    })?;
    let gateway: Arc<dyn RpcGateway> =
        Arc::new(SolanaGateway::new(&config.rpc.endpoint, commitment));
    log::info!("using RPC endpoint {}", config.rpc.endpoint);

    match args.command {
        | Command::Sweep => run_sweep(&config, gateway, logger).await,
        | Command::Scan => run_scan(&config, gateway, logger).await,
        | Command::Init { .. } => unreachable!("handled above"),
    }
}

async fn run_sweep(config: &Config, gateway: Arc<dyn RpcGateway>, logger: RunLogger) -> Result<()> {
    let lines = fs::read_lines(&config.sweep.keys_file)?;
    let settings = SweepSettings {
        retry: config.rpc.retry_policy(),
        fee_lamports: config.sweep.fee_lamports(),
        confirmation_timeout: config.rpc.confirmation_timeout(),
        poll_interval: config.rpc.poll_interval(),
    };

    let report = SweepWorkflow::new(gateway, logger, settings).run(&lines).await?;
    println!(
        "Sweep complete: {} processed, {} swept, {} skipped, {} failed",
        report.processed, report.swept, report.skipped, report.failed
    );
    Ok(())
}

async fn run_scan(config: &Config, gateway: Arc<dyn RpcGateway>, logger: RunLogger) -> Result<()> {
    let lines = fs::read_lines(&config.scan.wallets_file)?;
    let settings = ScanSettings {
        retry: config.rpc.retry_policy(),
        min_balance_lamports: config.scan.min_balance_lamports(),
        tx_count_range: config.scan.transaction_count_range,
        max_concurrent_requests: config.scan.max_concurrent_requests,
    };

    let workflow = ScanWorkflow::new(gateway, logger, settings);
    let (records, report) = workflow.run(&lines).await;
    workflow.write_results(Path::new(&config.scan.results_file), &records)?;
    println!(
        "Scan complete: {} scanned, {} matched, {} failed (results in {})",
        report.scanned, report.matched, report.failed, config.scan.results_file
    );
    Ok(())
}

fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(Error::ConfigError(format!(
            "{} already exists (use --force to overwrite)",
            output.display()
        ))
        .into());
    }
    fs::write_file(output, Config::default_toml()?)?;
    println!("✅ Wrote default config to {}", output.display());
    Ok(())
}
