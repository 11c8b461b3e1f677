//! Logging for the wallet batch tooling: console output through the `log`
//! facade plus the explicit two-file run log handed to workflows.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::info;

use crate::utils::error::Result;
use crate::utils::fs::ensure_dir;

/// Initialize the console logging system
pub fn init_logging(level: &str) {
    let env = Env::default()
        .filter_or("WALLETOPS_LOG", level)
        .write_style_or("WALLETOPS_LOG_STYLE", "auto");

    Builder::from_env(env)
        .format(|buf, record| {
            let level = record.level();
            let level_color = match level {
                | log::Level::Error => "\x1b[31m", // Red
                | log::Level::Warn => "\x1b[33m",  // Yellow
                | log::Level::Info => "\x1b[32m",  // Green
                | log::Level::Debug => "\x1b[36m", // Cyan
                | log::Level::Trace => "\x1b[35m", // Magenta
            };
            let reset = "\x1b[0m";

            writeln!(
                buf,
                "{} {}{:5}{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level_color,
                level,
                reset,
                record.target(),
                record.args()
            )
        })
        .target(Target::Stdout)
        .try_init()
        .ok();

    info!("Logging initialized at level: {}", level);
}

/// Append-only run log: one stream for transaction/info events, one for
/// errors. Constructed once per run and passed into each workflow, so no
/// workflow depends on process-global file-logger state. Records are
/// line-oriented: local timestamp, level, message.
#[derive(Clone)]
pub struct RunLogger {
    transactions: Arc<Mutex<File>>,
    errors: Arc<Mutex<File>>,
}

impl RunLogger {
    /// Open (or create) both log files in append mode.
    pub fn open(transaction_log: &Path, error_log: &Path) -> Result<Self> {
        Ok(Self {
            transactions: Arc::new(Mutex::new(Self::append_handle(transaction_log)?)),
            errors: Arc::new(Mutex::new(Self::append_handle(error_log)?)),
        })
    }

    fn append_handle(path: &Path) -> Result<File> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(OpenOptions::new().create(true).append(true).open(path)?)
    }

    /// Record an informational event (transfers, skips, run summaries).
    pub fn info(&self, message: &str) {
        info!("{}", message);
        Self::append(&self.transactions, "INFO", message);
    }

    /// Record an error event with full diagnostic detail.
    pub fn error(&self, message: &str) {
        log::error!("{}", message);
        Self::append(&self.errors, "ERROR", message);
    }

    fn append(sink: &Arc<Mutex<File>>, level: &str, message: &str) {
        // A failed log write must never take down the workflow it reports on.
        if let Ok(mut file) = sink.lock() {
            let _ = writeln!(
                file,
                "{} {:5} {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            );
        }
    }
}
