//! # walletops
//! Batch wallet operations against a Solana RPC node.
//!
//! Two workflows share one orchestration layer: `sweep` drains near-all
//! balances from a list of sender wallets into a single recipient, one
//! wallet at a time with deadline-bounded confirmation; `scan` filters a
//! large wallet list by balance and history depth under bounded
//! concurrency. The orchestration primitives (backoff retry, concurrency
//! window, deadline racing) live in [`exec`]; all remote traffic goes
//! through the [`rpc::RpcGateway`] seam.

pub use crate::utils::error::{Error, Result};

pub mod config;
pub mod exec;
pub mod rpc;
pub mod scan;
pub mod sweep;
pub mod utils;
pub mod wallet;
