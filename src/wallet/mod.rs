//! Credential parsing and transfer primitives.
//!
//! A key line is accepted in either of two encodings — a bracketed
//! comma-separated byte array (the solana-keygen JSON layout) or a base-58
//! string — and both must decode to the identical 64-byte keypair layout.

use std::str::FromStr;

use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

use crate::utils::error::{Error, Result};

/// Secret-key material length: 32 secret bytes followed by the 32-byte
/// public key.
pub const KEYPAIR_LEN: usize = 64;

/// Decode one line of a keys file into a signing keypair. Secret material
/// stays in memory only; nothing is written back out.
pub fn parse_credential(line: &str) -> Result<Keypair> {
    let trimmed = line.trim();
    let bytes: Vec<u8> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| Error::InvalidCredential(format!("byte-array literal: {e}")))?
    } else {
        bs58::decode(trimmed).into_vec()?
    };
    if bytes.len() != KEYPAIR_LEN {
        return Err(Error::InvalidCredential(format!(
            "expected {KEYPAIR_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Keypair::from_bytes(&bytes)
        .map_err(|e| Error::InvalidCredential(format!("keypair bytes: {e}")))
}

/// Parse one line of a wallets file into a public key
pub fn parse_address(line: &str) -> Result<Pubkey> {
    let trimmed = line.trim();
    Pubkey::from_str(trimmed).map_err(|e| Error::InvalidAddress(format!("{trimmed}: {e}")))
}

/// Shorten an address for log output, keeping the first and last four
/// characters
pub fn mask(address: &Pubkey) -> String {
    let full = address.to_string();
    if full.len() <= 8 {
        return full;
    }
    format!("{}..{}", &full[..4], &full[full.len() - 4..])
}

/// A signed-off transfer: built once the sendable amount is known to be
/// positive, then submitted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    pub from: Pubkey,
    pub to: Pubkey,
    pub lamports: u64,
}

impl TransferIntent {
    /// Construct an intent; a zero amount is rejected here so no workflow
    /// can submit an empty transfer.
    pub fn new(from: Pubkey, to: Pubkey, lamports: u64) -> Result<Self> {
        if lamports == 0 {
            return Err(Error::InvalidArgument(
                "transfer amount must be positive".to_string(),
            ));
        }
        Ok(Self { from, to, lamports })
    }

    /// Presentation-only conversion; all arithmetic stays in lamports
    pub fn amount_sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }
}
