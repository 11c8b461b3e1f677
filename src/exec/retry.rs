//! Bounded exponential backoff for rate-limited remote calls.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::rpc::RpcFailure;
use crate::utils::error::{Error, Result};

/// Attempt bound and first delay for one retried call. The delay doubles on
/// every retry; the state lives entirely inside one [`with_backoff`] call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Hard bound on total attempts, including the first
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
        }
    }
}

/// Invoke `op` until it succeeds, fails with a non-retryable error, or the
/// attempt bound is reached.
///
/// Only [`RpcFailure::RateLimited`] triggers a retry; anything else
/// propagates on the spot. A rate-limited failure on the final permitted
/// attempt surfaces as [`Error::RetryExhausted`], so the loop can never run
/// unbounded.
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RpcFailure>>,
{
    let max_attempts = policy.max_retries.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            | Ok(value) => return Ok(value),
            | Err(RpcFailure::RateLimited(message)) => {
                if attempt >= max_attempts {
                    return Err(Error::RetryExhausted {
                        attempts: attempt,
                        last: message,
                    });
                }
                warn!(
                    "rate limited (attempt {attempt}/{max_attempts}), backing off {}ms: {message}",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            | Err(failure) => return Err(failure.into()),
        }
    }
}
