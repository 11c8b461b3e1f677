//! Deadline racing for submit-and-wait operations.

use std::future::Future;
use std::time::Duration;

use crate::utils::error::{Error, Result};

/// Race `operation` against a wall-clock deadline; whichever settles first
/// wins.
///
/// The losing branch is abandoned, not force-cancelled: dropping the
/// polling future stops our observation, but a remote effect already in
/// flight may still complete out-of-band with its result discarded. On the
/// operation-wins path the timer is dropped with the race, so no timer
/// resource outlives the call. A deadline loss surfaces as
/// [`Error::ConfirmationTimeout`], which callers must log as
/// outcome-unknown rather than as a negative result.
pub async fn within_deadline<T, Fut>(deadline: Duration, operation: Fut) -> Result<T>
where
    Fut: Future<Output = T>,
{
    match tokio::time::timeout(deadline, operation).await {
        | Ok(value) => Ok(value),
        | Err(_elapsed) => Err(Error::ConfirmationTimeout { after: deadline }),
    }
}
