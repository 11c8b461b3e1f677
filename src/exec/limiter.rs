//! Bounded-concurrency fan-out over a list of inputs.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

/// Run `task` over every input with at most `limit` tasks unresolved at any
/// moment. New tasks are dispatched as soon as a slot frees up, so the
/// window stays full until the inputs run out.
///
/// The returned vector matches the input order regardless of completion
/// order: slot `i` holds `Some(result)` for input `i`, or `None` when that
/// task failed. One failing task never aborts the run; the task itself is
/// responsible for logging its failure before returning `Err`. A `limit`
/// of zero is treated as one; a limit at or above `inputs.len()` is
/// effectively unbounded.
pub async fn run_bounded<T, R, E, F, Fut>(inputs: Vec<T>, limit: usize, task: F) -> Vec<Option<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<R, E>>,
{
    let limit = limit.max(1);
    let mut results: Vec<Option<R>> = Vec::with_capacity(inputs.len());
    results.resize_with(inputs.len(), || None);

    let mut pending = inputs.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();

    loop {
        while in_flight.len() < limit {
            match pending.next() {
                | Some((index, input)) => {
                    let fut = task(input);
                    in_flight.push(async move { (index, fut.await) });
                }
                | None => break,
            }
        }
        match in_flight.next().await {
            | Some((index, Ok(result))) => results[index] = Some(result),
            | Some((_index, Err(_))) => {} // slot stays None, run continues
            | None => break,               // all inputs dispatched and resolved
        }
    }

    results
}
