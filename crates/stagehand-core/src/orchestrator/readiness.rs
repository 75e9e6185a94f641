//! Fixed-interval readiness polling with an overall deadline.

use std::time::Duration;

use log::debug;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    cluster::{ClusterHandle, ReadinessQuery},
    error::StepError,
};

/// The error reported when `query` did not hold within `timeout`.
pub(crate) fn timed_out(query: &ReadinessQuery, timeout: Duration) -> StepError {
    StepError::ReadinessTimeout {
        selector: query.selector.clone(),
        timeout,
    }
}

/// Polls `query` every `interval` until it holds, `deadline` passes, or the
/// run is cancelled. `timeout` only names the budget in the error.
///
/// A failing status query counts as "not ready yet". An expired deadline is
/// terminal. Cancellation wins over a status query that completes at the
/// same time.
pub(crate) async fn wait_ready(
    cluster: &dyn ClusterHandle,
    query: &ReadinessQuery,
    deadline: Instant,
    timeout: Duration,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<(), StepError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let probe = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(StepError::Cancelled),
            () = sleep_until(deadline) => return Err(timed_out(query, timeout)),
            probe = cluster.is_ready(query) => probe,
        };

        match probe {
            Ok(true) => {
                debug!("{query} ready after {attempt} attempt(s)");
                return Ok(());
            }
            Ok(false) => debug!("{query} not ready (attempt {attempt})"),
            Err(err) => debug!("Readiness query for {query} failed (attempt {attempt}): {err}"),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out(query, timeout));
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(StepError::Cancelled),
            () = sleep(interval.min(deadline - now)) => {}
        }
    }
}
