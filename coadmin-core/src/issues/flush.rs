//! Waiting for the delivery queue to drain
//!
//! "Flushed" means the worker has taken every report off the queue. Whether the
//! HTTP call for the last report succeeded is not observed here.

use std::time::{Duration, Instant};

use super::queue::DeliveryQueue;

/// How often the queue length is sampled
pub const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Block until `queue` is empty (true) or `max_wait` elapses (false).
///
/// Samples once immediately, then every [`FLUSH_POLL_INTERVAL`], and a final
/// time at the deadline. A `max_wait` too large to add to the current instant
/// (e.g. `Duration::MAX`) waits without a deadline.
pub fn wait_until_empty(queue: &DeliveryQueue, max_wait: Duration) -> bool {
    let deadline = Instant::now().checked_add(max_wait);
    loop {
        if queue.is_empty() {
            tracing::debug!("Delivery queue flushed");
            return true;
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::debug!(pending = queue.len(), ?max_wait, "Timed out waiting for flush");
                    return false;
                }
                FLUSH_POLL_INTERVAL.min(deadline - now)
            }
            None => FLUSH_POLL_INTERVAL,
        };
        std::thread::sleep(pause);
    }
}

/// Async form of [`wait_until_empty`] for callers inside a tokio runtime.
pub async fn wait_until_empty_async(queue: &DeliveryQueue, max_wait: Duration) -> bool {
    let deadline = tokio::time::Instant::now().checked_add(max_wait);
    loop {
        if queue.is_empty() {
            tracing::debug!("Delivery queue flushed");
            return true;
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = tokio::time::Instant::now();
                if now >= deadline {
                    tracing::debug!(pending = queue.len(), ?max_wait, "Timed out waiting for flush");
                    return false;
                }
                FLUSH_POLL_INTERVAL.min(deadline - now)
            }
            None => FLUSH_POLL_INTERVAL,
        };
        tokio::time::sleep(pause).await;
    }
}
