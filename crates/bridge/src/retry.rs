//! Retry policy
//!
//! Bridge requests retry locally on transport failure up to a per-call
//! cap, separated by a fixed throttle, matching the bridge's own retry
//! policy for the frame-add (24) and file-entry (6) requests. Each retry
//! attempt is cancelable; cancelling aborts the in-flight request and
//! resets the attempt counter for whoever calls again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

pub const DEFAULT_BRIDGE_RETRIES: u32 = 3;
pub const FRAME_ADD_RETRIES: u32 = 24;
pub const FILE_ENTRY_RETRIES: u32 = 6;
pub const DEFAULT_RETRY_THROTTLE: Duration = Duration::from_millis(500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared cancellation flag for one in-flight (possibly retrying)
/// request. Cloning shares the same underlying flag.
#[derive(Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Run `attempt` up to `max_retries + 1` times total, separated by
/// `throttle`, stopping early on a non-retryable error or cancellation.
/// `attempt` is given the current try index (0-based) so callers can
/// reuse the same pointer/resource across retries where the spec
/// requires it (shard upload retries reuse the same pointer).
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    throttle: Duration,
    cancel: &CancelHandle,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = BridgeError::Cancelled;
    for try_index in 0..=max_retries {
        if cancel.is_cancelled() {
            return Err(BridgeError::Cancelled);
        }
        match attempt(try_index).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                warn!(try_index, error = %err, "bridge request failed, will retry");
                last_err = err;
                if try_index < max_retries {
                    tokio::time::sleep(throttle).await;
                }
            }
        }
    }
    debug!(attempts = max_retries + 1, "bridge retries exhausted");
    Err(BridgeError::RetriesExhausted { attempts: max_retries + 1, last: last_err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn test_succeeds_on_first_try() {
        let cancel = CancelHandle::new();
        let calls = AtomicU32::new(0);
        let result = with_retry(3, Duration::from_millis(1), &cancel, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, BridgeError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let cancel = CancelHandle::new();
        let calls = AtomicU32::new(0);
        let result = with_retry(3, Duration::from_millis(1), &cancel, |try_index| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if try_index < 2 {
                    Err(BridgeError::Timeout)
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_retries() {
        let cancel = CancelHandle::new();
        let result: Result<i32> =
            with_retry(2, Duration::from_millis(1), &cancel, |_| async { Err(BridgeError::Timeout) }).await;
        assert!(matches!(result, Err(BridgeError::RetriesExhausted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let cancel = CancelHandle::new();
        let calls = AtomicU32::new(0);
        let result: Result<i32> = with_retry(5, Duration::from_millis(1), &cancel, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(BridgeError::Http { status: 404, body: "nope".into() }) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_short_circuits() {
        let cancel = CancelHandle::new();
        cancel.cancel();
        let result: Result<i32> = with_retry(5, Duration::from_millis(1), &cancel, |_| async { Ok(1) }).await;
        assert!(matches!(result, Err(BridgeError::Cancelled)));
    }
}
