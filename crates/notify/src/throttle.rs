use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;
use wxnotify_core::notify::port::Throttle;

/// # Summary
/// Enforces a minimum interval between consecutive remote calls.
///
/// # Invariants
/// - The first call never waits.
/// - Share one instance (behind an `Arc`) between adapters that use the same credential.
pub struct IntervalThrottle {
    /// Minimum spacing between two calls.
    interval: Duration,
    /// When the previous call was released.
    last: Mutex<Option<Instant>>,
}

impl IntervalThrottle {
    /// # Summary
    /// Creates a new `IntervalThrottle`.
    ///
    /// # Arguments
    /// * `interval` - Minimum spacing; `Duration::ZERO` disables throttling.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Throttle for IntervalThrottle {
    /// # Summary
    /// Waits until `interval` has passed since the previous release.
    ///
    /// # Logic
    /// 1. Holds the lock for the whole wait so concurrent callers queue up in order.
    /// 2. Sleeps for the remaining part of the interval, if any.
    /// 3. Records the release time.
    async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let remaining = self.interval - elapsed;
                debug!("Throttling for {:?}", remaining);
                sleep(remaining).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let throttle = IntervalThrottle::new(Duration::from_secs(5));
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_waits_remaining_interval() {
        let throttle = IntervalThrottle::new(Duration::from_secs(5));
        throttle.wait().await;

        tokio::time::advance(Duration::from_secs(2)).await;
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_elapsed() {
        let throttle = IntervalThrottle::new(Duration::from_millis(100));
        throttle.wait().await;

        tokio::time::advance(Duration::from_secs(1)).await;
        let start = Instant::now();
        throttle.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
