//! Process-wide spacing of outbound calls.
//!
//! [`RateLimiter::wait_for_slot`] serializes the *start* of outbound calls:
//! each granted slot begins at least `min_interval` after the previous one,
//! no matter how many workers are waiting. The lock is held while sleeping
//! and released before the caller makes its request, so slow calls never
//! block unrelated workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::{self, Instant};
use tracing::trace;

use super::shutdown;
use crate::error::{Error, Result};

/// Default spacing, chosen to stay under testnet request weights.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Minimum-interval gate shared by every worker in a run.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_slot: Mutex<Option<Instant>>,
    calls: AtomicU64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_slot: Mutex::new(None),
            calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a slot is free, claim it and return its sequence number.
    ///
    /// Never fails; it can only delay. Waiters are served in lock order.
    pub async fn wait_for_slot(&self) -> u64 {
        let mut last_slot = self.last_slot.lock().await;

        if let Some(previous) = *last_slot {
            let ready_at = previous + self.min_interval;
            if Instant::now() < ready_at {
                trace!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Waiting for rate limit slot"
                );
                time::sleep_until(ready_at).await;
            }
        }

        *last_slot = Some(Instant::now());
        // Incremented under the slot lock so counts match granted slots.
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(call, "Rate limit slot granted");
        call
    }

    /// Like [`Self::wait_for_slot`], but returns [`Error::Cancelled`] as soon
    /// as `shutdown` fires. A cancelled waiter claims no slot.
    pub async fn wait_for_slot_or_cancel(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<u64> {
        if shutdown::is_requested(shutdown) {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            () = shutdown::requested(shutdown) => Err(Error::Cancelled),
            call = self.wait_for_slot() => Ok(call),
        }
    }

    /// Number of slots granted since construction or the last reset.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Zero the call counter. Spacing state is left untouched.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_slot_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();
        assert_eq!(limiter.wait_for_slot().await, 1);
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_slots_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        let start = Instant::now();
        limiter.wait_for_slot().await;
        limiter.wait_for_slot().await;
        limiter.wait_for_slot().await;
        assert!(Instant::now() - start >= Duration::from_secs(4));
        assert_eq!(limiter.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_when_interval_already_elapsed() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        limiter.wait_for_slot().await;
        time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        limiter.wait_for_slot().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_waiters_never_share_a_slot() {
        let interval = Duration::from_millis(500);
        let limiter = Arc::new(RateLimiter::new(interval));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.wait_for_slot().await;
                Instant::now()
            }));
        }

        let mut granted = Vec::new();
        for handle in handles {
            granted.push(handle.await.unwrap());
        }
        granted.sort();
        for pair in granted.windows(2) {
            assert!(pair[1] - pair[0] >= interval, "slots closer than interval");
        }
        assert_eq!(limiter.call_count(), 16);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_count_but_keeps_spacing() {
        let limiter = RateLimiter::new(Duration::from_secs(2));
        limiter.wait_for_slot().await;
        limiter.reset();
        assert_eq!(limiter.call_count(), 0);

        let before = Instant::now();
        limiter.wait_for_slot().await;
        assert!(Instant::now() - before >= Duration::from_secs(2));
        assert_eq!(limiter.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_releases_waiter_without_claiming_slot() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60)));
        limiter.wait_for_slot().await;

        let (tx, mut rx) = watch::channel(false);
        let waiter = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.wait_for_slot_or_cancel(&mut rx).await })
        };
        time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(limiter.call_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn parallel_callers_never_lose_a_count() {
        let limiter = Arc::new(RateLimiter::new(Duration::ZERO));
        let mut handles = Vec::new();
        for _ in 0..64 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                let mut calls = Vec::with_capacity(10);
                for _ in 0..10 {
                    calls.push(limiter.wait_for_slot().await);
                }
                calls
            }));
        }

        let mut calls = Vec::new();
        for handle in handles {
            calls.extend(handle.await.unwrap());
        }
        calls.sort_unstable();
        assert_eq!(calls, (1..=640).collect::<Vec<u64>>());
        assert_eq!(limiter.call_count(), 640);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn parallel_callers_are_spaced() {
        let interval = Duration::from_millis(10);
        let limiter = Arc::new(RateLimiter::new(interval));
        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                for _ in 0..4 {
                    limiter.wait_for_slot().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(limiter.call_count(), 32);
        assert!(start.elapsed() >= interval * 31);
    }

    #[tokio::test]
    async fn zero_interval_does_not_throttle() {
        let limiter = RateLimiter::new(Duration::ZERO);
        for _ in 0..100 {
            limiter.wait_for_slot().await;
        }
        assert_eq!(limiter.call_count(), 100);
    }
}
