//! Unit deadlines that stand still while a body queues for a pacing slot.
//!
//! A body that calls [`UnitContext::throttle`](super::unit::UnitContext::throttle)
//! may wait behind every other worker before its next call. That wait is
//! harness pacing, not unit work, so [`UnitDeadline::run`] extends the
//! deadline by every completed pause and never expires during one.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{self, Instant};

#[derive(Debug, Default)]
struct PauseState {
    active: usize,
    since: Option<Instant>,
    paused: Duration,
}

/// Timeout budget for one unit body, shared with its context.
#[derive(Debug, Default)]
pub struct UnitDeadline {
    state: Mutex<PauseState>,
    resumed: Notify,
}

/// Keeps the deadline paused until dropped.
#[must_use = "the deadline resumes as soon as the guard is dropped"]
pub struct PauseGuard {
    deadline: Arc<UnitDeadline>,
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.deadline.resume();
    }
}

impl UnitDeadline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the clock until the returned guard is dropped.
    ///
    /// Overlapping pauses count once.
    pub fn pause(self: &Arc<Self>) -> PauseGuard {
        let mut state = self.state.lock();
        if state.active == 0 {
            state.since = Some(Instant::now());
        }
        state.active += 1;
        PauseGuard {
            deadline: Arc::clone(self),
        }
    }

    fn resume(&self) {
        {
            let mut state = self.state.lock();
            state.active = state.active.saturating_sub(1);
            if state.active > 0 {
                return;
            }
            if let Some(since) = state.since.take() {
                state.paused += since.elapsed();
            }
        }
        self.resumed.notify_waiters();
    }

    /// Total time spent in completed pauses.
    #[must_use]
    pub fn paused(&self) -> Duration {
        self.state.lock().paused
    }

    fn is_paused(&self) -> bool {
        self.state.lock().active > 0
    }

    /// Drive `fut` until it finishes or `budget` of unpaused time elapses.
    ///
    /// Returns `None` on expiry; `fut` is dropped at that point.
    pub async fn run<F: Future>(&self, budget: Duration, fut: F) -> Option<F::Output> {
        let started = Instant::now();
        let mut fut = std::pin::pin!(fut);
        loop {
            let resumed = self.resumed.notified();
            let mut resumed = std::pin::pin!(resumed);
            resumed.as_mut().enable();

            if self.is_paused() {
                tokio::select! {
                    output = &mut fut => return Some(output),
                    () = &mut resumed => {}
                }
                continue;
            }

            let deadline = started + budget + self.paused();
            tokio::select! {
                output = &mut fut => return Some(output),
                () = time::sleep_until(deadline) => {
                    let extended = started + budget + self.paused();
                    if !self.is_paused() && Instant::now() >= extended {
                        return None;
                    }
                }
            }
        }
    }
}
