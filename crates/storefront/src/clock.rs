//! Clock abstraction for testable time.
//!
//! The scheduler and verification authority never call `Utc::now()` or
//! `tokio::time::sleep` directly; they go through a [`Clock`] so tests can
//! drive the 09:00/14:00 and code-expiry logic with tokio's paused time
//! instead of real wall-clock waits.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::future::Future;

/// Source of the current time and of deferred wakeups.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Complete once `deadline` is reached on this clock's timeline.
    ///
    /// The deadline is absolute: the future fires at the right instant even
    /// when it is first polled after the clock has already moved past it,
    /// in which case it completes immediately.
    fn sleep_until(&self, deadline: DateTime<Utc>) -> impl Future<Output = ()> + Send;
}

/// Production clock: wall time and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) -> impl Future<Output = ()> + Send {
        let delay = (deadline - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(delay)
    }
}

/// Deterministic clock for tests.
///
/// Anchors a fixed epoch to the tokio timeline, so under
/// `#[tokio::test(start_paused = true)]` both `now()` and pending timers
/// move together when the test advances time.
#[derive(Debug, Clone, Copy)]
pub struct TestClock {
    epoch: DateTime<Utc>,
    started: tokio::time::Instant,
}

impl TestClock {
    /// Create a clock that reads `epoch` at the moment of construction.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed =
            ChronoDuration::from_std(self.started.elapsed()).unwrap_or(ChronoDuration::MAX);
        self.epoch + elapsed
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) -> impl Future<Output = ()> + Send {
        // Anchored to the fixed start instant, not to the poll time, so the
        // tokio deadline stays absolute no matter when the future is built.
        let offset = (deadline - self.epoch).to_std().unwrap_or_default();
        tokio::time::sleep_until(self.started + offset)
    }
}
