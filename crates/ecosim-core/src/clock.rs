//! Tick counter and the clock abstraction that paces the scheduler.
//!
//! The counter is the single source of truth for simulation time. It only
//! moves through checked arithmetic and is reset to zero when the tick
//! budget triggers a baseline reset.
//!
//! The scheduler never sleeps directly; it awaits a [`TickClock`]. The
//! production [`IntervalClock`] sleeps on the tokio timer. Tests inject a
//! [`ManualClock`] that returns immediately and records every wait, so
//! ticks can be stepped synchronously.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter with an optional reset budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter {
    tick: u64,
    max_ticks: u64,
}

impl TickCounter {
    /// A counter at zero. `max_ticks == 0` means the budget never runs out.
    pub const fn new(max_ticks: u64) -> Self {
        Self { tick: 0, max_ticks }
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Configured budget.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Advance by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Whether the counter has reached its budget.
    pub const fn budget_exhausted(&self) -> bool {
        self.max_ticks > 0 && self.tick >= self.max_ticks
    }

    /// Return to tick zero.
    pub const fn reset(&mut self) {
        self.tick = 0;
    }
}

/// Paces the scheduler between iterations.
pub trait TickClock: Send {
    /// Wait for `interval` to elapse.
    fn wait(&mut self, interval: Duration) -> BoxFuture<'_, ()>;
}

/// Wall-clock pacing on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalClock;

impl TickClock for IntervalClock {
    fn wait(&mut self, interval: Duration) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        })
    }
}

/// A fake clock that never sleeps and counts how often it was awaited.
///
/// Cloning shares the counter, so a test can keep a handle after moving
/// the clock into a scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    waits: Arc<AtomicU64>,
    waited_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// A fresh clock with no recorded waits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waits so far.
    pub fn waits(&self) -> u64 {
        self.waits.load(Ordering::Acquire)
    }

    /// Total requested wait time in milliseconds.
    pub fn waited_ms(&self) -> u64 {
        self.waited_ms.load(Ordering::Acquire)
    }
}

impl TickClock for ManualClock {
    fn wait(&mut self, interval: Duration) -> BoxFuture<'_, ()> {
        self.waits.fetch_add(1, Ordering::AcqRel);
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self.waited_ms.fetch_add(ms, Ordering::AcqRel);
        Box::pin(async {})
    }
}
