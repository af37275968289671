//! Operator control state shared between the scheduler and the observer.
//!
//! All fields are atomics (or immutable after construction) so the tick
//! loop reads them without locks. Cancellation is cooperative: the
//! scheduler checks the stop flag between iterations, and a pending clock
//! wait is cut short through the stop notification.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use uuid::Uuid;

/// Smallest accepted tick interval in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 1;

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Identifier of this run.
    run_id: Uuid,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes anything waiting for a stop.
    stop_notify: Notify,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Last tick counter value published by the scheduler.
    tick: AtomicU64,

    /// Baseline resets performed so far.
    resets: AtomicU64,

    /// Wall-clock time when the run started.
    started_at: DateTime<Utc>,
}

impl OperatorState {
    /// Create operator state for a new run.
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms: AtomicU64::new(tick_interval_ms.max(MIN_TICK_INTERVAL_MS)),
            tick: AtomicU64::new(0),
            resets: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Identifier of this run.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop and wake any waiter.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolve once a stop has been requested.
    pub async fn stopped(&self) {
        loop {
            let notified = self.stop_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_stop_requested() {
                return;
            }
            notified.await;
        }
    }

    // -----------------------------------------------------------------------
    // Tick speed
    // -----------------------------------------------------------------------

    /// Current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval. Returns the previous interval, or `None` if
    /// `ms` is below [`MIN_TICK_INTERVAL_MS`].
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Publish the scheduler's tick counter.
    pub fn record_tick(&self, tick: u64) {
        self.tick.store(tick, Ordering::Release);
    }

    /// Count one baseline reset.
    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::AcqRel);
    }

    /// Last published tick counter.
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Acquire)
    }

    /// Baseline resets so far.
    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Acquire)
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Elapsed seconds since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Snapshot for the operator API.
    pub fn status(&self) -> SimulationStatus {
        SimulationStatus {
            run_id: self.run_id.to_string(),
            tick: self.tick(),
            resets: self.resets(),
            stop_requested: self.is_stop_requested(),
            tick_interval_ms: self.tick_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// JSON-serializable run status for the operator API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Run identifier.
    pub run_id: String,
    /// Last published tick counter.
    pub tick: u64,
    /// Baseline resets so far.
    pub resets: u64,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// RFC 3339 start timestamp.
    pub started_at: String,
}
