//! Tick callback that refreshes the Observer API snapshot.

use std::sync::Arc;

use ecosim_core::scheduler::TickCallback;
use ecosim_core::tick::{SimulationState, TickSummary};
use ecosim_observer::state::AppState;
use tracing::{debug, info};

/// Ticks between `info`-level population summaries.
const SUMMARY_LOG_INTERVAL: u64 = 1000;

/// Bridges the tick loop to the Observer API.
pub struct ObserverCallback {
    state: Option<Arc<AppState>>,
    skipped: u64,
}

impl ObserverCallback {
    /// Publish into `state`; `None` keeps only the periodic log.
    pub const fn new(state: Option<Arc<AppState>>) -> Self {
        Self { state, skipped: 0 }
    }

    /// Refresh the snapshot without a tick summary (used right after start).
    pub fn publish_initial(&mut self, sim: &SimulationState) {
        self.publish(None, sim);
    }

    /// Snapshot refreshes skipped because a reader held the lock.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    fn publish(&mut self, summary: Option<&TickSummary>, sim: &SimulationState) {
        let Some(state) = &self.state else {
            return;
        };
        // A held read lock skips this refresh; the next tick catches up.
        if let Ok(mut snapshot) = state.snapshot.try_write() {
            snapshot.refresh(summary, sim);
        } else {
            self.skipped = self.skipped.saturating_add(1);
            debug!(tick = sim.counter.tick(), "observer snapshot busy, refresh skipped");
        }
    }
}

impl TickCallback for ObserverCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        self.publish(Some(summary), sim);

        let on_interval = sim
            .counter
            .tick()
            .checked_rem(SUMMARY_LOG_INTERVAL)
            .is_some_and(|r| r == 0);
        if summary.reset || on_interval {
            info!(
                tick = summary.tick,
                reset = summary.reset,
                grazers = summary.population.grazers,
                predators = summary.population.predators,
                hunters = summary.population.hunters,
                "population summary"
            );
        }
    }
}
