//! Tick scheduler: the state machine that drives a run.
//!
//! States are `Idle -> Running -> Stopped`. [`TickScheduler::start`] seeds
//! the baseline population and performs an initial raster sync.
//! [`TickScheduler::run`] then loops: wait on the injected [`TickClock`],
//! run one tick, notify the [`TickCallback`]. The operator's stop flag is
//! checked between iterations only; a tick in progress always completes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use ecosim_types::PopulationCounts;

use crate::clock::TickClock;
use crate::decision::DecisionSource;
use crate::operator::OperatorState;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// The requested operation is not valid in the current state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        /// The attempted operation.
        action: &'static str,
        /// The scheduler state at the time.
        state: SchedulerState,
    },
}

impl From<ecosim_world::WorldError> for SchedulerError {
    fn from(source: ecosim_world::WorldError) -> Self {
        Self::Tick {
            source: TickError::from(source),
        }
    }
}

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Created, not yet seeded.
    Idle,
    /// Seeded and ticking.
    Running,
    /// Shut down; no further ticks.
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Outcome of [`TickScheduler::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Ticks executed by this call.
    pub ticks_run: u64,
    /// The last tick summary, if any tick ran.
    pub last_summary: Option<TickSummary>,
}

/// Drives a [`SimulationState`] at the operator's cadence.
pub struct TickScheduler<C> {
    state: SimulationState,
    clock: C,
    operator: Arc<OperatorState>,
    phase: SchedulerState,
}

impl<C: TickClock> TickScheduler<C> {
    /// Create an idle scheduler.
    pub const fn new(state: SimulationState, clock: C, operator: Arc<OperatorState>) -> Self {
        Self {
            state,
            clock,
            operator,
            phase: SchedulerState::Idle,
        }
    }

    /// Current lifecycle state.
    pub const fn phase(&self) -> SchedulerState {
        self.phase
    }

    /// The simulation state, read-only.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The simulation state, mutable. Intended for setup before `start`.
    pub const fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    /// Shared operator state.
    pub const fn operator(&self) -> &Arc<OperatorState> {
        &self.operator
    }

    /// Seed the baseline population, sync the raster, and enter `Running`.
    pub fn start(&mut self) -> Result<PopulationCounts, SchedulerError> {
        if self.phase != SchedulerState::Idle {
            return Err(SchedulerError::InvalidState {
                action: "start",
                state: self.phase,
            });
        }
        let seeded = self.state.population.seed_baseline(&mut self.state.world)?;
        let synced = self.state.world.sync_raster(self.state.raster.as_mut());
        self.phase = SchedulerState::Running;
        info!(
            run_id = %self.operator.run_id(),
            total = seeded.total(),
            cells_synced = synced,
            "scheduler started"
        );
        Ok(seeded)
    }

    /// Run exactly one tick without waiting on the clock.
    pub async fn step(
        &mut self,
        decision_source: &mut dyn DecisionSource,
    ) -> Result<TickSummary, SchedulerError> {
        if self.phase != SchedulerState::Running {
            return Err(SchedulerError::InvalidState {
                action: "step",
                state: self.phase,
            });
        }
        let summary = tick::run_tick(&mut self.state, decision_source).await?;
        self.operator.record_tick(self.state.counter.tick());
        if summary.reset {
            self.operator.record_reset();
        }
        Ok(summary)
    }

    /// Tick until the operator requests a stop, then enter `Stopped`.
    ///
    /// An idle scheduler is started first.
    pub async fn run(
        &mut self,
        decision_source: &mut dyn DecisionSource,
        callback: &mut dyn TickCallback,
    ) -> Result<RunReport, SchedulerError> {
        if self.phase == SchedulerState::Idle {
            self.start()?;
        }
        let mut report = RunReport {
            ticks_run: 0,
            last_summary: None,
        };
        info!(
            tick_interval_ms = self.operator.tick_interval_ms(),
            max_ticks = self.state.counter.max_ticks(),
            "simulation loop starting"
        );

        loop {
            if self.operator.is_stop_requested() {
                break;
            }
            let interval = Duration::from_millis(self.operator.tick_interval_ms());
            tokio::select! {
                () = self.clock.wait(interval) => {}
                () = self.operator.stopped() => {}
            }
            if self.operator.is_stop_requested() {
                break;
            }

            let summary = self.step(decision_source).await?;
            callback.on_tick(&summary, &self.state);
            report.ticks_run = report.ticks_run.saturating_add(1);
            report.last_summary = Some(summary);
        }

        self.stop();
        Ok(report)
    }

    /// Enter `Stopped`.
    pub fn stop(&mut self) {
        if self.phase != SchedulerState::Stopped {
            info!(tick = self.state.counter.tick(), "scheduler stopped");
        }
        self.phase = SchedulerState::Stopped;
    }
}
