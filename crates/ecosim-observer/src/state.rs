//! Shared application state for the Observer API server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ecosim_core::operator::OperatorState;
use ecosim_core::tick::{SimulationState, TickSummary};
use ecosim_types::PopulationCounts;
use serde::Serialize;
use tokio::sync::RwLock;

/// In-memory copy of the simulation state served by REST endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObserverSnapshot {
    /// Display name of the world.
    pub world_name: String,
    /// Tick counter after the last published tick.
    pub tick: u64,
    /// Live counts per role.
    pub population: PopulationCounts,
    /// Global population ceiling.
    pub population_ceiling: u32,
    /// Raster width in cells.
    pub width: u32,
    /// Raster height in cells.
    pub height: u32,
    /// Row-major RGBA bytes; empty until the first publish with a raster.
    #[serde(skip)]
    pub raster: Vec<u8>,
    /// Dirty-tracker version the copied frame reflects.
    #[serde(skip)]
    pub raster_version: Option<u64>,
    /// Summary of the last completed tick.
    pub last_summary: Option<TickSummary>,
    /// When the snapshot was last refreshed.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ObserverSnapshot {
    /// Refresh from the simulation state after a tick.
    pub fn refresh(&mut self, summary: Option<&TickSummary>, sim: &SimulationState) {
        let bounds = sim.world.bounds();
        self.tick = sim.counter.tick();
        self.population = sim.world.population();
        self.population_ceiling = sim.world.population_ceiling();
        self.width = bounds.width;
        self.height = bounds.height;
        if let Some(raster) = &sim.raster {
            // A pending sync means the buffer lags the world; wait for it.
            let dirty = sim.world.dirty();
            let version = Some(dirty.version());
            if dirty.is_synced() && self.raster_version != version {
                self.raster = raster.to_rgba_bytes();
                self.raster_version = version;
            }
        }
        if let Some(summary) = summary {
            self.last_summary = Some(summary.clone());
        }
        self.updated_at = Some(Utc::now());
    }
}

/// Shared state for the Axum application, injected via `State`.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The current snapshot (updated each tick).
    pub snapshot: Arc<RwLock<ObserverSnapshot>>,
    /// Shared operator control state (present when a simulation is running).
    pub operator_state: Option<Arc<OperatorState>>,
}

impl AppState {
    /// Create application state with an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create application state with operator control attached.
    pub fn with_operator(operator: Arc<OperatorState>) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(ObserverSnapshot::default())),
            operator_state: Some(operator),
        }
    }

    /// Set the world name shown by the status endpoints.
    pub async fn set_world_name(&self, name: &str) {
        self.snapshot.write().await.world_name = name.to_owned();
    }
}
