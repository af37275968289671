//! Tick cycle: one iteration of the simulation.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Population** -- if the tick budget is exhausted, reset the counter
//!    and the population to baseline; otherwise top up every role floor.
//! 2. **Decision and resolution** -- for each entity alive at the start of
//!    this phase, in ascending id order: obtain a move from the
//!    [`DecisionSource`], resolve it, remove the entity if it starved,
//!    otherwise pay the survival reward and apply the reproduction rule.
//!    Signals are delivered after each entity. Entities destroyed earlier
//!    in the phase are skipped; offspring first act next tick.
//! 3. **Raster** -- recolor dirty cells.
//! 4. **Advance** -- increment the tick counter.
//!
//! The cycle is deterministic given the same seed and decision outputs.

use serde::Serialize;
use tracing::{debug, info, warn};

use ecosim_types::{EntityId, MoveAction, MoveOutcome, PopulationCounts, RewardReason, TerminalCause};
use ecosim_world::{
    PopulationController, RasterBuffer, ReproductionOutcome, World, WorldError,
    apply_reproduction, resolve_move, role_rules,
};

use crate::clock::{ClockError, TickCounter};
use crate::config::SimulationConfig;
use crate::decision::{DecisionRequest, DecisionSource};
use crate::observation::ObservationView;

/// Errors that end a tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world invariant was breached.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Counter value when the tick ran (0 right after a reset).
    pub tick: u64,
    /// Whether this tick began with a baseline reset.
    pub reset: bool,
    /// Entities created by top-up or reset.
    pub spawned: PopulationCounts,
    /// Decisions requested.
    pub decisions: u32,
    /// Decision requests that failed and were treated as staying put.
    pub decision_failures: u32,
    /// Successful moves.
    pub moves: u32,
    /// Rejected moves.
    pub rejections: u32,
    /// Prey destroyed.
    pub predations: u32,
    /// Entities removed for energy depletion.
    pub starvations: u32,
    /// Offspring placed.
    pub births: u32,
    /// Raster cells recomputed.
    pub cells_synced: usize,
    /// Live counts at the end of the tick.
    pub population: PopulationCounts,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The world.
    pub world: World,
    /// Floors, baseline, and resets.
    pub population: PopulationController,
    /// Tick counter and reset budget.
    pub counter: TickCounter,
    /// Raster target; `None` makes raster sync a no-op.
    pub raster: Option<RasterBuffer>,
    /// Seconds of simulated time per tick, used by the reproduction rate.
    pub elapsed_per_tick: f64,
}

impl SimulationState {
    /// Build an unseeded state from configuration.
    pub fn from_config(config: &SimulationConfig, with_raster: bool) -> Result<Self, TickError> {
        let params = config.world_params();
        let world = World::new(params)?;
        let raster = with_raster.then(|| RasterBuffer::new(params.bounds));
        #[allow(clippy::cast_precision_loss)]
        let elapsed_per_tick = config.world.tick_interval_ms as f64 / 1000.0;
        Ok(Self {
            world,
            population: PopulationController::new(
                config.population.starting.to_counts(),
                config.population.floors.to_counts(),
                config.population.placement_attempts,
            ),
            counter: TickCounter::new(config.world.max_ticks),
            raster,
            elapsed_per_tick,
        })
    }
}

/// Execute one complete tick.
pub async fn run_tick(
    state: &mut SimulationState,
    decision_source: &mut dyn DecisionSource,
) -> Result<TickSummary, TickError> {
    let mut summary = TickSummary::default();

    // --- Population ---
    if state.counter.budget_exhausted() {
        let max_ticks = state.counter.max_ticks();
        state.counter.reset();
        state.world.set_current_tick(0);
        summary.reset = true;
        summary.spawned = state.population.reset_to_baseline(&mut state.world)?;
        info!(max_ticks, "tick budget exhausted, population reset to baseline");
    } else {
        state.world.set_current_tick(state.counter.tick());
        summary.spawned = state.population.top_up_all(&mut state.world)?;
    }
    deliver_signals(&mut state.world, decision_source);

    let tick = state.counter.tick();
    summary.tick = tick;

    // --- Decision and resolution ---
    for id in state.world.live_ids() {
        if state.world.entity(id).is_none() {
            continue;
        }
        let action = request_decision(state, decision_source, tick, id, &mut summary).await;
        resolve_entity(state, id, action, &mut summary)?;
        deliver_signals(&mut state.world, decision_source);
    }

    // --- Raster ---
    summary.cells_synced = state.world.sync_raster(state.raster.as_mut());

    // --- Advance ---
    state.counter.advance()?;
    summary.population = state.world.population();

    debug!(
        tick,
        grazers = summary.population.grazers,
        predators = summary.population.predators,
        hunters = summary.population.hunters,
        moves = summary.moves,
        predations = summary.predations,
        births = summary.births,
        starvations = summary.starvations,
        cells_synced = summary.cells_synced,
        "tick complete"
    );
    Ok(summary)
}

async fn request_decision(
    state: &SimulationState,
    decision_source: &mut dyn DecisionSource,
    tick: u64,
    entity: EntityId,
    summary: &mut TickSummary,
) -> MoveAction {
    let request = DecisionRequest {
        tick,
        entity,
        view: ObservationView::new(&state.world, state.world.population_ceiling()),
    };
    summary.decisions = summary.decisions.saturating_add(1);
    match decision_source.decide(&request).await {
        Ok(action) => action,
        Err(e) => {
            warn!(tick, entity = %entity, error = %e, "decision failed, staying put");
            summary.decision_failures = summary.decision_failures.saturating_add(1);
            MoveAction::STAY
        }
    }
}

fn resolve_entity(
    state: &mut SimulationState,
    id: EntityId,
    action: MoveAction,
    summary: &mut TickSummary,
) -> Result<(), TickError> {
    let world = &mut state.world;

    match resolve_move(world, id, action)? {
        MoveOutcome::Moved { prey, .. } => {
            summary.moves = summary.moves.saturating_add(1);
            if prey.is_some() {
                summary.predations = summary.predations.saturating_add(1);
            }
        }
        MoveOutcome::Rejected { .. } => {
            summary.rejections = summary.rejections.saturating_add(1);
        }
    }

    let record = world.entity(id).ok_or(WorldError::EntityNotFound(id))?;
    let role = record.role;
    if record.energy <= 0.0 {
        world.remove_entity(id, TerminalCause::Starvation)?;
        summary.starvations = summary.starvations.saturating_add(1);
        return Ok(());
    }

    if role_rules(role).earns_survival_reward {
        let reward = world.settings(role).reward_per_step;
        world.emit_reward(id, reward, RewardReason::Survival);
    }

    if let ReproductionOutcome::Offspring(_) =
        apply_reproduction(world, id, state.elapsed_per_tick)?
    {
        summary.births = summary.births.saturating_add(1);
    }
    Ok(())
}

fn deliver_signals(world: &mut World, decision_source: &mut dyn DecisionSource) {
    for signal in world.drain_signals() {
        decision_source.deliver(&signal);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecosim_types::{Cell, Role, Signal};

    use super::*;
    use crate::decision::StubDecisionSource;

    fn small_config() -> SimulationConfig {
        SimulationConfig::parse(
            r"
world:
  width: 10
  height: 10
  max_ticks: 3
population:
  starting: { grazer: 2, predator: 1 }
  floors: { grazer: 2, predator: 1 }
",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn tick_tops_up_and_advances() {
        let mut state = SimulationState::from_config(&small_config(), true).unwrap();
        let mut source = StubDecisionSource::new();
        let summary = run_tick(&mut state, &mut source).await.unwrap();
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.spawned.grazers, 2);
        assert_eq!(summary.spawned.predators, 1);
        assert_eq!(summary.decisions, 3);
        assert_eq!(summary.rejections, 3);
        assert_eq!(summary.cells_synced, 3);
        assert_eq!(state.counter.tick(), 1);
        state.world.check_consistency().unwrap();
    }

    #[tokio::test]
    async fn exhausted_budget_resets() {
        let mut state = SimulationState::from_config(&small_config(), false).unwrap();
        let mut source = StubDecisionSource::new();
        for _ in 0..3 {
            run_tick(&mut state, &mut source).await.unwrap();
        }
        assert!(state.counter.budget_exhausted());
        let summary = run_tick(&mut state, &mut source).await.unwrap();
        assert!(summary.reset);
        assert_eq!(summary.tick, 0);
        assert_eq!(state.counter.tick(), 1);
        assert_eq!(summary.population.grazers, 2);
    }

    #[derive(Default)]
    struct Recorder {
        asked: Vec<EntityId>,
        signals: Vec<Signal>,
    }

    impl DecisionSource for Recorder {
        fn decide<'a>(
            &'a mut self,
            request: &'a DecisionRequest<'a>,
        ) -> futures::future::BoxFuture<'a, Result<MoveAction, crate::decision::DecisionError>>
        {
            self.asked.push(request.entity);
            Box::pin(async { Ok(MoveAction::STAY) })
        }

        fn deliver(&mut self, signal: &Signal) {
            self.signals.push(signal.clone());
        }
    }

    #[tokio::test]
    async fn decisions_follow_id_order_and_rewards_flow() {
        let config = SimulationConfig::parse(
            "world: { width: 6, height: 6 }\npopulation: { starting: {}, floors: {} }\n",
        )
        .unwrap();
        let mut state = SimulationState::from_config(&config, false).unwrap();
        let b = state.world.try_spawn(Role::Predator, Cell::new(4, 4)).unwrap().unwrap();
        let a = state.world.try_spawn(Role::Grazer, Cell::new(0, 0)).unwrap().unwrap();
        state.world.drain_signals();

        let mut recorder = Recorder::default();
        run_tick(&mut state, &mut recorder).await.unwrap();
        assert_eq!(recorder.asked, vec![b, a]);
        assert!(recorder.signals.iter().any(|s| matches!(
            s,
            Signal::Reward { entity, reason: RewardReason::Survival, .. } if *entity == a
        )));
        assert!(!recorder.signals.iter().any(|s| s.entity() == b));
    }
}
