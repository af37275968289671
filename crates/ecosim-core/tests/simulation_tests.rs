//! End-to-end tick cycle tests: starvation, predation, resets, raster sync,
//! and world invariants under random movement.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use ecosim_core::clock::ManualClock;
use ecosim_core::config::SimulationConfig;
use ecosim_core::decision::{
    DecisionError, DecisionRequest, DecisionSource, RandomWalkDecisionSource, StubDecisionSource,
};
use ecosim_core::operator::OperatorState;
use ecosim_core::scheduler::{TickCallback, TickScheduler};
use ecosim_core::tick::{SimulationState, TickSummary, run_tick};
use ecosim_types::{
    AxisCommand, Cell, EntityId, MoveAction, RewardReason, Role, Signal, TerminalCause,
};

fn empty_state(width: u32, height: u32) -> SimulationState {
    let yaml = format!(
        "world: {{ width: {width}, height: {height} }}\npopulation: {{ starting: {{}}, floors: {{}} }}\n"
    );
    let config = SimulationConfig::parse(&yaml).unwrap();
    SimulationState::from_config(&config, true).unwrap()
}

/// Replays a fixed action per entity; everything else stays.
#[derive(Default)]
struct Scripted {
    actions: BTreeMap<EntityId, MoveAction>,
    signals: Vec<Signal>,
}

impl DecisionSource for Scripted {
    fn decide<'a>(
        &'a mut self,
        request: &'a DecisionRequest<'a>,
    ) -> BoxFuture<'a, Result<MoveAction, DecisionError>> {
        let action = self
            .actions
            .get(&request.entity)
            .copied()
            .unwrap_or(MoveAction::STAY);
        Box::pin(async move { Ok(action) })
    }

    fn deliver(&mut self, signal: &Signal) {
        self.signals.push(signal.clone());
    }
}

const RIGHT: MoveAction = MoveAction::new(AxisCommand::Increase, AxisCommand::Stay);

#[tokio::test]
async fn idle_grazer_starves_on_tick_two_hundred() {
    let mut state = empty_state(10, 10);
    let id = state
        .world
        .try_spawn(Role::Grazer, Cell::new(2, 2))
        .unwrap()
        .unwrap();
    let mut source = Scripted::default();

    for _ in 0..199 {
        let summary = run_tick(&mut state, &mut source).await.unwrap();
        assert_eq!(summary.starvations, 0);
    }
    assert!(state.world.entity(id).is_some());
    assert!(
        !source
            .signals
            .iter()
            .any(|s| matches!(s, Signal::Terminated { .. }))
    );

    let summary = run_tick(&mut state, &mut source).await.unwrap();
    assert_eq!(summary.starvations, 1);
    assert!(state.world.entity(id).is_none());
    assert!(source.signals.contains(&Signal::Terminated {
        entity: id,
        cause: TerminalCause::Starvation,
    }));
    state.world.check_consistency().unwrap();
}

#[tokio::test]
async fn predator_consumes_grazer() {
    let mut state = empty_state(10, 10);
    let predator = state
        .world
        .try_spawn(Role::Predator, Cell::new(2, 2))
        .unwrap()
        .unwrap();
    let grazer = state
        .world
        .try_spawn(Role::Grazer, Cell::new(3, 2))
        .unwrap()
        .unwrap();
    state.world.drain_signals();

    let mut source = Scripted::default();
    source.actions.insert(predator, RIGHT);
    let summary = run_tick(&mut state, &mut source).await.unwrap();

    assert_eq!(summary.predations, 1);
    assert_eq!(summary.decisions, 1);
    assert!(state.world.entity(grazer).is_none());
    assert_eq!(state.world.entity(predator).unwrap().cell, Cell::new(3, 2));
    assert!(source.signals.contains(&Signal::Terminated {
        entity: grazer,
        cause: TerminalCause::Predation,
    }));
    assert!(source.signals.iter().any(|s| matches!(
        s,
        Signal::Reward { entity, reason: RewardReason::Feeding, .. } if *entity == predator
    )));
    state.world.check_consistency().unwrap();
}

#[tokio::test]
async fn grazer_blocked_by_occupied_cell() {
    let mut state = empty_state(10, 10);
    let grazer = state
        .world
        .try_spawn(Role::Grazer, Cell::new(2, 2))
        .unwrap()
        .unwrap();
    let predator = state
        .world
        .try_spawn(Role::Predator, Cell::new(3, 2))
        .unwrap()
        .unwrap();

    let mut source = Scripted::default();
    source.actions.insert(grazer, RIGHT);
    let summary = run_tick(&mut state, &mut source).await.unwrap();

    assert_eq!(summary.moves, 0);
    assert_eq!(summary.rejections, 2);
    assert_eq!(state.world.entity(grazer).unwrap().cell, Cell::new(2, 2));
    assert_eq!(state.world.entity(predator).unwrap().cell, Cell::new(3, 2));
    let idle = state.world.settings(Role::Grazer).idle_energy_cost;
    let energy = state.world.entity(grazer).unwrap().energy;
    assert!((energy - (1.0 - idle)).abs() < 1e-12);
}

#[tokio::test]
async fn floors_fill_distinct_cells() {
    let config = SimulationConfig::parse(
        "world: { width: 10, height: 10 }\npopulation: { starting: {}, floors: { grazer: 10, predator: 10 } }\n",
    )
    .unwrap();
    let mut state = SimulationState::from_config(&config, false).unwrap();
    let mut source = StubDecisionSource::new();
    let summary = run_tick(&mut state, &mut source).await.unwrap();
    assert_eq!(summary.spawned.grazers, 10);
    assert_eq!(summary.spawned.predators, 10);
    assert_eq!(state.world.grid().occupied_cells(), 20);
    state.world.check_consistency().unwrap();
}

#[tokio::test]
async fn reset_restores_baseline_and_counter() {
    let config = SimulationConfig::parse(
        r"
world: { width: 12, height: 12, max_ticks: 5 }
population:
  starting: { grazer: 4, predator: 3 }
  floors: { grazer: 6 }
",
    )
    .unwrap();
    let mut state = SimulationState::from_config(&config, true).unwrap();
    let mut source = StubDecisionSource::new();
    for _ in 0..5 {
        let summary = run_tick(&mut state, &mut source).await.unwrap();
        assert!(!summary.reset);
    }
    assert_eq!(state.world.population().grazers, 6);

    let summary = run_tick(&mut state, &mut source).await.unwrap();
    assert!(summary.reset);
    assert_eq!(summary.tick, 0);
    assert_eq!(summary.population.grazers, 4);
    assert_eq!(summary.population.predators, 3);
    assert_eq!(state.counter.tick(), 1);
    state.world.check_consistency().unwrap();
}

#[tokio::test]
async fn raster_sync_is_idempotent() {
    let mut state = empty_state(8, 8);
    state.world.try_spawn(Role::Hunter, Cell::new(1, 1)).unwrap();
    let mut source = StubDecisionSource::new();
    let summary = run_tick(&mut state, &mut source).await.unwrap();
    assert_eq!(summary.cells_synced, 1);
    assert_eq!(state.world.sync_raster(state.raster.as_mut()), 0);
    let raster = state.raster.as_ref().unwrap();
    assert_ne!(raster.pixel(Cell::new(1, 1)), raster.pixel(Cell::new(0, 0)));
}

#[tokio::test]
async fn random_walk_preserves_invariants() {
    let config = SimulationConfig::parse(
        r"
world: { width: 16, height: 16, seed: 7, max_ticks: 150 }
population:
  starting: { grazer: 20, predator: 8, hunter: 4 }
  floors: { grazer: 10, predator: 5, hunter: 2 }
  max_population: 60
",
    )
    .unwrap();
    let mut state = SimulationState::from_config(&config, true).unwrap();
    state
        .population
        .seed_baseline(&mut state.world)
        .unwrap();
    let mut source = RandomWalkDecisionSource::new(11);

    for _ in 0..400 {
        run_tick(&mut state, &mut source).await.unwrap();
        state.world.check_consistency().unwrap();
        assert!(state.world.population().total() <= 60);
        assert!(state.world.dirty().is_synced());
        for record in state.world.registry().records() {
            let settings = state.world.settings(record.role);
            assert!(record.energy > 0.0 && record.energy <= settings.max_energy);
            assert!(record.reproduction_progress >= 0.0);
            assert!(record.reproduction_progress <= settings.reproduction_required);
        }
    }
}

struct StopAt {
    target: u64,
    operator: Arc<OperatorState>,
    last: Option<TickSummary>,
}

impl TickCallback for StopAt {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        state.world.check_consistency().unwrap();
        if state.counter.tick() >= self.target {
            self.operator.request_stop();
        }
        self.last = Some(summary.clone());
    }
}

#[tokio::test]
async fn scheduler_runs_until_stopped() {
    let config = SimulationConfig::parse(
        "world: { width: 10, height: 10 }\npopulation: { starting: { grazer: 5, predator: 5 } }\n",
    )
    .unwrap();
    let state = SimulationState::from_config(&config, true).unwrap();
    let operator = Arc::new(OperatorState::new(config.world.tick_interval_ms));
    let clock = ManualClock::new();
    let mut scheduler = TickScheduler::new(state, clock.clone(), Arc::clone(&operator));
    let mut source = RandomWalkDecisionSource::new(3);
    let mut callback = StopAt {
        target: 25,
        operator: Arc::clone(&operator),
        last: None,
    };

    let report = scheduler.run(&mut source, &mut callback).await.unwrap();
    assert_eq!(report.ticks_run, 25);
    assert_eq!(clock.waits(), 25);
    assert_eq!(operator.tick(), 25);
    assert_eq!(callback.last.unwrap().tick, 24);
}
