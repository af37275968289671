//! Decision source capability and built-in implementations.
//!
//! During a tick the scheduler asks the [`DecisionSource`] for one
//! [`MoveAction`] per live entity, in ascending id order. Obtaining a
//! decision is a suspension point: an implementation may round-trip to an
//! external policy before answering. The scheduler applies each answer
//! before asking for the next, so no decision ever observes a partially
//! applied tick.
//!
//! Signals emitted while resolving an entity are handed back through
//! [`DecisionSource::deliver`].

use futures::future::BoxFuture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ecosim_types::{AxisCommand, EntityId, MoveAction, Signal};

use crate::config::DecisionKind;
use crate::observation::ObservationView;

/// Errors a decision source can report for one request.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// The source has no session for this entity.
    #[error("no decision session for entity {0}")]
    UnknownEntity(EntityId),

    /// An internal error in the decision source.
    #[error("decision source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// One decision request.
#[derive(Debug, Clone, Copy)]
pub struct DecisionRequest<'a> {
    /// Tick counter value for the current iteration.
    pub tick: u64,
    /// The entity to decide for.
    pub entity: EntityId,
    /// Read-only world view.
    pub view: ObservationView<'a>,
}

/// A source of entity decisions.
pub trait DecisionSource: Send {
    /// Choose a move for `request.entity`.
    ///
    /// An error is not fatal: the tick cycle logs it and treats the entity
    /// as staying put.
    fn decide<'a>(
        &'a mut self,
        request: &'a DecisionRequest<'a>,
    ) -> BoxFuture<'a, Result<MoveAction, DecisionError>>;

    /// Receive a reward or terminal signal for one entity.
    fn deliver(&mut self, _signal: &Signal) {}
}

/// A decision source that always stays put.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDecisionSource;

impl StubDecisionSource {
    /// Create a new stub decision source.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionSource for StubDecisionSource {
    fn decide<'a>(
        &'a mut self,
        _request: &'a DecisionRequest<'a>,
    ) -> BoxFuture<'a, Result<MoveAction, DecisionError>> {
        Box::pin(async { Ok(MoveAction::STAY) })
    }
}

/// Uniform random walk over the nine moves, seeded for reproducibility.
#[derive(Debug, Clone)]
pub struct RandomWalkDecisionSource {
    rng: StdRng,
}

impl RandomWalkDecisionSource {
    /// Create a random walk with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn axis(&mut self) -> AxisCommand {
        AxisCommand::from_discrete(self.rng.random_range(0..3_u8)).unwrap_or_default()
    }
}

impl DecisionSource for RandomWalkDecisionSource {
    fn decide<'a>(
        &'a mut self,
        _request: &'a DecisionRequest<'a>,
    ) -> BoxFuture<'a, Result<MoveAction, DecisionError>> {
        let action = MoveAction::new(self.axis(), self.axis());
        Box::pin(async move { Ok(action) })
    }
}

/// Build the configured decision source.
pub fn build_decision_source(kind: DecisionKind, seed: u64) -> Box<dyn DecisionSource> {
    match kind {
        DecisionKind::Stub => Box::new(StubDecisionSource::new()),
        DecisionKind::Random => Box::new(RandomWalkDecisionSource::new(seed)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecosim_types::Bounds;
    use ecosim_world::{Ruleset, World, WorldParams};

    use super::*;

    fn empty_world() -> World {
        World::new(WorldParams {
            bounds: Bounds::new(3, 3),
            ruleset: Ruleset::default(),
            population_ceiling: 4,
            seed: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn stub_always_stays() {
        let world = empty_world();
        let request = DecisionRequest {
            tick: 0,
            entity: EntityId::new(1),
            view: ObservationView::new(&world, 4),
        };
        let mut source = StubDecisionSource::new();
        assert_eq!(source.decide(&request).await.unwrap(), MoveAction::STAY);
    }

    #[tokio::test]
    async fn random_walk_is_reproducible() {
        let world = empty_world();
        let request = DecisionRequest {
            tick: 0,
            entity: EntityId::new(1),
            view: ObservationView::new(&world, 4),
        };
        let mut a = RandomWalkDecisionSource::new(9);
        let mut b = RandomWalkDecisionSource::new(9);
        for _ in 0..20 {
            let left = a.decide(&request).await.unwrap();
            let right = b.decide(&request).await.unwrap();
            assert_eq!(left, right);
        }
    }

    #[tokio::test]
    async fn random_walk_covers_moves() {
        let world = empty_world();
        let request = DecisionRequest {
            tick: 0,
            entity: EntityId::new(1),
            view: ObservationView::new(&world, 4),
        };
        let mut source = RandomWalkDecisionSource::new(1);
        let mut moved = false;
        for _ in 0..50 {
            if !source.decide(&request).await.unwrap().delta().is_zero() {
                moved = true;
            }
        }
        assert!(moved);
    }
}
