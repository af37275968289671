//! Population floors, the starting baseline, and full resets.
//!
//! New entities are placed by a bounded random search for an empty cell;
//! the search never loops on time, only on its attempt budget. The global
//! ceiling is enforced by [`World::try_spawn`], so every spawn path here
//! stops cleanly once it is reached.

use tracing::{debug, info};

use ecosim_types::{Cell, PopulationCounts, Role, TerminalCause};

use crate::error::WorldError;
use crate::world::World;

/// Enforces per-role floors and seeds or resets the starting population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationController {
    starting: PopulationCounts,
    floors: PopulationCounts,
    placement_attempts: u32,
}

impl PopulationController {
    /// Create a controller.
    pub const fn new(
        starting: PopulationCounts,
        floors: PopulationCounts,
        placement_attempts: u32,
    ) -> Self {
        Self {
            starting,
            floors,
            placement_attempts,
        }
    }

    /// Baseline counts spawned by a seed or reset.
    pub const fn starting(&self) -> PopulationCounts {
        self.starting
    }

    /// Per-role floors.
    pub const fn floors(&self) -> PopulationCounts {
        self.floors
    }

    /// Spawn `role` entities until its live count reaches `floor`.
    ///
    /// Returns how many were spawned, which falls short when the ceiling
    /// is reached or the placement search gives up.
    pub fn top_up(&self, world: &mut World, role: Role, floor: u32) -> Result<u32, WorldError> {
        let current = world.registry().count(role);
        let missing = floor.saturating_sub(current);
        let spawned = self.spawn_many(world, role, missing)?;
        if spawned > 0 {
            debug!(%role, spawned, floor, "population topped up");
        }
        Ok(spawned)
    }

    /// Top up every role with a non-zero floor.
    pub fn top_up_all(&self, world: &mut World) -> Result<PopulationCounts, WorldError> {
        let mut spawned = PopulationCounts::default();
        for role in Role::ALL {
            let floor = self.floors.get(role);
            if floor > 0 {
                *spawned.get_mut(role) = self.top_up(world, role, floor)?;
            }
        }
        Ok(spawned)
    }

    /// Spawn the starting count of every role.
    pub fn seed_baseline(&self, world: &mut World) -> Result<PopulationCounts, WorldError> {
        let mut spawned = PopulationCounts::default();
        for role in Role::ALL {
            *spawned.get_mut(role) = self.spawn_many(world, role, self.starting.get(role))?;
        }
        info!(
            grazers = spawned.grazers,
            predators = spawned.predators,
            hunters = spawned.hunters,
            "baseline population seeded"
        );
        Ok(spawned)
    }

    /// Remove every live entity, then seed the baseline.
    pub fn reset_to_baseline(&self, world: &mut World) -> Result<PopulationCounts, WorldError> {
        let removed = world.clear(TerminalCause::Reset)?;
        info!(removed, "population reset");
        self.seed_baseline(world)
    }

    fn spawn_many(&self, world: &mut World, role: Role, count: u32) -> Result<u32, WorldError> {
        let mut spawned: u32 = 0;
        while spawned < count {
            if world.at_ceiling() {
                break;
            }
            let Some(cell) = self.random_empty_cell(world) else {
                debug!(%role, attempts = self.placement_attempts, "placement search exhausted");
                break;
            };
            if world.try_spawn(role, cell)?.is_none() {
                break;
            }
            spawned = spawned.saturating_add(1);
        }
        Ok(spawned)
    }

    /// Draw up to `placement_attempts` random cells and return the first
    /// empty one.
    pub fn random_empty_cell(&self, world: &mut World) -> Option<Cell> {
        for _ in 0..self.placement_attempts {
            let cell = world.random_cell();
            if world.grid().is_empty(cell) {
                return Some(cell);
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use ecosim_types::Bounds;

    use super::*;
    use crate::settings::Ruleset;
    use crate::world::WorldParams;

    fn counts(grazers: u32, predators: u32, hunters: u32) -> PopulationCounts {
        PopulationCounts {
            grazers,
            predators,
            hunters,
        }
    }

    fn world(ceiling: u32) -> World {
        World::new(WorldParams {
            bounds: Bounds::new(10, 10),
            ruleset: Ruleset::default(),
            population_ceiling: ceiling,
            seed: 99,
        })
        .unwrap()
    }

    #[test]
    fn top_up_fills_floors_in_distinct_cells() {
        let mut w = world(200);
        let controller = PopulationController::new(counts(0, 0, 0), counts(10, 10, 0), 1000);
        let spawned = controller.top_up_all(&mut w).unwrap();
        assert_eq!(spawned, counts(10, 10, 0));
        assert_eq!(w.population(), counts(10, 10, 0));
        let cells: BTreeSet<_> = w.registry().records().map(|r| r.cell).collect();
        assert_eq!(cells.len(), 20);
        w.check_consistency().unwrap();
    }

    #[test]
    fn top_up_is_noop_when_at_floor() {
        let mut w = world(200);
        let controller = PopulationController::new(counts(0, 0, 0), counts(3, 0, 0), 1000);
        controller.top_up_all(&mut w).unwrap();
        assert_eq!(controller.top_up(&mut w, Role::Grazer, 3).unwrap(), 0);
    }

    #[test]
    fn top_up_respects_ceiling() {
        let mut w = world(15);
        let controller = PopulationController::new(counts(0, 0, 0), counts(10, 10, 0), 1000);
        controller.top_up_all(&mut w).unwrap();
        assert_eq!(w.population().total(), 15);
        assert_eq!(w.population().grazers, 10);
    }

    #[test]
    fn reset_restores_starting_counts() {
        let mut w = world(200);
        let controller = PopulationController::new(counts(4, 2, 1), counts(0, 0, 0), 1000);
        controller.seed_baseline(&mut w).unwrap();
        controller.top_up(&mut w, Role::Grazer, 9).unwrap();
        assert_eq!(w.population().grazers, 9);

        w.drain_signals();
        controller.reset_to_baseline(&mut w).unwrap();
        assert_eq!(w.population(), counts(4, 2, 1));
        let terminated = w
            .drain_signals()
            .into_iter()
            .filter(ecosim_types::Signal::is_terminal)
            .count();
        assert_eq!(terminated, 12);
        w.check_consistency().unwrap();
    }

    #[test]
    fn full_world_exhausts_search() {
        let mut w = World::new(WorldParams {
            bounds: Bounds::new(1, 1),
            ruleset: Ruleset::default(),
            population_ceiling: 10,
            seed: 0,
        })
        .unwrap();
        let controller = PopulationController::new(counts(0, 0, 0), counts(3, 0, 0), 20);
        assert_eq!(controller.top_up(&mut w, Role::Grazer, 3).unwrap(), 1);
        assert!(controller.random_empty_cell(&mut w).is_none());
    }
}
