//! Reproduction rule, applied after movement each tick.
//!
//! Two parts:
//!
//! - **Proximity rate** (roles whose rule table enables it): count
//!   same-role entities in the reproduction radius box, the entity itself
//!   included. More than one raises progress by `rate * elapsed` and pays
//!   the same amount as a reward; otherwise progress falls by that amount.
//! - **Threshold spawn** (every role): once progress reaches the required
//!   value, try up to `max_spawn_attempts` random cells within the spawn
//!   radius. Success resets progress and pays the offspring reward. Failure
//!   leaves progress at the threshold so the attempt repeats next tick.

use tracing::debug;

use ecosim_types::{EntityId, RewardReason};

use crate::error::WorldError;
use crate::rules::role_rules;
use crate::world::World;

/// What the reproduction rule did for one entity this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReproductionOutcome {
    /// Progress is below the threshold.
    Accumulating,
    /// An offspring was placed.
    Offspring(EntityId),
    /// The threshold was reached but no cell could be used.
    PlacementFailed,
}

/// Apply the reproduction rule for `id` over `elapsed_seconds`.
pub fn apply_reproduction(
    world: &mut World,
    id: EntityId,
    elapsed_seconds: f64,
) -> Result<ReproductionOutcome, WorldError> {
    let record = world.entity(id).ok_or(WorldError::EntityNotFound(id))?;
    let role = record.role;
    let center = record.cell;
    let settings = *world.settings(role);

    if role_rules(role).proximity_reproduction {
        let same_role = world
            .grid()
            .occupants_in_radius(center, settings.reproduction_radius, world.bounds())
            .into_iter()
            .filter(|other| world.entity(*other).is_some_and(|r| r.role == role))
            .count();
        let step = settings.reproduction_rate_per_second * elapsed_seconds;
        let in_range = same_role > 1;
        world.set_in_range(id, in_range)?;
        if in_range {
            world.adjust_progress(id, step)?;
            world.emit_reward(id, step, RewardReason::ReproductionProgress);
        } else {
            world.adjust_progress(id, -step)?;
        }
    }

    let progress = world
        .entity(id)
        .ok_or(WorldError::EntityNotFound(id))?
        .reproduction_progress;
    if progress < settings.reproduction_required {
        return Ok(ReproductionOutcome::Accumulating);
    }

    for _ in 0..settings.max_spawn_attempts {
        if world.at_ceiling() {
            break;
        }
        let Some(cell) = world.random_cell_near(center, settings.reproduction_spawn_radius) else {
            continue;
        };
        if !world.is_free(cell) {
            continue;
        }
        if let Some(child) = world.try_spawn(role, cell)? {
            world.reset_progress(id)?;
            world.emit_reward(id, settings.reward_per_offspring, RewardReason::Offspring);
            debug!(parent = %id, %child, %role, %cell, "offspring placed");
            return Ok(ReproductionOutcome::Offspring(child));
        }
    }
    Ok(ReproductionOutcome::PlacementFailed)
}
