//! Move resolution against the role rule table.
//!
//! A request is checked in a fixed order: destination bounds, zero delta,
//! then the mover's [`MovePolicy`]. A successful move relocates the entity
//! and charges the move cost. A rejected move mutates nothing but the
//! mover's energy, which is charged the idle cost. Depletion is not
//! checked here; the tick cycle removes starved entities after
//! resolution.

use tracing::debug;

use ecosim_types::{
    EntityId, MoveAction, MoveOutcome, MoveRejection, RewardReason, TerminalCause,
};

use crate::error::WorldError;
use crate::rules::{MovePolicy, role_rules};
use crate::world::World;

/// Resolve and apply one move request for `id`.
pub fn resolve_move(
    world: &mut World,
    id: EntityId,
    action: MoveAction,
) -> Result<MoveOutcome, WorldError> {
    let record = world.entity(id).ok_or(WorldError::EntityNotFound(id))?;
    let role = record.role;
    let from = record.cell;
    let settings = *world.settings(role);
    let delta = action.delta();

    let destination = from
        .offset(delta.dx, delta.dy)
        .filter(|cell| world.bounds().contains(*cell));

    let verdict = match destination {
        None => Err(MoveRejection::OutOfBounds),
        Some(_) if delta.is_zero() => Err(MoveRejection::NoMovement),
        Some(to) => match role_rules(role).move_policy {
            MovePolicy::RequireEmpty => {
                if world.grid().is_empty(to) {
                    Ok((to, None))
                } else {
                    Err(MoveRejection::Occupied)
                }
            }
            MovePolicy::PreyOn(prey_role) => match world.grid().first_occupant(to) {
                None => Ok((to, None)),
                Some(first) => {
                    let first_role = world
                        .entity(first)
                        .ok_or(WorldError::EntityNotFound(first))?
                        .role;
                    if first_role == prey_role {
                        Ok((to, Some(first)))
                    } else {
                        Err(MoveRejection::BlockedByNonPrey)
                    }
                }
            },
            MovePolicy::PassThrough => Ok((to, None)),
        },
    };

    match verdict {
        Ok((to, prey)) => {
            if let Some(prey) = prey {
                devour(world, id, prey)?;
            }
            world.relocate(id, to)?;
            world.spend_energy(id, settings.move_energy_cost)?;
            debug!(entity = %id, %role, %from, %to, "moved");
            Ok(MoveOutcome::Moved { from, to, prey })
        }
        Err(reason) => {
            world.spend_energy(id, settings.idle_energy_cost)?;
            Ok(MoveOutcome::Rejected { reason })
        }
    }
}

/// Destroy `prey` and credit the feeding to `predator`.
///
/// The prey receives its role's predation penalty followed by its terminal
/// signal. The predator gains `feed_value` reproduction progress (clamped)
/// and a reward of `feed_value * feed_reward_scale`.
fn devour(world: &mut World, predator: EntityId, prey: EntityId) -> Result<(), WorldError> {
    let prey_role = world
        .entity(prey)
        .ok_or(WorldError::EntityNotFound(prey))?
        .role;
    let predator_role = world
        .entity(predator)
        .ok_or(WorldError::EntityNotFound(predator))?
        .role;
    let penalty = world.settings(prey_role).predation_penalty;
    let feed = *world.settings(predator_role);

    world.emit_reward(prey, penalty, RewardReason::Predated);
    world.remove_entity(prey, TerminalCause::Predation)?;

    world.adjust_progress(predator, feed.feed_value)?;
    world.emit_reward(
        predator,
        feed.feed_value * feed.feed_reward_scale,
        RewardReason::Feeding,
    );
    debug!(%predator, %prey, "predation");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecosim_types::{AxisCommand, Bounds, Cell, Role, Signal};

    use super::*;
    use crate::settings::Ruleset;
    use crate::world::WorldParams;

    fn world() -> World {
        World::new(WorldParams {
            bounds: Bounds::new(6, 6),
            ruleset: Ruleset::default(),
            population_ceiling: 50,
            seed: 3,
        })
        .unwrap()
    }

    fn spawn(w: &mut World, role: Role, x: i32, y: i32) -> EntityId {
        w.try_spawn(role, Cell::new(x, y)).unwrap().unwrap()
    }

    const RIGHT: MoveAction = MoveAction::new(AxisCommand::Increase, AxisCommand::Stay);
    const LEFT: MoveAction = MoveAction::new(AxisCommand::Decrease, AxisCommand::Stay);

    #[test]
    fn grazer_moves_into_empty_cell() {
        let mut w = world();
        let g = spawn(&mut w, Role::Grazer, 2, 2);
        let diag = MoveAction::new(AxisCommand::Increase, AxisCommand::Increase);
        let outcome = resolve_move(&mut w, g, diag).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Cell::new(2, 2),
                to: Cell::new(3, 3),
                prey: None
            }
        );
        let energy = w.entity(g).unwrap().energy;
        assert!((energy - (1.0 - 0.02)).abs() < 1e-12);
        w.check_consistency().unwrap();
    }

    #[test]
    fn grazer_blocked_by_occupied_cell() {
        let mut w = world();
        let g = spawn(&mut w, Role::Grazer, 2, 2);
        let other = spawn(&mut w, Role::Grazer, 3, 2);
        let outcome = resolve_move(&mut w, g, RIGHT).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Rejected {
                reason: MoveRejection::Occupied
            }
        );
        assert_eq!(w.entity(g).unwrap().cell, Cell::new(2, 2));
        assert_eq!(w.entity(other).unwrap().cell, Cell::new(3, 2));
        assert_eq!(w.grid().occupants(Cell::new(3, 2)).len(), 1);
        let energy = w.entity(g).unwrap().energy;
        assert!((energy - (1.0 - 0.005)).abs() < 1e-12);
    }

    #[test]
    fn out_of_bounds_rejected() {
        let mut w = world();
        let g = spawn(&mut w, Role::Grazer, 0, 0);
        let outcome = resolve_move(&mut w, g, LEFT).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Rejected {
                reason: MoveRejection::OutOfBounds
            }
        );
    }

    #[test]
    fn zero_delta_charges_idle_cost() {
        let mut w = world();
        let h = spawn(&mut w, Role::Hunter, 1, 1);
        let outcome = resolve_move(&mut w, h, MoveAction::STAY).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Rejected {
                reason: MoveRejection::NoMovement
            }
        );
        assert!((w.entity(h).unwrap().energy - 0.995).abs() < 1e-12);
    }

    #[test]
    fn predator_eats_grazer() {
        let mut w = world();
        let p = spawn(&mut w, Role::Predator, 1, 1);
        let g = spawn(&mut w, Role::Grazer, 2, 1);
        w.drain_signals();

        let outcome = resolve_move(&mut w, p, RIGHT).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Cell::new(1, 1),
                to: Cell::new(2, 1),
                prey: Some(g)
            }
        );
        assert!(w.entity(g).is_none());
        assert_eq!(w.population().grazers, 0);
        assert_eq!(w.entity(p).unwrap().cell, Cell::new(2, 1));
        assert!((w.entity(p).unwrap().reproduction_progress - 0.75).abs() < 1e-12);

        let signals = w.drain_signals();
        assert_eq!(
            signals,
            vec![
                Signal::Reward {
                    entity: g,
                    amount: -15.0,
                    reason: RewardReason::Predated
                },
                Signal::Terminated {
                    entity: g,
                    cause: TerminalCause::Predation
                },
                Signal::Reward {
                    entity: p,
                    amount: 1.5,
                    reason: RewardReason::Feeding
                },
            ]
        );
        w.check_consistency().unwrap();
    }

    #[test]
    fn predator_blocked_by_predator() {
        let mut w = world();
        let p = spawn(&mut w, Role::Predator, 1, 1);
        spawn(&mut w, Role::Predator, 2, 1);
        let outcome = resolve_move(&mut w, p, RIGHT).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Rejected {
                reason: MoveRejection::BlockedByNonPrey
            }
        );
        assert_eq!(w.population().predators, 2);
    }

    #[test]
    fn hunter_passes_through() {
        let mut w = world();
        let h = spawn(&mut w, Role::Hunter, 1, 1);
        let g = spawn(&mut w, Role::Grazer, 2, 1);
        let outcome = resolve_move(&mut w, h, RIGHT).unwrap();
        assert!(outcome.is_moved());
        assert_eq!(w.grid().occupants(Cell::new(2, 1)).len(), 2);
        assert!(w.entity(g).is_some());
        w.check_consistency().unwrap();
    }

    #[test]
    fn feeding_progress_is_clamped() {
        let mut w = world();
        let p = spawn(&mut w, Role::Predator, 0, 0);
        spawn(&mut w, Role::Grazer, 1, 0);
        spawn(&mut w, Role::Grazer, 2, 0);
        resolve_move(&mut w, p, RIGHT).unwrap();
        resolve_move(&mut w, p, RIGHT).unwrap();
        let progress = w.entity(p).unwrap().reproduction_progress;
        assert!((progress - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_entity_is_error() {
        let mut w = world();
        assert!(matches!(
            resolve_move(&mut w, EntityId::new(404), RIGHT),
            Err(WorldError::EntityNotFound(_))
        ));
    }
}
