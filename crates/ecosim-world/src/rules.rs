//! Per-role rule table.
//!
//! Role behavior is a closed dispatch table rather than per-role types:
//! [`role_rules`] matches exhaustively on [`Role`], so every rule has been
//! decided for every role and a missing rule is visible here instead of
//! being inherited silently.

use ecosim_types::Role;

/// How a role treats an occupied destination cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePolicy {
    /// The destination must be empty.
    RequireEmpty,
    /// Empty destinations are entered. An occupied destination whose
    /// lowest-id occupant has the prey role is entered after destroying
    /// that occupant; any other occupant blocks the move.
    PreyOn(Role),
    /// Movement always succeeds, regardless of occupancy.
    PassThrough,
}

/// Behavior switches for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRules {
    /// Destination-cell policy.
    pub move_policy: MovePolicy,
    /// Whether progress accrues from same-role neighbors.
    pub proximity_reproduction: bool,
    /// Whether each decision cycle survived pays the per-step reward.
    pub earns_survival_reward: bool,
}

/// The rule table.
///
/// Hunters have no interaction rule: they pass through every cell and
/// neither feed nor accrue proximity progress. This is a known gap, kept
/// explicit rather than guessed at.
pub const fn role_rules(role: Role) -> RoleRules {
    match role {
        Role::Grazer => RoleRules {
            move_policy: MovePolicy::RequireEmpty,
            proximity_reproduction: true,
            earns_survival_reward: true,
        },
        Role::Predator => RoleRules {
            move_policy: MovePolicy::PreyOn(Role::Grazer),
            proximity_reproduction: false,
            earns_survival_reward: false,
        },
        Role::Hunter => RoleRules {
            move_policy: MovePolicy::PassThrough,
            proximity_reproduction: false,
            earns_survival_reward: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_grazers_cluster() {
        for role in Role::ALL {
            assert_eq!(
                role_rules(role).proximity_reproduction,
                role == Role::Grazer
            );
        }
    }

    #[test]
    fn predators_prey_on_grazers() {
        assert_eq!(
            role_rules(Role::Predator).move_policy,
            MovePolicy::PreyOn(Role::Grazer)
        );
        assert_eq!(role_rules(Role::Hunter).move_policy, MovePolicy::PassThrough);
    }
}
