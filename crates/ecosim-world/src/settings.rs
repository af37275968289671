//! Per-role tunables.
//!
//! Every field carries a serde default so a partial `roles:` section in
//! the YAML config is valid. The defaults are the same for every role;
//! only the rule table in [`crate::rules`] tells the roles apart.

use serde::{Deserialize, Serialize};

use ecosim_types::Role;

/// Energy, reproduction, and reward tunables for one role.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSettings {
    /// Energy spent by a successful move.
    pub move_energy_cost: f64,
    /// Energy spent by a rejected or zero move.
    pub idle_energy_cost: f64,
    /// Energy at spawn.
    pub starting_energy: f64,
    /// Energy upper bound.
    pub max_energy: f64,
    /// Reproduction progress needed to attempt an offspring.
    pub reproduction_required: f64,
    /// Proximity progress gained (or lost) per second.
    pub reproduction_rate_per_second: f64,
    /// Half-width of the same-role neighbor scan.
    pub reproduction_radius: u32,
    /// Half-width of the offspring placement box.
    pub reproduction_spawn_radius: u32,
    /// Random placement draws per offspring attempt.
    pub max_spawn_attempts: u32,
    /// Reproduction progress gained by eating one prey.
    pub feed_value: f64,
    /// Feeding reward is `feed_value * feed_reward_scale`.
    pub feed_reward_scale: f64,
    /// Survival reward per decision cycle, for roles that earn one.
    pub reward_per_step: f64,
    /// Reward for producing an offspring.
    pub reward_per_offspring: f64,
    /// Reward delivered to this role when it is eaten. Usually negative.
    pub predation_penalty: f64,
}

const fn default_move_energy_cost() -> f64 {
    0.02
}

const fn default_idle_energy_cost() -> f64 {
    0.005
}

const fn default_energy() -> f64 {
    1.0
}

const fn default_reproduction_required() -> f64 {
    1.0
}

const fn default_reproduction_rate() -> f64 {
    0.2
}

const fn default_reproduction_radius() -> u32 {
    3
}

const fn default_spawn_radius() -> u32 {
    2
}

const fn default_spawn_attempts() -> u32 {
    30
}

const fn default_feed_value() -> f64 {
    0.75
}

const fn default_feed_reward_scale() -> f64 {
    2.0
}

const fn default_reward_per_step() -> f64 {
    0.05
}

const fn default_reward_per_offspring() -> f64 {
    0.1
}

const fn default_predation_penalty() -> f64 {
    -15.0
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            move_energy_cost: default_move_energy_cost(),
            idle_energy_cost: default_idle_energy_cost(),
            starting_energy: default_energy(),
            max_energy: default_energy(),
            reproduction_required: default_reproduction_required(),
            reproduction_rate_per_second: default_reproduction_rate(),
            reproduction_radius: default_reproduction_radius(),
            reproduction_spawn_radius: default_spawn_radius(),
            max_spawn_attempts: default_spawn_attempts(),
            feed_value: default_feed_value(),
            feed_reward_scale: default_feed_reward_scale(),
            reward_per_step: default_reward_per_step(),
            reward_per_offspring: default_reward_per_offspring(),
            predation_penalty: default_predation_penalty(),
        }
    }
}

impl RoleSettings {
    /// Names of fields holding invalid values, if any.
    ///
    /// Costs, energies, rates, and reward scales must be finite and
    /// non-negative; the reproduction requirement and maximum energy must
    /// be strictly positive; starting energy may not exceed the maximum.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let non_negative = [
            ("move_energy_cost", self.move_energy_cost),
            ("idle_energy_cost", self.idle_energy_cost),
            ("starting_energy", self.starting_energy),
            ("reproduction_rate_per_second", self.reproduction_rate_per_second),
            ("feed_value", self.feed_value),
            ("feed_reward_scale", self.feed_reward_scale),
        ];
        let mut invalid: Vec<&'static str> = non_negative
            .into_iter()
            .filter(|(_, v)| !v.is_finite() || *v < 0.0)
            .map(|(name, _)| name)
            .collect();
        if !self.max_energy.is_finite() || self.max_energy <= 0.0 {
            invalid.push("max_energy");
        }
        if !self.reproduction_required.is_finite() || self.reproduction_required <= 0.0 {
            invalid.push("reproduction_required");
        }
        if self.starting_energy > self.max_energy {
            invalid.push("starting_energy");
        }
        invalid
    }
}

/// Settings for every role.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    /// Grazer settings.
    pub grazer: RoleSettings,
    /// Predator settings.
    pub predator: RoleSettings,
    /// Hunter settings.
    pub hunter: RoleSettings,
}

impl Ruleset {
    /// Settings for one role.
    pub const fn for_role(&self, role: Role) -> &RoleSettings {
        match role {
            Role::Grazer => &self.grazer,
            Role::Predator => &self.predator,
            Role::Hunter => &self.hunter,
        }
    }

    /// Mutable settings for one role.
    pub const fn for_role_mut(&mut self, role: Role) -> &mut RoleSettings {
        match role {
            Role::Grazer => &mut self.grazer,
            Role::Predator => &mut self.predator,
            Role::Hunter => &mut self.hunter,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RoleSettings::default().invalid_fields().is_empty());
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let settings: RoleSettings =
            serde_json::from_str(r#"{"move_energy_cost": 0.5}"#).unwrap();
        assert!((settings.move_energy_cost - 0.5).abs() < f64::EPSILON);
        assert!((settings.idle_energy_cost - 0.005).abs() < f64::EPSILON);
        assert_eq!(settings.max_spawn_attempts, 30);
    }

    #[test]
    fn negative_cost_is_flagged() {
        let settings = RoleSettings {
            idle_energy_cost: -0.1,
            reproduction_required: 0.0,
            ..RoleSettings::default()
        };
        let invalid = settings.invalid_fields();
        assert!(invalid.contains(&"idle_energy_cost"));
        assert!(invalid.contains(&"reproduction_required"));
    }

    #[test]
    fn ruleset_selects_by_role() {
        let mut rules = Ruleset::default();
        rules.for_role_mut(Role::Predator).feed_value = 0.3;
        assert!((rules.for_role(Role::Predator).feed_value - 0.3).abs() < f64::EPSILON);
        assert!((rules.for_role(Role::Grazer).feed_value - 0.75).abs() < f64::EPSILON);
    }
}
