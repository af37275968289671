//! Enumeration types shared across the simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Behavioral class of an entity.
///
/// The set is closed: every rule table in the world crate matches on it
/// exhaustively, so adding a role is a compile error until each rule has
/// been decided for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Herbivore that reproduces by clustering with other grazers.
    Grazer,
    /// Carnivore that feeds by moving onto a grazer.
    Predator,
    /// Role with no interaction rule; moves unconditionally.
    Hunter,
}

impl Role {
    /// Number of roles, and the width of the one-hot role encoding.
    pub const COUNT: usize = 3;

    /// Every role, in one-hot index order.
    pub const ALL: [Self; Self::COUNT] = [Self::Grazer, Self::Predator, Self::Hunter];

    /// Position of this role in the one-hot encoding.
    pub const fn index(self) -> usize {
        match self {
            Self::Grazer => 0,
            Self::Predator => 1,
            Self::Hunter => 2,
        }
    }

    /// One-hot encoding of this role.
    pub const fn one_hot(self) -> [f32; Self::COUNT] {
        match self {
            Self::Grazer => [1.0, 0.0, 0.0],
            Self::Predator => [0.0, 1.0, 0.0],
            Self::Hunter => [0.0, 0.0, 1.0],
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Grazer => write!(f, "grazer"),
            Self::Predator => write!(f, "predator"),
            Self::Hunter => write!(f, "hunter"),
        }
    }
}

/// Movement command for a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AxisCommand {
    /// Keep the coordinate unchanged.
    #[default]
    Stay,
    /// Step one cell toward lower coordinates.
    Decrease,
    /// Step one cell toward higher coordinates.
    Increase,
}

impl AxisCommand {
    /// Decode a discrete policy branch value: `0` stay, `1` decrease,
    /// `2` increase. Any other value is not a valid command.
    pub const fn from_discrete(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stay),
            1 => Some(Self::Decrease),
            2 => Some(Self::Increase),
            _ => None,
        }
    }

    /// Encode back into the discrete branch value.
    pub const fn to_discrete(self) -> u8 {
        match self {
            Self::Stay => 0,
            Self::Decrease => 1,
            Self::Increase => 2,
        }
    }

    /// Signed cell offset for this command.
    pub const fn step(self) -> i32 {
        match self {
            Self::Stay => 0,
            Self::Decrease => -1,
            Self::Increase => 1,
        }
    }
}

/// Why a requested move was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MoveRejection {
    /// The destination lies outside the world bounds.
    OutOfBounds,
    /// The requested delta was zero on both axes.
    NoMovement,
    /// The destination is occupied and the mover's role requires an empty cell.
    Occupied,
    /// The destination's first occupant is not prey for the mover.
    BlockedByNonPrey,
}

/// Why an entity's session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TerminalCause {
    /// Energy reached zero.
    Starvation,
    /// Eaten by a predator.
    Predation,
    /// Removed by a full-population baseline reset.
    Reset,
}

impl core::fmt::Display for TerminalCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::Predation => write!(f, "predation"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// What a reward signal was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RewardReason {
    /// Surviving one decision cycle.
    Survival,
    /// Reproduction progress gained from proximity to same-role neighbors.
    ReproductionProgress,
    /// Feeding on prey.
    Feeding,
    /// Producing an offspring.
    Offspring,
    /// Being eaten (sent to the prey before its terminal signal).
    Predated,
}
