//! Action surface consumed from the external decision collaborator, and
//! the outcome of applying it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AxisCommand, MoveRejection};
use crate::ids::EntityId;
use crate::structs::Cell;

/// One discrete movement command per axis; nine combinations in total,
/// diagonals included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveAction {
    /// Horizontal command.
    pub x: AxisCommand,
    /// Vertical command.
    pub y: AxisCommand,
}

impl MoveAction {
    /// Stay on both axes.
    pub const STAY: Self = Self {
        x: AxisCommand::Stay,
        y: AxisCommand::Stay,
    };

    /// Build an action from per-axis commands.
    pub const fn new(x: AxisCommand, y: AxisCommand) -> Self {
        Self { x, y }
    }

    /// Decode the two discrete policy branches (`[x, y]`).
    pub const fn from_discrete(branches: [u8; 2]) -> Option<Self> {
        let [bx, by] = branches;
        let (Some(x), Some(y)) = (AxisCommand::from_discrete(bx), AxisCommand::from_discrete(by))
        else {
            return None;
        };
        Some(Self { x, y })
    }

    /// Cell delta requested by this action.
    pub const fn delta(self) -> MoveDelta {
        MoveDelta {
            dx: self.x.step(),
            dy: self.y.step(),
        }
    }
}

/// A movement delta with each component in `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoveDelta {
    /// Horizontal offset.
    pub dx: i32,
    /// Vertical offset.
    pub dy: i32,
}

impl MoveDelta {
    /// Whether the delta leaves the entity in place.
    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Result of resolving one move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MoveOutcome {
    /// The entity now occupies `to`.
    Moved {
        /// Cell the entity left.
        from: Cell,
        /// Cell the entity entered.
        to: Cell,
        /// Prey destroyed to vacate the destination, if any.
        prey: Option<EntityId>,
    },
    /// Nothing moved; the idle cost was charged.
    Rejected {
        /// Why the move was refused.
        reason: MoveRejection,
    },
}

impl MoveOutcome {
    /// Whether the entity changed cell.
    pub const fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}
