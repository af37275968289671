//! Outbound signals delivered to the external decision collaborator.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{RewardReason, TerminalCause};
use crate::ids::EntityId;

/// A learning signal emitted by the world for one entity.
///
/// Signals are queued in emission order during a tick and drained by the
/// tick cycle after each entity's update. A `Terminated` signal is always
/// the last signal an entity receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Signal {
    /// Scalar reward credited to an entity.
    Reward {
        /// Recipient.
        entity: EntityId,
        /// Reward amount; negative for penalties.
        amount: f64,
        /// What the reward was paid for.
        reason: RewardReason,
    },
    /// The entity's session has ended.
    Terminated {
        /// Recipient.
        entity: EntityId,
        /// Why the session ended.
        cause: TerminalCause,
    },
}

impl Signal {
    /// The entity this signal is addressed to.
    pub const fn entity(&self) -> EntityId {
        match self {
            Self::Reward { entity, .. } | Self::Terminated { entity, .. } => *entity,
        }
    }

    /// Whether this signal ends the entity's session.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }
}
