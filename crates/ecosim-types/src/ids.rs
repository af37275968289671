//! Opaque entity handles.
//!
//! Entities are referenced by an integer handle into the registry rather
//! than by direct reference. Handles are issued from a monotonic counter
//! owned by the registry and are never reused for the lifetime of a world,
//! including across baseline resets, so an external decision session can
//! never observe a recycled handle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique handle for an entity in the simulation.
///
/// Ordering follows issue order, which is also the deterministic order in
/// which entities are asked for decisions within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityId(pub u64);

impl EntityId {
    /// Wrap a raw handle value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw handle value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
