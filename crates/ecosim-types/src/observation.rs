//! Observation surface handed to the external decision collaborator.
//!
//! Two shapes are produced:
//!
//! - [`EntityObservation`] -- the deciding entity's own state, flattened to
//!   [`ENTITY_OBSERVATION_SIZE`] floats.
//! - [`WorldObservation`] -- one `(cell, one-hot role)` entry per live
//!   entity, zero-padded to a fixed maximum population so every vector has
//!   the same length.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Role;
use crate::ids::EntityId;
use crate::structs::{Cell, EntityRecord};

/// Length of [`EntityObservation::to_vector`].
pub const ENTITY_OBSERVATION_SIZE: usize = 8;

/// Floats per entry in [`WorldObservation::to_vector`].
pub const WORLD_ENTRY_SIZE: usize = 5;

/// Per-entity observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityObservation {
    /// The observed entity.
    pub entity: EntityId,
    /// Current cell.
    pub cell: Cell,
    /// Behavioral class.
    pub role: Role,
    /// Remaining energy.
    pub energy: f64,
    /// Reproduction accumulator.
    pub reproduction_progress: f64,
    /// Advisory proximity flag.
    pub in_reproduction_range: bool,
}

impl EntityObservation {
    /// Project an entity record into its observation.
    pub const fn from_record(record: &EntityRecord) -> Self {
        Self {
            entity: record.id,
            cell: record.cell,
            role: record.role,
            energy: record.energy,
            reproduction_progress: record.reproduction_progress,
            in_reproduction_range: record.in_reproduction_range,
        }
    }

    /// Flatten to `[x, y, grazer, predator, hunter, energy, progress, in_range]`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn to_vector(&self) -> [f32; ENTITY_OBSERVATION_SIZE] {
        let [g, p, h] = self.role.one_hot();
        [
            self.cell.x as f32,
            self.cell.y as f32,
            g,
            p,
            h,
            self.energy as f32,
            self.reproduction_progress as f32,
            if self.in_reproduction_range { 1.0 } else { 0.0 },
        ]
    }
}

/// One live entity as seen in the aggregate world view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEntry {
    /// Occupied cell.
    pub cell: Cell,
    /// Occupant role.
    pub role: Role,
}

/// Aggregate world view with a fixed padded length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldObservation {
    /// Live entries, truncated to `capacity`.
    pub entries: Vec<WorldEntry>,
    /// Number of entry slots in the flattened vector.
    pub capacity: u32,
}

impl WorldObservation {
    /// Build a view from live entries, keeping at most `capacity` of them.
    pub fn new(mut entries: Vec<WorldEntry>, capacity: u32) -> Self {
        let cap = usize::try_from(capacity).unwrap_or(usize::MAX);
        entries.truncate(cap);
        Self { entries, capacity }
    }

    /// Flatten to `capacity * WORLD_ENTRY_SIZE` floats; slots past the live
    /// entries are zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_vector(&self) -> Vec<f32> {
        let slots = usize::try_from(self.capacity).unwrap_or(0);
        let mut out = Vec::with_capacity(slots.saturating_mul(WORLD_ENTRY_SIZE));
        for entry in &self.entries {
            let [g, p, h] = entry.role.one_hot();
            out.extend_from_slice(&[entry.cell.x as f32, entry.cell.y as f32, g, p, h]);
        }
        out.resize(slots.saturating_mul(WORLD_ENTRY_SIZE), 0.0);
        out
    }
}
