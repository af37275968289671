//! Authoritative store of live entity records.
//!
//! The registry owns the monotonic id counter and the per-role live
//! counters. Counters are adjusted on every add and remove rather than
//! recomputed, so floor and ceiling checks are O(1). Callers pair every
//! registry mutation with the matching [`GridIndex`](crate::grid::GridIndex)
//! mutation in the same resolution step; [`World`](crate::world::World)
//! is the only caller that does so.

use std::collections::BTreeMap;

use ecosim_types::{Cell, EntityId, EntityRecord, PopulationCounts, Role};

use crate::error::WorldError;

/// Parameters for a new entity; the registry assigns the id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewEntity {
    /// Behavioral class.
    pub role: Role,
    /// Initial cell.
    pub cell: Cell,
    /// Initial energy.
    pub energy: f64,
    /// Tick counter value at creation.
    pub born_at_tick: u64,
}

/// Live entity records keyed by id, in ascending id order.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    records: BTreeMap<EntityId, EntityRecord>,
    counts: PopulationCounts,
    next_id: u64,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Create an empty registry. The first issued id is `1`.
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            counts: PopulationCounts {
                grazers: 0,
                predators: 0,
                hunters: 0,
            },
            next_id: 1,
        }
    }

    /// Insert a new record and return its freshly issued id.
    pub fn add(&mut self, new: NewEntity) -> Result<EntityId, WorldError> {
        let id = EntityId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(WorldError::IdSpaceExhausted)?;

        let count = self.counts.get_mut(new.role);
        *count = count.saturating_add(1);

        self.records.insert(
            id,
            EntityRecord {
                id,
                role: new.role,
                cell: new.cell,
                energy: new.energy,
                reproduction_progress: 0.0,
                in_reproduction_range: false,
                born_at_tick: new.born_at_tick,
            },
        );
        Ok(id)
    }

    /// Remove a record and return it.
    pub fn remove(&mut self, id: EntityId) -> Result<EntityRecord, WorldError> {
        let record = self
            .records
            .remove(&id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let count = self.counts.get_mut(record.role);
        *count = count
            .checked_sub(1)
            .ok_or(WorldError::CounterUnderflow(record.role))?;
        Ok(record)
    }

    /// Look up a live record.
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    /// Mutable access to a live record. Changing `cell` through this handle
    /// bypasses the grid index; use [`Self::set_cell`] via the world instead.
    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&id)
    }

    /// Record a new cell for `id` and return the previous one.
    pub(crate) fn set_cell(&mut self, id: EntityId, cell: Cell) -> Result<Cell, WorldError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(WorldError::EntityNotFound(id))?;
        Ok(std::mem::replace(&mut record.cell, cell))
    }

    /// Whether `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.records.keys().copied().collect()
    }

    /// Iterate live records in ascending id order.
    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    /// Incrementally maintained per-role live counts.
    pub const fn counts(&self) -> PopulationCounts {
        self.counts
    }

    /// Live count for one role.
    pub const fn count(&self, role: Role) -> u32 {
        self.counts.get(role)
    }

    /// Live count across all roles.
    pub const fn total(&self) -> u32 {
        self.counts.total()
    }

    /// Whether no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-role counts computed by a full scan, for auditing the
    /// incremental counters.
    pub fn recount(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for record in self.records.values() {
            let count = counts.get_mut(record.role);
            *count = count.saturating_add(1);
        }
        counts
    }

    /// The id the next [`Self::add`] will issue.
    pub const fn peek_next_id(&self) -> EntityId {
        EntityId::new(self.next_id)
    }
}
