//! The owning world object.
//!
//! [`World`] holds the grid index, the registry, the dirty tracker, the
//! ruleset, the seeded random source, and the outbound signal queue. It
//! is created for one simulation run and passed by reference to every
//! component; nothing in the crate is process-global.
//!
//! All structural mutations (spawn, remove, relocate) go through this
//! type so that the grid and the registry change together and the dirty
//! tracker sees every affected cell.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use ecosim_types::{
    Bounds, Cell, EntityId, EntityRecord, PopulationCounts, RewardReason, Role, Signal,
    TerminalCause,
};

use crate::error::WorldError;
use crate::grid::GridIndex;
use crate::raster::{DirtyRegionTracker, RasterBuffer};
use crate::registry::{EntityRegistry, NewEntity};
use crate::settings::{RoleSettings, Ruleset};

/// Energy values closer to zero than this are treated as zero.
pub const ENERGY_EPSILON: f64 = 1e-9;

/// Construction parameters for a [`World`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldParams {
    /// Grid extent.
    pub bounds: Bounds,
    /// Per-role settings.
    pub ruleset: Ruleset,
    /// Global population ceiling.
    pub population_ceiling: u32,
    /// Seed for placement and offspring randomness.
    pub seed: u64,
}

/// Grid world state for one simulation run.
#[derive(Debug)]
pub struct World {
    bounds: Bounds,
    grid: GridIndex,
    registry: EntityRegistry,
    dirty: DirtyRegionTracker,
    ruleset: Ruleset,
    population_ceiling: u32,
    rng: StdRng,
    signals: Vec<Signal>,
    current_tick: u64,
}

impl World {
    /// Create an empty world.
    pub fn new(params: WorldParams) -> Result<Self, WorldError> {
        if params.bounds.width == 0 || params.bounds.height == 0 {
            return Err(WorldError::InvalidBounds {
                width: params.bounds.width,
                height: params.bounds.height,
            });
        }
        Ok(Self {
            bounds: params.bounds,
            grid: GridIndex::new(),
            registry: EntityRegistry::new(),
            dirty: DirtyRegionTracker::new(),
            ruleset: params.ruleset,
            population_ceiling: params.population_ceiling,
            rng: StdRng::seed_from_u64(params.seed),
            signals: Vec::new(),
            current_tick: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Grid extent.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Spatial index.
    pub const fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Entity store.
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Dirty-cell tracker.
    pub const fn dirty(&self) -> &DirtyRegionTracker {
        &self.dirty
    }

    /// Per-role settings.
    pub const fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Settings for one role.
    pub const fn settings(&self, role: Role) -> &RoleSettings {
        self.ruleset.for_role(role)
    }

    /// Global population ceiling.
    pub const fn population_ceiling(&self) -> u32 {
        self.population_ceiling
    }

    /// Live counts per role.
    pub const fn population(&self) -> PopulationCounts {
        self.registry.counts()
    }

    /// Whether the ceiling refuses further spawns.
    pub const fn at_ceiling(&self) -> bool {
        self.registry.total() >= self.population_ceiling
    }

    /// A live record.
    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.registry.get(id)
    }

    /// Live ids in ascending order.
    pub fn live_ids(&self) -> Vec<EntityId> {
        self.registry.ids()
    }

    /// Tick stamp applied to newly created entities.
    pub const fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Set the tick stamp applied to newly created entities.
    pub const fn set_current_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    /// Whether `cell` is in bounds and unoccupied.
    pub fn is_free(&self, cell: Cell) -> bool {
        self.bounds.contains(cell) && self.grid.is_empty(cell)
    }

    // -----------------------------------------------------------------------
    // Structural mutation
    // -----------------------------------------------------------------------

    /// Spawn a `role` entity at `cell` with the role's starting energy.
    ///
    /// Returns `Ok(None)` when the ceiling is reached or the cell is
    /// occupied; nothing is mutated in that case.
    pub fn try_spawn(&mut self, role: Role, cell: Cell) -> Result<Option<EntityId>, WorldError> {
        if !self.bounds.contains(cell) {
            return Err(WorldError::CellOutOfBounds(cell));
        }
        if self.at_ceiling() || !self.grid.is_empty(cell) {
            return Ok(None);
        }
        let energy = self.settings(role).starting_energy;
        let id = self.registry.add(NewEntity {
            role,
            cell,
            energy,
            born_at_tick: self.current_tick,
        })?;
        self.grid.insert(cell, id);
        self.dirty.mark_dirty(cell);
        debug!(entity = %id, %role, %cell, "entity spawned");
        Ok(Some(id))
    }

    /// Remove an entity, mark its cell dirty, and queue its terminal signal.
    pub fn remove_entity(
        &mut self,
        id: EntityId,
        cause: TerminalCause,
    ) -> Result<EntityRecord, WorldError> {
        let record = self.registry.remove(id)?;
        if !self.grid.remove(record.cell, id) {
            return Err(WorldError::InvariantViolation {
                reason: format!("entity {id} missing from grid cell {}", record.cell),
            });
        }
        self.dirty.mark_dirty(record.cell);
        self.signals.push(Signal::Terminated { entity: id, cause });
        debug!(entity = %id, role = %record.role, cell = %record.cell, %cause, "entity removed");
        Ok(record)
    }

    /// Remove every live entity with the given cause.
    pub fn clear(&mut self, cause: TerminalCause) -> Result<u32, WorldError> {
        let mut removed: u32 = 0;
        for id in self.registry.ids() {
            self.remove_entity(id, cause)?;
            removed = removed.saturating_add(1);
        }
        Ok(removed)
    }

    /// Move an entity to `to`, remove-then-insert, and mark both cells
    /// dirty. Returns the cell it left.
    pub fn relocate(&mut self, id: EntityId, to: Cell) -> Result<Cell, WorldError> {
        if !self.bounds.contains(to) {
            return Err(WorldError::CellOutOfBounds(to));
        }
        let from = self.registry.set_cell(id, to)?;
        if !self.grid.remove(from, id) {
            return Err(WorldError::InvariantViolation {
                reason: format!("entity {id} missing from grid cell {from}"),
            });
        }
        self.grid.insert(to, id);
        self.dirty.mark_dirty(from);
        self.dirty.mark_dirty(to);
        Ok(from)
    }

    // -----------------------------------------------------------------------
    // Bounded values
    // -----------------------------------------------------------------------

    /// Subtract `cost` from an entity's energy, clamped to
    /// `[0, max_energy]`. Returns the new energy.
    pub fn spend_energy(&mut self, id: EntityId, cost: f64) -> Result<f64, WorldError> {
        let record = self
            .registry
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let max = self.ruleset.for_role(record.role).max_energy;
        let mut energy = (record.energy - cost).clamp(0.0, max);
        if energy < ENERGY_EPSILON {
            energy = 0.0;
        }
        record.energy = energy;
        Ok(energy)
    }

    /// Add `delta` (possibly negative) to an entity's reproduction progress,
    /// clamped to `[0, reproduction_required]`. Returns the new progress.
    pub fn adjust_progress(&mut self, id: EntityId, delta: f64) -> Result<f64, WorldError> {
        let record = self
            .registry
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        let required = self.ruleset.for_role(record.role).reproduction_required;
        record.reproduction_progress = (record.reproduction_progress + delta).clamp(0.0, required);
        Ok(record.reproduction_progress)
    }

    /// Reset an entity's reproduction progress to zero.
    pub fn reset_progress(&mut self, id: EntityId) -> Result<(), WorldError> {
        let record = self
            .registry
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        record.reproduction_progress = 0.0;
        Ok(())
    }

    /// Set the advisory proximity flag.
    pub fn set_in_range(&mut self, id: EntityId, in_range: bool) -> Result<(), WorldError> {
        let record = self
            .registry
            .get_mut(id)
            .ok_or(WorldError::EntityNotFound(id))?;
        record.in_reproduction_range = in_range;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Signals
    // -----------------------------------------------------------------------

    /// Queue a reward for `entity`.
    pub fn emit_reward(&mut self, entity: EntityId, amount: f64, reason: RewardReason) {
        self.signals.push(Signal::Reward {
            entity,
            amount,
            reason,
        });
    }

    /// Take every queued signal in emission order.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    /// Number of queued signals.
    pub fn pending_signals(&self) -> usize {
        self.signals.len()
    }

    // -----------------------------------------------------------------------
    // Randomness
    // -----------------------------------------------------------------------

    /// A uniformly random in-bounds cell.
    pub fn random_cell(&mut self) -> Cell {
        let max_x = i32::try_from(self.bounds.width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(self.bounds.height).unwrap_or(i32::MAX);
        Cell::new(
            self.rng.random_range(0..max_x),
            self.rng.random_range(0..max_y),
        )
    }

    /// A uniformly random cell in the square of half-width `radius` around
    /// `center`. The result may lie out of bounds.
    pub fn random_cell_near(&mut self, center: Cell, radius: u32) -> Option<Cell> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let lo = 0_i32.saturating_sub(r);
        let dx = self.rng.random_range(lo..=r);
        let dy = self.rng.random_range(lo..=r);
        center.offset(dx, dy)
    }

    // -----------------------------------------------------------------------
    // Raster
    // -----------------------------------------------------------------------

    /// Recolor cells dirtied since the last sync. See
    /// [`DirtyRegionTracker::sync`].
    pub fn sync_raster(&mut self, target: Option<&mut RasterBuffer>) -> usize {
        self.dirty.sync(&self.grid, &self.registry, target)
    }

    // -----------------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------------

    /// Verify grid/registry agreement, counter accuracy, and value bounds.
    pub fn check_consistency(&self) -> Result<(), WorldError> {
        for record in self.registry.records() {
            if !self.bounds.contains(record.cell) {
                return Err(violation(format!(
                    "entity {} at out-of-bounds cell {}",
                    record.id, record.cell
                )));
            }
            if !self.grid.occupants(record.cell).contains(&record.id) {
                return Err(violation(format!(
                    "entity {} not indexed at its cell {}",
                    record.id, record.cell
                )));
            }
            let settings = self.settings(record.role);
            if !(0.0..=settings.max_energy).contains(&record.energy) {
                return Err(violation(format!(
                    "entity {} energy {} outside [0, {}]",
                    record.id, record.energy, settings.max_energy
                )));
            }
            if !(0.0..=settings.reproduction_required).contains(&record.reproduction_progress) {
                return Err(violation(format!(
                    "entity {} reproduction progress {} outside [0, {}]",
                    record.id, record.reproduction_progress, settings.reproduction_required
                )));
            }
        }
        for (cell, ids) in self.grid.entries() {
            for id in ids {
                match self.registry.get(*id) {
                    Some(record) if record.cell == cell => {}
                    Some(record) => {
                        return Err(violation(format!(
                            "entity {id} indexed at {cell} but recorded at {}",
                            record.cell
                        )));
                    }
                    None => {
                        return Err(violation(format!("dead entity {id} indexed at {cell}")));
                    }
                }
            }
        }
        let recount = self.registry.recount();
        if recount != self.registry.counts() {
            return Err(violation(format!(
                "population counters {:?} disagree with registry {recount:?}",
                self.registry.counts()
            )));
        }
        Ok(())
    }
}

fn violation(reason: String) -> WorldError {
    WorldError::InvariantViolation { reason }
}
