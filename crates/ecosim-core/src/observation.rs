//! Read-only observation view over the world.
//!
//! The decision source never touches the world directly; it receives an
//! [`ObservationView`] that can only project entity and world state into
//! the observation types.

use ecosim_types::{EntityId, EntityObservation, WorldEntry, WorldObservation};
use ecosim_world::World;

/// Borrowed, read-only view handed to the decision source.
#[derive(Debug, Clone, Copy)]
pub struct ObservationView<'a> {
    world: &'a World,
    max_population: u32,
}

impl<'a> ObservationView<'a> {
    /// View `world`, padding world observations to `max_population` entries.
    pub const fn new(world: &'a World, max_population: u32) -> Self {
        Self {
            world,
            max_population,
        }
    }

    /// Observation of one entity, or `None` if it is not alive.
    pub fn entity(&self, id: EntityId) -> Option<EntityObservation> {
        self.world.entity(id).map(EntityObservation::from_record)
    }

    /// Aggregate view of every live entity in ascending id order.
    pub fn world(&self) -> WorldObservation {
        let entries = self
            .world
            .registry()
            .records()
            .map(|r| WorldEntry {
                cell: r.cell,
                role: r.role,
            })
            .collect();
        WorldObservation::new(entries, self.max_population)
    }
}
