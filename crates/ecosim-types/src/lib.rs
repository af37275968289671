//! Shared type definitions for the Ecosim grid simulation.
//!
//! Every crate in the workspace speaks in these types. Types flow
//! downstream to `TypeScript` via `ts-rs` for the observer dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Opaque entity handles
//! - [`enums`] -- Roles, axis commands, rejection and terminal causes
//! - [`structs`] -- Cells, bounds, colors, entity records, population counts
//! - [`actions`] -- Move requests and their outcomes
//! - [`observation`] -- Per-entity and aggregate observation vectors
//! - [`signals`] -- Reward and terminal signals

pub mod actions;
pub mod enums;
pub mod ids;
pub mod observation;
pub mod signals;
pub mod structs;

pub use actions::{MoveAction, MoveDelta, MoveOutcome};
pub use enums::{AxisCommand, MoveRejection, RewardReason, Role, TerminalCause};
pub use ids::EntityId;
pub use observation::{
    ENTITY_OBSERVATION_SIZE, EntityObservation, WORLD_ENTRY_SIZE, WorldEntry, WorldObservation,
};
pub use signals::Signal;
pub use structs::{Bounds, Cell, EntityRecord, PopulationCounts, Rgba};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::EntityId::export_all();

        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::AxisCommand::export_all();
        let _ = crate::enums::MoveRejection::export_all();
        let _ = crate::enums::TerminalCause::export_all();
        let _ = crate::enums::RewardReason::export_all();

        let _ = crate::structs::Cell::export_all();
        let _ = crate::structs::Bounds::export_all();
        let _ = crate::structs::Rgba::export_all();
        let _ = crate::structs::EntityRecord::export_all();
        let _ = crate::structs::PopulationCounts::export_all();

        let _ = crate::actions::MoveAction::export_all();
        let _ = crate::actions::MoveDelta::export_all();
        let _ = crate::actions::MoveOutcome::export_all();

        let _ = crate::observation::EntityObservation::export_all();
        let _ = crate::observation::WorldEntry::export_all();
        let _ = crate::observation::WorldObservation::export_all();

        let _ = crate::signals::Signal::export_all();
    }
}
