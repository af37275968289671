//! Grid world state and lifecycle rules for the Ecosim simulation.
//!
//! The [`World`] object owns everything a run mutates: the spatial index,
//! the entity registry, the dirty-cell tracker, per-role settings, a
//! seeded random source, and the outbound signal queue. The rule modules
//! operate on it by reference.
//!
//! # Modules
//!
//! - [`error`] -- [`WorldError`] for invariant breaches.
//! - [`grid`] -- [`GridIndex`], cell to occupant-set map with radius queries.
//! - [`registry`] -- [`EntityRegistry`], live records and per-role counters.
//! - [`settings`] -- [`RoleSettings`] tunables and the per-role [`Ruleset`].
//! - [`rules`] -- The closed per-role rule table.
//! - [`movement`] -- Move resolution, predation included.
//! - [`reproduction`] -- Proximity progress and threshold spawning.
//! - [`population`] -- Floors, baseline seeding, and resets.
//! - [`raster`] -- Dirty tracking and the derived RGBA frame.
//! - [`world`] -- The owning [`World`] object.

pub mod error;
pub mod grid;
pub mod movement;
pub mod population;
pub mod raster;
pub mod registry;
pub mod reproduction;
pub mod rules;
pub mod settings;
pub mod world;

pub use error::WorldError;
pub use grid::GridIndex;
pub use movement::resolve_move;
pub use population::PopulationController;
pub use raster::{BASELINE_COLOR, DirtyRegionTracker, RasterBuffer, cell_color, role_color};
pub use registry::{EntityRegistry, NewEntity};
pub use reproduction::{ReproductionOutcome, apply_reproduction};
pub use rules::{MovePolicy, RoleRules, role_rules};
pub use settings::{RoleSettings, Ruleset};
pub use world::{ENERGY_EPSILON, World, WorldParams};
