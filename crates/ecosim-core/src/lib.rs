//! Configuration, tick cycle, and scheduling for the Ecosim simulation.
//!
//! # Modules
//!
//! - [`config`] -- Loading `ecosim-config.yaml` into typed structs.
//! - [`clock`] -- Tick counter and the injectable [`TickClock`].
//! - [`decision`] -- [`DecisionSource`] capability with stub and random-walk
//!   implementations.
//! - [`observation`] -- Read-only [`ObservationView`] handed to decisions.
//! - [`operator`] -- Shared stop and speed controls.
//! - [`tick`] -- The single-tick cycle.
//! - [`scheduler`] -- The `Idle -> Running -> Stopped` state machine.
//!
//! [`TickClock`]: clock::TickClock
//! [`DecisionSource`]: decision::DecisionSource
//! [`ObservationView`]: observation::ObservationView

pub mod clock;
pub mod config;
pub mod decision;
pub mod observation;
pub mod operator;
pub mod scheduler;
pub mod tick;
