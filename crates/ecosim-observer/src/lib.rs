//! Observer API server for the Ecosim simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for reading simulation state (status, population,
//!   raster frame)
//! - **Operator REST endpoints** for runtime control (stop, speed, status)
//! - **Minimal HTML page** (`GET /`) showing the current tick and counts
//!
//! # Architecture
//!
//! Handlers read from an in-memory [`ObserverSnapshot`] that the engine
//! refreshes after each tick. The engine only ever `try_write`s the
//! snapshot, so a slow reader delays a refresh rather than the tick loop.
//!
//! [`ObserverSnapshot`]: state::ObserverSnapshot

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod state;

pub use router::build_router;
pub use server::{ServerError, bind, serve, start_server};
pub use state::{AppState, ObserverSnapshot};
