//! Error types for the `ecosim-world` crate.
//!
//! Expected rejections (a blocked move, an exhausted placement search, a
//! full population) are ordinary return values and never appear here.
//! Every variant of [`WorldError`] is a breach the caller cannot recover
//! from within the current run.

use ecosim_types::{Cell, EntityId, Role};

/// Errors raised by world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An operation referenced an entity that is not in the registry.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A cell outside the world bounds was handed to a mutating operation.
    #[error("cell {0} is outside the world bounds")]
    CellOutOfBounds(Cell),

    /// The world was configured with a zero-sized extent.
    #[error("invalid world bounds {width}x{height}")]
    InvalidBounds {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },

    /// A per-role live counter would have dropped below zero.
    #[error("population counter underflow for role {0}")]
    CounterUnderflow(Role),

    /// The monotonic id counter ran out of values.
    #[error("entity id space exhausted")]
    IdSpaceExhausted,

    /// The grid index and the registry disagree, or a bounded value left
    /// its range.
    #[error("world invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the broken invariant.
        reason: String,
    },
}
