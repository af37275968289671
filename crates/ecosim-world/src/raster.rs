//! Dirty-region tracking and the derived raster view.
//!
//! Every occupancy change marks its cell dirty. A sync recolors only the
//! pending cells, so its cost follows mutation volume rather than map
//! area. A version counter bumped by every mark, compared against the
//! version of the last completed sync, makes a repeat sync with no
//! intervening mutation a no-op independent of wall-clock timing.

use std::collections::BTreeSet;

use serde::Serialize;

use ecosim_types::{Bounds, Cell, Role, Rgba};

use crate::grid::GridIndex;
use crate::registry::EntityRegistry;

/// Color a role contributes to its cell.
pub const fn role_color(role: Role) -> Rgba {
    match role {
        Role::Grazer => Rgba::new(0, 255, 0, 0),
        Role::Predator => Rgba::new(255, 0, 0, 0),
        Role::Hunter => Rgba::new(0, 0, 255, 0),
    }
}

/// Color of an empty cell.
pub const BASELINE_COLOR: Rgba = Rgba::BLACK;

/// A width x height RGBA frame, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterBuffer {
    bounds: Bounds,
    pixels: Vec<Rgba>,
}

impl RasterBuffer {
    /// A frame filled with [`BASELINE_COLOR`].
    pub fn new(bounds: Bounds) -> Self {
        let len = usize::try_from(bounds.area()).unwrap_or(0);
        Self {
            bounds,
            pixels: vec![BASELINE_COLOR; len],
        }
    }

    /// Frame extent.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Color at `cell`, or `None` when out of bounds.
    pub fn pixel(&self, cell: Cell) -> Option<Rgba> {
        let index = self.bounds.linear_index(cell)?;
        self.pixels.get(index).copied()
    }

    /// Write one pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, cell: Cell, color: Rgba) -> bool {
        let Some(index) = self.bounds.linear_index(cell) else {
            return false;
        };
        self.pixels.get_mut(index).is_some_and(|slot| {
            *slot = color;
            true
        })
    }

    /// Flatten to `r, g, b, a` bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }
}

/// Additive blend of every occupant's role color over the baseline.
pub fn cell_color(grid: &GridIndex, registry: &EntityRegistry, cell: Cell) -> Rgba {
    grid.occupants(cell)
        .iter()
        .filter_map(|id| registry.get(*id))
        .fold(BASELINE_COLOR, |acc, record| {
            acc.saturating_add(role_color(record.role))
        })
}

/// Pending set of cells whose occupancy changed since the last sync.
#[derive(Debug, Clone, Default)]
pub struct DirtyRegionTracker {
    pending: BTreeSet<Cell>,
    version: u64,
    synced_version: u64,
}

impl DirtyRegionTracker {
    /// An empty tracker.
    pub const fn new() -> Self {
        Self {
            pending: BTreeSet::new(),
            version: 0,
            synced_version: 0,
        }
    }

    /// Record that `cell` needs recoloring.
    pub fn mark_dirty(&mut self, cell: Cell) {
        self.pending.insert(cell);
        self.version = self.version.wrapping_add(1);
    }

    /// Number of cells awaiting sync.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `cell` is awaiting sync.
    pub fn is_pending(&self, cell: Cell) -> bool {
        self.pending.contains(&cell)
    }

    /// Mutation version, bumped by every [`Self::mark_dirty`].
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether the last completed sync saw the current version.
    pub const fn is_synced(&self) -> bool {
        self.version == self.synced_version
    }

    /// Recolor every pending cell into `target` and clear the pending set.
    ///
    /// Returns the number of cells recomputed. With no target the call does
    /// nothing and the pending set is kept for a later sync.
    pub fn sync(
        &mut self,
        grid: &GridIndex,
        registry: &EntityRegistry,
        target: Option<&mut RasterBuffer>,
    ) -> usize {
        if self.is_synced() {
            return 0;
        }
        let Some(buffer) = target else {
            return 0;
        };
        let mut recomputed: usize = 0;
        for cell in std::mem::take(&mut self.pending) {
            buffer.set_pixel(cell, cell_color(grid, registry, cell));
            recomputed = recomputed.saturating_add(1);
        }
        self.synced_version = self.version;
        tracing::trace!(recomputed, version = self.version, "raster synced");
        recomputed
    }
}
