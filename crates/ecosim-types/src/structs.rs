//! Core value structs: cells, world bounds, colors, and entity records.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Role;
use crate::ids::EntityId;

/// A discrete grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Create a cell from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this cell by `(dx, dy)`, or `None` on coordinate overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        Some(Self { x, y })
    }
}

impl core::fmt::Display for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fixed world extent. Valid cells lie in `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Bounds {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Bounds {
    /// Create bounds of the given size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `cell` lies inside the world.
    pub fn contains(self, cell: Cell) -> bool {
        let in_x = u32::try_from(cell.x).is_ok_and(|x| x < self.width);
        let in_y = u32::try_from(cell.y).is_ok_and(|y| y < self.height);
        in_x && in_y
    }

    /// Total number of cells.
    pub fn area(self) -> u64 {
        u64::from(self.width).saturating_mul(u64::from(self.height))
    }

    /// Row-major buffer index of `cell`, or `None` when out of bounds.
    pub fn linear_index(self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }

    /// Iterate every in-bounds cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Cell> {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        (0..height).flat_map(move |y| (0..width).map(move |x| Cell::new(x, y)))
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise saturating addition. Commutative and associative, so
    /// blending a set of colors is independent of iteration order.
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            r: self.r.saturating_add(other.r),
            g: self.g.saturating_add(other.g),
            b: self.b.saturating_add(other.b),
            a: self.a.saturating_add(other.a),
        }
    }
}

/// Authoritative state of one live entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntityRecord {
    /// Stable handle.
    pub id: EntityId,
    /// Behavioral class.
    pub role: Role,
    /// Current cell; always mirrored by the grid index.
    pub cell: Cell,
    /// Remaining energy in `[0, max_energy]`.
    pub energy: f64,
    /// Reproduction accumulator in `[0, reproduction_required]`.
    pub reproduction_progress: f64,
    /// Whether the last proximity check found enough same-role neighbors.
    /// Advisory only; exposed through observations.
    pub in_reproduction_range: bool,
    /// Tick counter value when the entity was created.
    pub born_at_tick: u64,
}

/// Live entity counts per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationCounts {
    /// Live grazers.
    pub grazers: u32,
    /// Live predators.
    pub predators: u32,
    /// Live hunters.
    pub hunters: u32,
}

impl PopulationCounts {
    /// Count for a single role.
    pub const fn get(&self, role: Role) -> u32 {
        match role {
            Role::Grazer => self.grazers,
            Role::Predator => self.predators,
            Role::Hunter => self.hunters,
        }
    }

    /// Mutable count for a single role.
    pub const fn get_mut(&mut self, role: Role) -> &mut u32 {
        match role {
            Role::Grazer => &mut self.grazers,
            Role::Predator => &mut self.predators,
            Role::Hunter => &mut self.hunters,
        }
    }

    /// Sum over all roles.
    pub const fn total(&self) -> u32 {
        self.grazers
            .saturating_add(self.predators)
            .saturating_add(self.hunters)
    }
}
