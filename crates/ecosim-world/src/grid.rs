//! Spatial index from cells to the entities occupying them.
//!
//! The index is a sparse map: cells with no occupants have no entry, and
//! removing the last occupant drops the entry. Queries never fail; an
//! unknown cell reads as a shared empty set.

use std::collections::{BTreeMap, BTreeSet};

use ecosim_types::{Bounds, Cell, EntityId};

/// Occupant set returned for cells with no entry.
static NO_OCCUPANTS: BTreeSet<EntityId> = BTreeSet::new();

/// Maps each occupied cell to the set of entities standing on it.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    cells: BTreeMap<Cell, BTreeSet<EntityId>>,
}

impl GridIndex {
    /// Create an empty index.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    /// Index `id` at `cell`. Returns `false` if it was already indexed there.
    pub fn insert(&mut self, cell: Cell, id: EntityId) -> bool {
        self.cells.entry(cell).or_default().insert(id)
    }

    /// Remove `id` from `cell`. Returns `false` if it was not indexed there.
    pub fn remove(&mut self, cell: Cell, id: EntityId) -> bool {
        let Some(occupants) = self.cells.get_mut(&cell) else {
            return false;
        };
        let removed = occupants.remove(&id);
        if occupants.is_empty() {
            self.cells.remove(&cell);
        }
        removed
    }

    /// Entities at `cell`, in ascending id order.
    pub fn occupants(&self, cell: Cell) -> &BTreeSet<EntityId> {
        self.cells.get(&cell).unwrap_or(&NO_OCCUPANTS)
    }

    /// The lowest-id occupant of `cell`, if any.
    pub fn first_occupant(&self, cell: Cell) -> Option<EntityId> {
        self.occupants(cell).first().copied()
    }

    /// Whether nothing occupies `cell`.
    pub fn is_empty(&self, cell: Cell) -> bool {
        !self.cells.contains_key(&cell)
    }

    /// All entities in the inclusive square of half-width `radius` around
    /// `center` (Chebyshev distance `<= radius`), clipped to `bounds`.
    ///
    /// Work is bounded by the smaller of the clipped box and the number of
    /// occupied cells, so an oversized radius costs no more than a full scan.
    pub fn occupants_in_radius(
        &self,
        center: Cell,
        radius: u32,
        bounds: Bounds,
    ) -> BTreeSet<EntityId> {
        let r = i64::from(radius);
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        let x_lo = cx.saturating_sub(r).max(0);
        let y_lo = cy.saturating_sub(r).max(0);
        let x_hi = cx
            .saturating_add(r)
            .min(i64::from(bounds.width).saturating_sub(1));
        let y_hi = cy
            .saturating_add(r)
            .min(i64::from(bounds.height).saturating_sub(1));

        let mut found = BTreeSet::new();
        if x_hi < x_lo || y_hi < y_lo {
            return found;
        }

        let span_x = x_hi.saturating_sub(x_lo).saturating_add(1);
        let span_y = y_hi.saturating_sub(y_lo).saturating_add(1);
        let box_cells = u64::try_from(span_x.saturating_mul(span_y)).unwrap_or(u64::MAX);
        let occupied = u64::try_from(self.cells.len()).unwrap_or(u64::MAX);

        if occupied < box_cells {
            for (cell, ids) in &self.cells {
                let (x, y) = (i64::from(cell.x), i64::from(cell.y));
                if (x_lo..=x_hi).contains(&x) && (y_lo..=y_hi).contains(&y) {
                    found.extend(ids.iter().copied());
                }
            }
            return found;
        }

        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
                    continue;
                };
                found.extend(self.occupants(Cell::new(x, y)).iter().copied());
            }
        }
        found
    }

    /// Iterate occupied cells with their occupants.
    pub fn entries(&self) -> impl Iterator<Item = (Cell, &BTreeSet<EntityId>)> {
        self.cells.iter().map(|(cell, ids)| (*cell, ids))
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
