//! Hexagonal lattice geometry
//!
//! Rows hang below the ceiling. Row `r` sits `r * row_height` under
//! `ceiling_y`; staggered rows are shifted right by one radius and hold one
//! bubble fewer. Which rows are staggered is decided by the stagger of the
//! current top row: every other row below it alternates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BUBBLE_RADIUS, GRID_SPACING};
use crate::row_height;

/// Slots closer than this are the same slot (absorbs float drift from shifts)
const SLOT_EPSILON: f32 = GRID_SPACING * 0.25;

/// Lattice dimensions and the moving ceiling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// Row width in bubble diameters
    pub width: u32,
    pub radius: f32,
    pub spacing: f32,
    /// Y of the top row centres
    pub ceiling_y: f32,
}

impl Lattice {
    pub fn new(width: u32) -> Self {
        Self {
            width,
            radius: BUBBLE_RADIUS,
            spacing: GRID_SPACING,
            ceiling_y: BUBBLE_RADIUS,
        }
    }

    #[inline]
    pub fn row_height(&self) -> f32 {
        row_height(self.spacing)
    }

    /// Board width in board units
    #[inline]
    pub fn abstract_width(&self) -> f32 {
        self.width as f32 * self.spacing
    }

    /// Bubbles in a row with the given stagger
    #[inline]
    pub fn row_len(&self, staggered: bool) -> u32 {
        self.width - u32::from(staggered)
    }

    /// Whether row `row` is staggered, given the stagger of row 0
    #[inline]
    pub fn is_staggered(row: i32, top_row_staggered: bool) -> bool {
        top_row_staggered ^ (row.rem_euclid(2) == 1)
    }

    /// Centre of the slot at `(row, col)`
    pub fn slot(&self, row: i32, col: i32, staggered: bool) -> Vec2 {
        let x_offset = if staggered { self.radius } else { 0.0 };
        Vec2::new(
            col as f32 * self.spacing + self.radius + x_offset,
            row as f32 * self.row_height() + self.ceiling_y,
        )
    }

    /// Row index nearest to a y coordinate (may be negative above the ceiling)
    #[inline]
    pub fn row_of(&self, y: f32) -> i32 {
        ((y - self.ceiling_y) / self.row_height()).round() as i32
    }

    /// Nearest theoretical slot to `pos`, ignoring occupancy and walls
    pub fn nearest_slot(&self, pos: Vec2, top_row_staggered: bool) -> Vec2 {
        let row = self.row_of(pos.y);
        let staggered = Self::is_staggered(row, top_row_staggered);
        let x_offset = if staggered { self.radius } else { 0.0 };
        let col = ((pos.x - x_offset - self.radius) / self.spacing).round() as i32;
        self.slot(row, col, staggered)
    }

    /// True when `slot` lies between the side walls and not above the ceiling
    pub fn in_bounds(&self, slot: Vec2) -> bool {
        let eps = SLOT_EPSILON;
        slot.x >= self.radius - eps
            && slot.x <= self.abstract_width() - self.radius + eps
            && slot.y >= self.ceiling_y - eps
    }

    /// All slots of the top row
    pub fn top_row(&self, top_row_staggered: bool) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.row_len(top_row_staggered) as i32).map(move |col| self.slot(0, col, top_row_staggered))
    }

    /// Offsets to the six lattice neighbours (0°, 60°, ... 300°)
    pub fn neighbor_offsets(&self) -> [Vec2; 6] {
        std::array::from_fn(|i| {
            let angle = std::f32::consts::FRAC_PI_3 * i as f32;
            Vec2::new(angle.cos(), angle.sin()) * self.spacing
        })
    }

    /// Whether two positions name the same slot
    #[inline]
    pub fn same_slot(a: Vec2, b: Vec2) -> bool {
        a.distance_squared(b) < SLOT_EPSILON * SLOT_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_layout() {
        let lattice = Lattice::new(7);
        assert_eq!(lattice.row_len(false), 7);
        assert_eq!(lattice.row_len(true), 6);

        let a = lattice.slot(0, 0, false);
        assert_eq!(a, Vec2::new(1.0, 1.0));
        let b = lattice.slot(1, 0, true);
        assert!((b.x - 2.0).abs() < 1e-6);
        assert!((b.y - (1.0 + 3.0_f32.sqrt())).abs() < 1e-5);
    }

    #[test]
    fn test_neighbor_offsets_land_on_lattice() {
        let lattice = Lattice::new(8);
        let centre = lattice.slot(2, 3, false);
        for offset in lattice.neighbor_offsets() {
            let p = centre + offset;
            let snapped = lattice.nearest_slot(p, false);
            assert!(Lattice::same_slot(p, snapped), "{p:?} vs {snapped:?}");
        }
    }

    #[test]
    fn test_stagger_follows_top_row() {
        assert!(!Lattice::is_staggered(0, false));
        assert!(Lattice::is_staggered(1, false));
        assert!(Lattice::is_staggered(0, true));
        assert!(!Lattice::is_staggered(1, true));
        assert!(!Lattice::is_staggered(-1, true));
    }

    #[test]
    fn test_nearest_slot_respects_top_stagger() {
        let lattice = Lattice::new(9);
        let p = Vec2::new(2.2, 1.1);
        assert_eq!(lattice.nearest_slot(p, false), Vec2::new(3.0, 1.0));
        assert_eq!(lattice.nearest_slot(p, true), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_bounds() {
        let lattice = Lattice::new(7);
        assert!(lattice.in_bounds(Vec2::new(1.0, 1.0)));
        assert!(lattice.in_bounds(Vec2::new(13.0, 4.0)));
        assert!(!lattice.in_bounds(Vec2::new(-1.0, 1.0)));
        assert!(!lattice.in_bounds(Vec2::new(15.0, 1.0)));
        assert!(!lattice.in_bounds(Vec2::new(3.0, 1.0 - lattice.row_height())));
    }
}
