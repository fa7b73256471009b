//! Tile collision grid
//!
//! Sparse map from integer cell coordinates to "solid". Keys are converted to
//! cells once, with `floor(pixel / tile_size)`, so lookups never compare
//! floating-point coordinates.

use macroquad::prelude::*;
use std::collections::HashMap;

/// Cells checked around a body, as offsets from its own cell
pub const NEIGHBORHOOD: [IVec2; 9] = [
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
];

#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    tile_size: f32,
    cells: HashMap<IVec2, bool>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(16.0)
    }
}

impl TileGrid {
    pub fn new(tile_size: f32) -> Self {
        Self {
            tile_size,
            cells: HashMap::new(),
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn set_solid(&mut self, cell: IVec2, solid: bool) {
        self.cells.insert(cell, solid);
    }

    pub fn is_solid(&self, cell: IVec2) -> bool {
        self.cells.get(&cell).copied().unwrap_or(false)
    }

    /// Number of solid cells
    pub fn solid_count(&self) -> usize {
        self.cells.values().filter(|&&solid| solid).count()
    }

    /// Solid cells, in no particular order
    pub fn solid_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.cells.iter().filter(|(_, &solid)| solid).map(|(&cell, _)| cell)
    }

    /// Cell containing a pixel-space point
    pub fn cell_at(&self, point: Vec2) -> IVec2 {
        (point / self.tile_size).floor().as_ivec2()
    }

    /// Pixel-space rectangle covered by a cell
    pub fn cell_rect(&self, cell: IVec2) -> Rect {
        Rect::new(
            cell.x as f32 * self.tile_size,
            cell.y as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Rectangles of the solid cells in the 3x3 block around `point`'s cell.
    /// Neighbours past the `i32` range are skipped.
    pub fn rects_around(&self, point: Vec2) -> Vec<Rect> {
        let center = self.cell_at(point);
        NEIGHBORHOOD
            .iter()
            .filter_map(|&offset| neighbor(center, offset))
            .filter(|&cell| self.is_solid(cell))
            .map(|cell| self.cell_rect(cell))
            .collect()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

fn neighbor(center: IVec2, offset: IVec2) -> Option<IVec2> {
    Some(ivec2(center.x.checked_add(offset.x)?, center.y.checked_add(offset.y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rects_around_finds_solid_neighbor() {
        let mut grid = TileGrid::new(16.0);
        grid.set_solid(ivec2(7, 6), true);

        // Every position whose cell is within one step of (7, 6) sees the tile
        for cx in 6..=8 {
            for cy in 5..=7 {
                let pos = vec2(cx as f32 * 16.0 + 3.5, cy as f32 * 16.0 + 15.9);
                let rects = grid.rects_around(pos);
                assert_eq!(rects, vec![Rect::new(112.0, 96.0, 16.0, 16.0)], "cell ({}, {})", cx, cy);
            }
        }

        assert!(grid.rects_around(vec2(9.0 * 16.0, 6.0 * 16.0)).is_empty());
    }

    #[test]
    fn test_empty_and_non_solid_cells_return_nothing() {
        let mut grid = TileGrid::new(16.0);
        assert!(grid.rects_around(vec2(0.0, 0.0)).is_empty());

        grid.set_solid(ivec2(0, 0), false);
        assert!(grid.rects_around(vec2(0.0, 0.0)).is_empty());
        assert_eq!(grid.solid_count(), 0);
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let mut grid = TileGrid::new(16.0);
        assert_eq!(grid.cell_at(vec2(-0.5, -16.0)), ivec2(-1, -1));

        grid.set_solid(ivec2(-1, -1), true);
        assert_eq!(grid.rects_around(vec2(-20.0, 3.0)), vec![Rect::new(-16.0, -16.0, 16.0, 16.0)]);
    }

    #[test]
    fn test_full_neighborhood() {
        let mut grid = TileGrid::new(8.0);
        for offset in NEIGHBORHOOD {
            grid.set_solid(ivec2(10, 10) + offset, true);
        }
        grid.set_solid(ivec2(12, 10), true);

        assert_eq!(grid.rects_around(vec2(84.0, 84.0)).len(), 9);
        assert_eq!(grid.solid_count(), 10);
    }

    #[test]
    fn test_rects_around_at_the_edge_of_cell_range() {
        let mut grid = TileGrid::new(16.0);
        grid.set_solid(ivec2(i32::MAX, i32::MAX - 1), true);
        grid.set_solid(ivec2(i32::MIN, i32::MIN), true);

        // Far past i32 cells: the center saturates and out-of-range neighbours drop out
        assert_eq!(grid.cell_at(vec2(4.0e10, 4.0e10)), ivec2(i32::MAX, i32::MAX));
        assert_eq!(grid.rects_around(vec2(4.0e10, 4.0e10)).len(), 1);
        assert_eq!(grid.rects_around(vec2(-4.0e10, -4.0e10)).len(), 1);
    }
}
