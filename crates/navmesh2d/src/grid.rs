//! The grid module contains the [`RasterizationGrid`] every build stage works on.
//!
//! The grid covers the requested area plus a ring of one cell on each side. That ring is closed
//! as an obstacle by [`RasterizationGrid::build_distance_field`], so the border of the area
//! behaves like a wall.

use glam::Vec2;
use thiserror::Error;

use crate::{Aabb2d, Cell};

/// A 2D grid of [`Cell`]s. Build with [`GridBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizationGrid {
    /// The number of cells along the x-axis, padding ring included
    pub width: u16,
    /// The number of cells along the y-axis, padding ring included
    pub height: u16,
    /// World position of the top-left corner of cell (0, 0)
    pub origin: Vec2,
    /// The width and height of each cell in world units
    pub cell_size: f32,
    /// The cells in row-major order, i.e. `x + y * width`
    pub cells: Vec<Cell>,
    /// The number of regions created by [`RasterizationGrid::build_regions`].
    /// Region ids go from 1 to `region_count`.
    pub region_count: u16,
}

impl RasterizationGrid {
    /// Creates a grid covering the area from (`left`, `top`) to (`right`, `bottom`).
    ///
    /// Shorthand for [`GridBuilder::build`].
    pub fn new(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        cell_size: f32,
    ) -> Result<Self, GridBuilderError> {
        GridBuilder {
            aabb: Aabb2d::new([left, top], [right, bottom]),
            cell_size,
        }
        .build()
    }

    #[inline]
    pub(crate) fn index(&self, x: i32, y: i32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    /// Whether the coordinates lie inside the grid.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Returns the cell at the given coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn cell_at(&self, x: u16, y: u16) -> &Cell {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) is outside of the {}x{} grid",
            self.width,
            self.height
        );
        &self.cells[self.index(x as i32, y as i32)]
    }

    /// Returns a mutable reference to the cell at the given coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn cell_at_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) is outside of the {}x{} grid",
            self.width,
            self.height
        );
        let index = self.index(x as i32, y as i32);
        &mut self.cells[index]
    }

    /// Returns the cell at the given coordinates, or `None` if they are out of bounds.
    #[inline]
    pub fn get_cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        if !self.contains(x, y) {
            return None;
        }
        self.cells.get(self.index(x, y))
    }

    /// Converts a world position to (fractional) grid coordinates. No rounding is applied.
    #[inline]
    pub fn world_to_grid(&self, position: Vec2) -> Vec2 {
        (position - self.origin) / self.cell_size
    }

    /// Converts (fractional) grid coordinates back to a world position.
    #[inline]
    pub fn grid_to_world(&self, position: Vec2) -> Vec2 {
        position * self.cell_size + self.origin
    }

    /// The largest [`Cell::distance_to_obstacle`] of the grid.
    pub fn max_distance(&self) -> u32 {
        self.cells
            .iter()
            .map(|cell| cell.distance_to_obstacle)
            .max()
            .unwrap_or_default()
    }

    /// The number of cells covered by obstacles.
    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.obstacle).count()
    }
}

/// A builder for [`RasterizationGrid`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBuilder {
    /// The area to cover, in world units
    pub aabb: Aabb2d,
    /// The width and height of each cell in world units
    pub cell_size: f32,
}

impl GridBuilder {
    /// Builds the grid. All cells start free, with an infinite obstacle distance and no region.
    pub fn build(self) -> Result<RasterizationGrid, GridBuilderError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GridBuilderError::InvalidCellSize {
                cell_size: self.cell_size,
            });
        }
        let size = self.aabb.size();
        if !(size.is_finite() && size.x >= 0.0 && size.y >= 0.0) {
            return Err(GridBuilderError::InvalidBounds { aabb: self.aabb });
        }
        let width = 2.0 + (size.x / self.cell_size).ceil();
        let height = 2.0 + (size.y / self.cell_size).ceil();
        if width > u16::MAX as f32 || height > u16::MAX as f32 {
            return Err(GridBuilderError::TooManyCells { width, height });
        }
        let width = width as u16;
        let height = height as u16;
        Ok(RasterizationGrid {
            width,
            height,
            origin: self.aabb.min - Vec2::splat(self.cell_size),
            cell_size: self.cell_size,
            cells: vec![Cell::default(); width as usize * height as usize],
            region_count: 0,
        })
    }
}

/// Errors that can occur when building a [`RasterizationGrid`] with [`GridBuilder::build`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridBuilderError {
    /// Happens when the cell size is zero, negative or not a number.
    #[error("Cell size must be a positive finite number, got {cell_size}")]
    InvalidCellSize {
        /// The rejected cell size
        cell_size: f32,
    },
    /// Happens when the area has its min corner after its max corner, or is not finite.
    #[error("Bounds must be finite with min <= max, got {aabb:?}")]
    InvalidBounds {
        /// The rejected area
        aabb: Aabb2d,
    },
    /// Happens when a side of the grid would need more cells than fit in a `u16`.
    #[error("Grid is too large, got {width}x{height} cells but the max per axis is {max}", max = u16::MAX)]
    TooManyCells {
        /// The cell count along the x-axis, padding ring included
        width: f32,
        /// The cell count along the y-axis, padding ring included
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> RasterizationGrid {
        RasterizationGrid::new(0.0, 0.0, 320.0, 320.0, 20.0).unwrap()
    }

    #[test]
    fn grid_has_a_padding_ring() {
        let grid = grid();
        assert_eq!(grid.width, 18);
        assert_eq!(grid.height, 18);
        assert_eq!(grid.origin, Vec2::new(-20.0, -20.0));
        assert_eq!(grid.cells.len(), 18 * 18);
    }

    #[test]
    fn partial_cells_are_rounded_up() {
        let grid = RasterizationGrid::new(0.0, 0.0, 340.0, 330.0, 20.0).unwrap();
        assert_eq!(grid.width, 19);
        assert_eq!(grid.height, 19);
    }

    #[test]
    fn converts_between_world_and_grid() {
        let grid = grid();
        assert_eq!(grid.world_to_grid(Vec2::new(0.0, 0.0)), Vec2::new(1.0, 1.0));
        assert_eq!(grid.world_to_grid(Vec2::new(30.0, 50.0)), Vec2::new(2.5, 3.5));
        assert_eq!(grid.grid_to_world(Vec2::new(2.5, 3.5)), Vec2::new(30.0, 50.0));
    }

    #[test]
    fn can_access_cells() {
        let mut grid = grid();
        grid.cell_at_mut(3, 4).set_obstacle();
        assert!(grid.cell_at(3, 4).obstacle);
        assert!(!grid.cell_at(4, 3).obstacle);
        assert!(grid.get_cell_at(3, 4).unwrap().obstacle);
        assert_eq!(grid.get_cell_at(-1, 0), None);
        assert_eq!(grid.get_cell_at(0, 18), None);
        assert_eq!(grid.obstacle_count(), 1);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_access_panics() {
        grid().cell_at(18, 0);
    }

    #[test]
    fn rejects_invalid_cell_size() {
        assert!(matches!(
            RasterizationGrid::new(0.0, 0.0, 10.0, 10.0, 0.0),
            Err(GridBuilderError::InvalidCellSize { .. })
        ));
        assert!(matches!(
            RasterizationGrid::new(0.0, 0.0, 10.0, 10.0, f32::NAN),
            Err(GridBuilderError::InvalidCellSize { .. })
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        assert!(matches!(
            RasterizationGrid::new(10.0, 0.0, 0.0, 10.0, 1.0),
            Err(GridBuilderError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn rejects_huge_grids() {
        assert!(matches!(
            RasterizationGrid::new(0.0, 0.0, 1.0e6, 10.0, 1.0),
            Err(GridBuilderError::TooManyCells { .. })
        ));
    }
}
