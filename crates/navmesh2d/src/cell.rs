use crate::RegionId;

/// A cell of a [`RasterizationGrid`](crate::RasterizationGrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Whether an obstacle covers this cell.
    pub obstacle: bool,
    /// Chamfer distance to the closest obstacle cell, in half-cell units.
    /// Orthogonal steps count 2 and diagonal steps count 3.
    ///
    /// Is `u32::MAX` until the distance field is built, and 0 for obstacles.
    pub distance_to_obstacle: u32,
    /// The region this cell belongs to. [`RegionId::NONE`] for obstacles.
    pub region: RegionId,
    /// Distance to the core of [`Cell::region`], measured like [`Cell::distance_to_obstacle`].
    /// Cells that seeded their region have 0.
    pub distance_to_region_core: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            obstacle: false,
            distance_to_obstacle: u32::MAX,
            region: RegionId::NONE,
            distance_to_region_core: 0,
        }
    }
}

impl Cell {
    /// Marks the cell as covered by an obstacle.
    #[inline]
    pub fn set_obstacle(&mut self) {
        self.obstacle = true;
        self.distance_to_obstacle = 0;
    }

    /// Whether the cell belongs to a region.
    #[inline]
    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }
}
