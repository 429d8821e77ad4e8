use crate::RasterizationGrid;

/// Cost of an orthogonal step in the chamfer distance.
pub(crate) const ORTHOGONAL_STEP: u32 = 2;
/// Cost of a diagonal step in the chamfer distance.
pub(crate) const DIAGONAL_STEP: u32 = 3;

/// Neighbors already visited when sweeping row-major, with the cost of reaching them.
const FORWARD_PASS: [(i32, i32, u32); 4] = [
    (-1, 0, ORTHOGONAL_STEP),
    (-1, -1, DIAGONAL_STEP),
    (0, -1, ORTHOGONAL_STEP),
    (1, -1, DIAGONAL_STEP),
];

/// Neighbors already visited when sweeping in reverse row-major order.
const BACKWARD_PASS: [(i32, i32, u32); 4] = [
    (1, 0, ORTHOGONAL_STEP),
    (1, 1, DIAGONAL_STEP),
    (0, 1, ORTHOGONAL_STEP),
    (-1, 1, DIAGONAL_STEP),
];

impl RasterizationGrid {
    /// Computes [`Cell::distance_to_obstacle`](crate::Cell::distance_to_obstacle) for every cell.
    ///
    /// The padding ring around the grid is marked as obstacle first, so the edge of the area
    /// counts as a wall. Distances are chamfer distances where an orthogonal step costs 2 and a
    /// diagonal one 3, so every free cell ends up with a distance of at least 2.
    ///
    /// Must run after the obstacles were rasterized and before [`RasterizationGrid::build_regions`].
    pub fn build_distance_field(&mut self) {
        let _span = tracing::trace_span!("build_distance_field").entered();
        self.close_padding_ring();
        if self.width < 3 || self.height < 3 {
            // Nothing but padding
            return;
        }

        let width = self.width as i32;
        let height = self.height as i32;
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                self.relax_distance(x, y, &FORWARD_PASS);
            }
        }
        for y in (1..height - 1).rev() {
            for x in (1..width - 1).rev() {
                self.relax_distance(x, y, &BACKWARD_PASS);
            }
        }
    }

    fn close_padding_ring(&mut self) {
        let width = self.width as i32;
        let height = self.height as i32;
        for x in 0..width {
            for y in [0, height - 1] {
                let index = self.index(x, y);
                self.cells[index].set_obstacle();
            }
        }
        for y in 0..height {
            for x in [0, width - 1] {
                let index = self.index(x, y);
                self.cells[index].set_obstacle();
            }
        }
    }

    #[inline]
    fn relax_distance(&mut self, x: i32, y: i32, neighbors: &[(i32, i32, u32)]) {
        let index = self.index(x, y);
        let mut distance = self.cells[index].distance_to_obstacle;
        for (dx, dy, step) in neighbors {
            let neighbor = &self.cells[self.index(x + dx, y + dy)];
            distance = distance.min(neighbor.distance_to_obstacle.saturating_add(*step));
        }
        self.cells[index].distance_to_obstacle = distance;
    }
}
