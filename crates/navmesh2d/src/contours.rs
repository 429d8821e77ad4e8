use glam::{IVec2, Vec2};

use crate::{
    RasterizationGrid, RegionId,
    math::{dir_offset_x, dir_offset_y, distance_point_segment_sq},
};

impl RasterizationGrid {
    /// Traces the outline of every region.
    ///
    /// The raw contours follow the cell borders of the regions exactly. They are then simplified:
    /// - where the neighboring region changes, the vertex is kept. These vertices are the ends of the
    ///   portals between regions and match up between the contours of both regions.
    /// - the rest of a portal is reduced to a straight line.
    /// - borders along obstacles keep the vertices needed to stay within `max_error` cells of the
    ///   raw contour. `0.0` keeps every corner.
    ///
    /// A region with holes or with several neighbors produces several contours. A region made of a
    /// single cell with no same-region neighbor, such as a pocket only reachable diagonally, has no
    /// contour and is skipped with a warning.
    /// Regions must be built with [`RasterizationGrid::build_regions`] first.
    pub fn build_contours(&self, max_error: f32) -> ContourSet {
        let _span = tracing::debug_span!("build_contours", max_error).entered();
        let mut cset = ContourSet {
            contours: Vec::with_capacity(self.region_count.max(8) as usize),
            origin: self.origin,
            cell_size: self.cell_size,
            width: self.width,
            height: self.height,
            max_error,
        };
        if self.width < 3 || self.height < 3 {
            return cset;
        }
        let width = self.width as i32;
        let height = self.height as i32;

        // Mark boundaries
        let mut flags = vec![EdgeFlags::empty(); self.cells.len()];
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let i = self.index(x, y);
                let region = self.cells[i].region;
                if region == RegionId::NONE {
                    continue;
                }
                let mut res = EdgeFlags::empty();
                for dir in 0..4 {
                    let a_i = self.index(x + dir_offset_x(dir), y + dir_offset_y(dir));
                    if self.cells[a_i].region == region {
                        res |= EdgeFlags::from_dir(dir);
                    }
                }
                // Inverse, mark non connected edges.
                let res = res.complement();
                if res == EdgeFlags::all() {
                    tracing::warn!(
                        "Discarded contour: island cell at ({x}, {y}) can't form a contour. Region: {}",
                        region.0
                    );
                    continue;
                }
                flags[i] = res;
            }
        }

        let mut verts = Vec::with_capacity(256);
        let mut simplified = Vec::with_capacity(64);

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let i = self.index(x, y);
                if flags[i].is_empty() {
                    continue;
                }
                let region = self.cells[i].region;
                verts.clear();
                simplified.clear();

                // Choose the first non-connected edge
                let mut start_dir = 0;
                while !flags[i].contains(EdgeFlags::from_dir(start_dir)) {
                    start_dir += 1;
                }
                self.walk_contour(x, y, start_dir, &mut flags, &mut verts);
                simplify_contour(&verts, &mut simplified, max_error);

                if simplified.len() < 3 {
                    tracing::warn!(
                        "Discarded contour: can't form enough valid edges from the vertices. Region: {}",
                        region.0
                    );
                    continue;
                }
                cset.contours.push(Contour {
                    vertices: simplified.iter().map(|&index| verts[index]).collect(),
                    raw_vertices: verts.clone(),
                    region,
                });
            }
        }
        tracing::debug!("Built {} contours", cset.contours.len());
        cset
    }

    /// Walks along the border of the region, keeping the border on the left like a robot
    /// following a wall, and collects the corner to the left of every border side it faces.
    fn walk_contour(
        &self,
        mut x: i32,
        mut y: i32,
        start_dir: u8,
        flags: &mut [EdgeFlags],
        points: &mut Vec<ContourVertex>,
    ) {
        let start_x = x;
        let start_y = y;
        let mut dir = start_dir;
        let region = self.cells[self.index(x, y)].region;
        let max_steps = self.cells.len().max(10_000) * 4;

        for _ in 0..max_steps {
            let i = self.index(x, y);
            let edge = EdgeFlags::from_dir(dir);
            let a_x = x + dir_offset_x(dir);
            let a_y = y + dir_offset_y(dir);
            let neighbor_region = self.cells[self.index(a_x, a_y)].region;
            if flags[i].contains(edge) {
                // Choose the edge corner
                let (p_x, p_y) = match dir {
                    0 => (x, y + 1),
                    1 => (x + 1, y + 1),
                    2 => (x + 1, y),
                    _ => (x, y),
                };
                points.push(ContourVertex {
                    position: IVec2::new(p_x, p_y),
                    neighbor_region,
                });
                flags[i].remove(edge);
                // Rotate clockwise
                dir = (dir + 1) & 0x3;
            } else if neighbor_region == region {
                x = a_x;
                y = a_y;
                // Rotate counterclockwise
                dir = (dir + 3) & 0x3;
            } else {
                // A border that was already walked
                dir = (dir + 1) & 0x3;
            }
            if x == start_x && y == start_y && dir == start_dir {
                return;
            }
        }
        tracing::warn!(
            "Contour walk of region {} starting at ({start_x}, {start_y}) did not close",
            region.0
        );
    }
}

/// Fills `simplified` with the indices of the `raw` vertices to keep.
fn simplify_contour(raw: &[ContourVertex], simplified: &mut Vec<usize>, max_error: f32) {
    let n = raw.len();
    if n == 0 {
        return;
    }
    let next = |i: usize| (i + 1) % n;

    // Add the vertices where the neighboring region changes.
    for i in 0..n {
        if raw[i].neighbor_region != raw[next(i)].neighbor_region {
            simplified.push(i);
        }
    }
    let has_portals = !simplified.is_empty();
    if !has_portals {
        // The whole contour borders the same thing, so there are no mandatory vertices.
        // Start with the lower-left and upper-right vertices.
        let mut lower_left = 0;
        let mut upper_right = 0;
        for (i, vertex) in raw.iter().enumerate() {
            let p = vertex.position;
            let ll = raw[lower_left].position;
            if p.x < ll.x || (p.x == ll.x && p.y < ll.y) {
                lower_left = i;
            }
            let ur = raw[upper_right].position;
            if p.x > ur.x || (p.x == ur.x && p.y > ur.y) {
                upper_right = i;
            }
        }
        simplified.push(lower_left);
        simplified.push(upper_right);
    }

    // Add points until all raw points are within error tolerance of the simplified shape.
    let max_error_sq = max_error * max_error;
    let mut i = 0;
    while i < simplified.len() {
        let a_index = simplified[i];
        let b_index = simplified[(i + 1) % simplified.len()];
        let a = raw[a_index].position.as_vec2();
        let b = raw[b_index].position.as_vec2();

        // Portals stay straight, only obstacle borders follow the raw contour.
        let mut tested = next(a_index);
        let refine = !has_portals || raw[tested].neighbor_region == RegionId::NONE;
        let mut max_deviation = 0.0;
        let mut max_index = None;
        if refine {
            while tested != b_index {
                let deviation = distance_point_segment_sq(raw[tested].position.as_vec2(), a, b);
                if deviation > max_deviation {
                    max_deviation = deviation;
                    max_index = Some(tested);
                }
                tested = next(tested);
            }
        }

        match max_index {
            Some(max_index) if max_deviation > max_error_sq => {
                simplified.insert(i + 1, max_index);
            }
            _ => i += 1,
        }
    }
}

/// Represents a group of related contours.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourSet {
    /// An array of the contours in the set.
    pub contours: Vec<Contour>,
    /// World position of the grid origin the contours are relative to
    pub origin: Vec2,
    /// The size of each cell.
    pub cell_size: f32,
    /// The width of the grid the set was built from, in cells.
    pub width: u16,
    /// The height of the grid the set was built from, in cells.
    pub height: u16,
    /// The max edge error that this contour set was simplified with.
    pub max_error: f32,
}

impl ContourSet {
    /// Converts a position in grid units to world units.
    ///
    /// `scale_y` squashes the y-axis back for isometric scenes, see
    /// [`Viewpoint::scale_y`](crate::Viewpoint::scale_y). Use `1.0` for top-down scenes.
    #[inline]
    pub fn grid_to_world(&self, position: IVec2, scale_y: f32) -> Vec2 {
        let world = position.as_vec2() * self.cell_size + self.origin;
        Vec2::new(world.x, world.y * scale_y)
    }

    /// The simplified contours as polygons in world units.
    pub fn to_world(&self, scale_y: f32) -> Vec<Vec<Vec2>> {
        self.contours
            .iter()
            .map(|contour| {
                contour
                    .vertices
                    .iter()
                    .map(|vertex| self.grid_to_world(vertex.position, scale_y))
                    .collect()
            })
            .collect()
    }

    /// The contours of a given region.
    pub fn region_contours(&self, region: RegionId) -> impl Iterator<Item = &Contour> {
        self.contours
            .iter()
            .filter(move |contour| contour.region == region)
    }
}

/// Represents a simple, non-overlapping contour in grid space.
///
/// The contour is closed, its last vertex connects back to the first one.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    /// Simplified contour vertices.
    pub vertices: Vec<ContourVertex>,
    /// Raw contour vertices, one per cell side along the border.
    pub raw_vertices: Vec<ContourVertex>,
    /// Region ID of the contour.
    pub region: RegionId,
}

impl Contour {
    /// Positions of the simplified vertices.
    pub fn positions(&self) -> Vec<IVec2> {
        self.vertices.iter().map(|vertex| vertex.position).collect()
    }
}

/// A corner of a [`Contour`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourVertex {
    /// Position of the corner in grid units. Corner (x, y) is the top-left corner of cell (x, y).
    pub position: IVec2,
    /// The region on the other side of the border starting at this vertex.
    /// [`RegionId::NONE`] for obstacles.
    pub neighbor_region: RegionId,
}

bitflags::bitflags! {
    /// Sides of a cell that border another region, indexed like [`dir_offset_x`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    struct EdgeFlags: u8 {
        const NEG_X = 1;
        const POS_Y = 1 << 1;
        const POS_X = 1 << 2;
        const NEG_Y = 1 << 3;
    }
}

impl EdgeFlags {
    #[inline]
    fn from_dir(dir: u8) -> Self {
        Self::from_bits_retain(1 << (dir & 0x3))
    }
}
