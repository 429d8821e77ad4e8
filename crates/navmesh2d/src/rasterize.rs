use glam::{IVec2, Vec2};
#[cfg(feature = "bevy_reflect")]
use bevy_reflect::prelude::*;

use crate::{Aabb2d, HasHitboxPolygons, ObstaclePolygon, RasterizationGrid};

/// How obstacle polygons are turned into obstacle cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
pub enum ObstacleRasterization {
    /// Every cell touched by the polygon is blocked, even if the polygon only grazes it.
    ///
    /// The edges are traced cell by cell and each row is filled between its leftmost and
    /// rightmost outline cell. Exact for convex polygons; concave ones are over-filled.
    ///
    /// Vertices are floored to the cell containing them, so an edge lying exactly on a cell
    /// border also blocks the cells past that border. A rectangle aligned on the grid grows by
    /// one column on its right and one row on its bottom. Use [`Self::CellCenters`] to keep it
    /// exact.
    #[default]
    Outline,
    /// A cell is blocked when its center lies inside the polygon.
    ///
    /// Handles concave polygons, and keeps rectangles aligned on the grid exact,
    /// but obstacles thinner than a cell can slip between cell centers.
    CellCenters,
}

/// Grid coordinates past this are not meaningful and would overflow the line tracing.
const MAX_GRID_COORDINATE: f32 = (1 << 20) as f32;

impl RasterizationGrid {
    /// Marks the cells covered by the hitboxes of all `obstacles` as obstacles.
    ///
    /// Rasterizing is idempotent and overlapping polygons simply combine.
    /// Cells outside of the grid are ignored.
    pub fn rasterize_obstacles<T: HasHitboxPolygons + ?Sized>(
        &mut self,
        obstacles: &[&T],
        method: ObstacleRasterization,
    ) {
        for obstacle in obstacles {
            for polygon in obstacle.hitbox_polygons() {
                self.rasterize_polygon(polygon, method);
            }
        }
    }

    /// Marks the cells covered by a single polygon as obstacles.
    pub fn rasterize_polygon(&mut self, polygon: &ObstaclePolygon, method: ObstacleRasterization) {
        if polygon.vertices.is_empty() {
            return;
        }
        let vertices: Vec<Vec2> = polygon
            .vertices
            .iter()
            .map(|vertex| {
                self.world_to_grid(*vertex)
                    .clamp(Vec2::splat(-MAX_GRID_COORDINATE), Vec2::splat(MAX_GRID_COORDINATE))
            })
            .collect();
        match method {
            ObstacleRasterization::Outline => self.fill_outline(&vertices),
            ObstacleRasterization::CellCenters => self.fill_cell_centers(&vertices),
        }
    }

    fn fill_outline(&mut self, vertices: &[Vec2]) {
        let corners: Vec<IVec2> = vertices
            .iter()
            .map(|vertex| vertex.floor().as_ivec2())
            .collect();
        let (Some(upper), Some(lower)) = (
            corners.iter().map(|corner| corner.y).min(),
            corners.iter().map(|corner| corner.y).max(),
        ) else {
            return;
        };
        let first_row = upper.max(0);
        let last_row = lower.min(self.height as i32 - 1);
        if first_row > last_row {
            // Entirely above or below the grid
            return;
        }

        // Leftmost and rightmost outline cell of each row
        let mut rows: Vec<Option<(i32, i32)>> = vec![None; (last_row - first_row + 1) as usize];
        for (i, from) in corners.iter().enumerate() {
            let to = corners[(i + 1) % corners.len()];
            trace_line(*from, to, |cell| {
                if cell.y < first_row || cell.y > last_row {
                    return;
                }
                let row = &mut rows[(cell.y - first_row) as usize];
                *row = Some(match *row {
                    Some((min, max)) => (min.min(cell.x), max.max(cell.x)),
                    None => (cell.x, cell.x),
                });
            });
        }

        for (row, span) in rows.into_iter().enumerate() {
            let Some((min, max)) = span else {
                continue;
            };
            let y = first_row + row as i32;
            let min = min.max(0);
            let max = max.min(self.width as i32 - 1);
            for x in min..=max {
                let index = self.index(x, y);
                self.cells[index].set_obstacle();
            }
        }
    }

    fn fill_cell_centers(&mut self, vertices: &[Vec2]) {
        let Some(aabb) = Aabb2d::from_verts(vertices) else {
            return;
        };
        let min_x = aabb.min.x.floor().max(0.0) as i32;
        let max_x = aabb.max.x.ceil().min(self.width as f32) as i32;
        let min_y = aabb.min.y.floor().max(0.0) as i32;
        let max_y = aabb.max.y.ceil().min(self.height as f32) as i32;

        let mut nodes = Vec::with_capacity(vertices.len());
        for y in min_y..max_y {
            let center_y = y as f32 + 0.5;
            nodes.clear();
            let mut j = vertices.len() - 1;
            for i in 0..vertices.len() {
                let a = vertices[i];
                let b = vertices[j];
                if (a.y < center_y && b.y >= center_y) || (b.y < center_y && a.y >= center_y) {
                    let x = a.x + (center_y - a.y) / (b.y - a.y) * (b.x - a.x);
                    // Round half up
                    nodes.push((x + 0.5).floor() as i32);
                }
                j = i;
            }
            nodes.sort_unstable();

            for pair in nodes.chunks_exact(2) {
                if pair[0] >= max_x {
                    break;
                }
                let start = pair[0].max(min_x);
                let end = pair[1].min(max_x);
                for x in start..end {
                    let index = self.index(x, y);
                    self.cells[index].set_obstacle();
                }
            }
        }
    }
}

/// Calls `visit` for every cell of the line from `from` to `to`, both included.
fn trace_line(from: IVec2, to: IVec2, mut visit: impl FnMut(IVec2)) {
    let delta = to - from;
    let step = delta.signum();
    let distance = delta.abs();
    let (major, minor, major_step, minor_step) = if distance.x >= distance.y {
        (distance.x, distance.y, IVec2::new(step.x, 0), IVec2::new(0, step.y))
    } else {
        (distance.y, distance.x, IVec2::new(0, step.y), IVec2::new(step.x, 0))
    };

    let mut cell = from;
    let mut error = 0;
    for i in 0..=major {
        visit(cell);
        if i == major {
            break;
        }
        error += minor;
        if 2 * error >= major {
            cell += minor_step;
            error -= major;
        }
        cell += major_step;
    }
}
