use glam::Vec2;

use crate::{
    Aabb2d, ContourSet, GridBuilder, GridBuilderError, HasHitboxPolygons, NavmeshConfig,
    ObstaclePolygon, RasterizationGrid,
};

impl RasterizationGrid {
    /// Creates an empty grid covering the area of the config.
    ///
    /// For isometric viewpoints, the grid covers the unsquashed ground.
    pub fn from_config(config: &NavmeshConfig) -> Result<Self, GridBuilderError> {
        let scale_y = config.viewpoint.scale_y();
        GridBuilder {
            aabb: Aabb2d::new(
                unsquash(config.aabb.min, scale_y),
                unsquash(config.aabb.max, scale_y),
            ),
            cell_size: config.cell_size,
        }
        .build()
    }

    /// Rasterizes the obstacles as configured. Obstacles are given in screen space.
    pub fn populate_from_obstacles<T: HasHitboxPolygons + ?Sized>(
        &mut self,
        obstacles: &[&T],
        config: &NavmeshConfig,
    ) {
        let scale_y = config.viewpoint.scale_y();
        if scale_y == 1.0 {
            self.rasterize_obstacles(obstacles, config.rasterization);
            return;
        }
        for obstacle in obstacles {
            for polygon in obstacle.hitbox_polygons() {
                let ground = ObstaclePolygon {
                    vertices: polygon
                        .vertices
                        .iter()
                        .map(|vertex| unsquash(*vertex, scale_y))
                        .collect(),
                };
                self.rasterize_polygon(&ground, config.rasterization);
            }
        }
    }
}

/// Builds the contours of the navigation mesh around `obstacles`.
///
/// Runs every stage in order:
/// 1. creates the grid, see [`RasterizationGrid::from_config`]
/// 2. rasterizes the obstacles, see [`RasterizationGrid::populate_from_obstacles`]
/// 3. builds the distance field, see [`RasterizationGrid::build_distance_field`]
/// 4. grows the regions, see [`RasterizationGrid::build_regions`]
/// 5. traces and simplifies the contours, see [`RasterizationGrid::build_contours`]
///
/// Use [`ContourSet::to_world`] with [`Viewpoint::scale_y`](crate::Viewpoint::scale_y) to get
/// the contours back in screen space.
pub fn build_navmesh_contours<T: HasHitboxPolygons + ?Sized>(
    config: &NavmeshConfig,
    obstacles: &[&T],
) -> Result<ContourSet, GridBuilderError> {
    let _span = tracing::debug_span!("build_navmesh_contours").entered();
    let mut grid = RasterizationGrid::from_config(config)?;
    tracing::debug!(
        "Rasterizing {} obstacles on a {}x{} grid",
        obstacles.len(),
        grid.width,
        grid.height
    );
    grid.populate_from_obstacles(obstacles, config);
    grid.build_distance_field();
    grid.build_regions(config.obstacle_cell_padding);
    Ok(grid.build_contours(config.max_contour_error))
}

#[inline]
fn unsquash(position: Vec2, scale_y: f32) -> Vec2 {
    Vec2::new(position.x, position.y / scale_y)
}
