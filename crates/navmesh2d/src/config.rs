use crate::{Aabb2d, ObstacleRasterization};
#[cfg(feature = "bevy_reflect")]
use bevy_reflect::prelude::*;

/// Specifies a configuration to use when building navmesh contours. Usually built using [`NavmeshConfigBuilder`].
///
/// Units are either cells (cell) or world units (wu). Cell units are derived from [`NavmeshConfig::cell_size`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct NavmeshConfig {
    /// The area agents can move in. `[Units: wu]`
    ///
    /// For isometric viewpoints, this is the area as it appears on screen.
    pub aabb: Aabb2d,

    /// The width and height of the grid cells. `[Limit: > 0] [Units: wu]`
    ///
    /// Smaller cells follow the obstacles more closely, at the cost of a longer build.
    pub cell_size: f32,

    /// How close regions may come to obstacles. `[Limit: >= 0] [Units: cell]`
    pub obstacle_cell_padding: u16,

    /// The maximum distance a simplified contour's obstacle borders should deviate
    /// from the raw contour. `[Limit: >= 0] [Units: cell]`
    pub max_contour_error: f32,

    /// How the obstacles are turned into cells.
    pub rasterization: ObstacleRasterization,

    /// The projection of the scene.
    pub viewpoint: Viewpoint,
}

/// A builder for [`NavmeshConfig`]. It takes its settings in world units
/// and converts them into the cell units used by the build.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct NavmeshConfigBuilder {
    /// The area agents can move in. `[Units: wu]`
    pub aabb: Aabb2d,
    /// The width and height of the grid cells. `[Limit: > 0] [Units: wu]`
    pub cell_size: f32,
    /// Extra distance agents keep from obstacles, usually their radius. `[Limit: >= 0] [Units: wu]`
    pub extra_border: f32,
    /// See [`NavmeshConfig::max_contour_error`]. `[Units: cell]`
    pub max_contour_error: f32,
    /// See [`NavmeshConfig::rasterization`].
    pub rasterization: ObstacleRasterization,
    /// See [`NavmeshConfig::viewpoint`].
    pub viewpoint: Viewpoint,
}

impl Default for NavmeshConfigBuilder {
    fn default() -> Self {
        Self {
            aabb: Aabb2d::new([0.0, 0.0], [1280.0, 720.0]),
            cell_size: 10.0,
            extra_border: 0.0,
            max_contour_error: 1.0,
            rasterization: ObstacleRasterization::default(),
            viewpoint: Viewpoint::default(),
        }
    }
}

impl NavmeshConfigBuilder {
    /// Builds a [`NavmeshConfig`] from the current configuration.
    pub fn build(self) -> NavmeshConfig {
        let obstacle_cell_padding = if self.cell_size > 0.0 {
            (self.extra_border.max(0.0) / self.cell_size).ceil() as u16
        } else {
            0
        };
        NavmeshConfig {
            aabb: self.aabb,
            cell_size: self.cell_size,
            obstacle_cell_padding,
            max_contour_error: self.max_contour_error.max(0.0),
            rasterization: self.rasterization,
            viewpoint: self.viewpoint,
        }
    }
}

/// The projection a 2D scene is drawn with.
///
/// Isometric scenes squash the ground vertically. The navmesh is built on the unsquashed ground
/// so that cells are square on the ground, see [`Viewpoint::scale_y`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
pub enum Viewpoint {
    /// Seen from above, no distortion.
    #[default]
    TopDown,
    /// Isometry 2:1 (26.565°), tiles are twice as wide as they are high.
    Isometry2To1,
    /// True isometry (30°).
    TrueIsometry,
}

impl Viewpoint {
    /// The factor from ground y coordinates to screen y coordinates.
    pub fn scale_y(self) -> f32 {
        match self {
            Viewpoint::TopDown => 1.0,
            Viewpoint::Isometry2To1 => 0.5,
            Viewpoint::TrueIsometry => 30.0_f32.to_radians().tan(),
        }
    }
}
