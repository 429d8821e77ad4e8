#![doc = include_str!("../../../readme.md")]

mod cell;
mod config;
mod contours;
mod grid;
mod main_api;
pub(crate) mod math;
mod obstacle;
mod rasterize;
mod region;
mod simplify_path;
mod watershed_build_regions;
mod watershed_distance_field;

pub use cell::Cell;
pub use config::{NavmeshConfig, NavmeshConfigBuilder, Viewpoint};
pub use contours::{Contour, ContourSet, ContourVertex};
pub use grid::{GridBuilder, GridBuilderError, RasterizationGrid};
pub use main_api::build_navmesh_contours;
pub use math::Aabb2d;
pub use obstacle::{HasHitboxPolygons, ObstaclePolygon};
pub use rasterize::ObstacleRasterization;
pub use region::RegionId;
pub use simplify_path::{PathSimplifier, simplify_path};
