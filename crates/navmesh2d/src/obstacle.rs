use glam::Vec2;

/// A closed polygon blocking movement, in world units.
///
/// The last vertex connects back to the first one. The polygon is expected to be convex;
/// see [`ObstacleRasterization`](crate::ObstacleRasterization) for what happens otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstaclePolygon {
    /// The vertices of the polygon
    pub vertices: Vec<Vec2>,
}

impl ObstaclePolygon {
    /// Creates an obstacle from its vertices.
    pub fn new(vertices: impl IntoIterator<Item = impl Into<Vec2>>) -> Self {
        Self {
            vertices: vertices.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an axis-aligned rectangle obstacle.
    pub fn rectangle(min: impl Into<Vec2>, max: impl Into<Vec2>) -> Self {
        let min = min.into();
        let max = max.into();
        Self {
            vertices: vec![
                min,
                Vec2::new(max.x, min.y),
                max,
                Vec2::new(min.x, max.y),
            ],
        }
    }
}

/// Anything that exposes hitboxes which agents cannot walk through.
pub trait HasHitboxPolygons {
    /// The hitboxes of the obstacle, in world units.
    fn hitbox_polygons(&self) -> &[ObstaclePolygon];
}

impl HasHitboxPolygons for ObstaclePolygon {
    fn hitbox_polygons(&self) -> &[ObstaclePolygon] {
        std::slice::from_ref(self)
    }
}

impl HasHitboxPolygons for Vec<ObstaclePolygon> {
    fn hitbox_polygons(&self) -> &[ObstaclePolygon] {
        self
    }
}

impl HasHitboxPolygons for [ObstaclePolygon] {
    fn hitbox_polygons(&self) -> &[ObstaclePolygon] {
        self
    }
}
