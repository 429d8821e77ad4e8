use glam::Vec2;

/// An axis-aligned bounding box on the navigation plane.
///
/// `min` is the top-left corner and `max` the bottom-right one, with y pointing down
/// as is usual for 2D scenes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
pub struct Aabb2d {
    /// The minimum point of the box
    pub min: Vec2,
    /// The maximum point of the box
    pub max: Vec2,
}

impl Aabb2d {
    /// Creates a new AABB from its corners.
    #[inline]
    pub fn new(min: impl Into<Vec2>, max: impl Into<Vec2>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Creates the AABB enclosing all the given points.
    /// Returns `None` if `vertices` is empty.
    pub fn from_verts(vertices: &[Vec2]) -> Option<Self> {
        let (first, rest) = vertices.split_first()?;
        let mut aabb = Self {
            min: *first,
            max: *first,
        };
        for vertex in rest {
            aabb.min = aabb.min.min(*vertex);
            aabb.max = aabb.max.max(*vertex);
        }
        Some(aabb)
    }

    /// The size of the box along both axes.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Gets the standard width (x-axis) offset for the specified direction.
/// # Arguments
/// - `direction`: The direction. [Limits: 0 <= value < 4]
/// # Returns
///
/// The width offset to apply to the current cell position to move in the direction.
#[inline]
pub(crate) fn dir_offset_x(direction: u8) -> i32 {
    const OFFSET: [i32; 4] = [-1, 0, 1, 0];
    OFFSET[direction as usize & 0x03]
}

/// Gets the standard height (y-axis) offset for the specified direction.
/// # Arguments
/// - `direction`: The direction. [Limits: 0 <= value < 4]
/// # Returns
///
/// The height offset to apply to the current cell position to move in the direction.
#[inline]
pub(crate) fn dir_offset_y(direction: u8) -> i32 {
    const OFFSET: [i32; 4] = [0, 1, 0, -1];
    OFFSET[direction as usize & 0x03]
}

/// Offsets to the 8 cells around a cell. The first 4 are the ones of [`dir_offset_x`] and [`dir_offset_y`].
pub(crate) const NEIGHBOR_8_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (0, 1),
    (1, 0),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// Squared distance between `point` and the segment from `a` to `b`.
///
/// Projections before `a` or after `b` are clamped to the segment ends.
/// A zero-length segment is treated as the point `a`.
pub(crate) fn distance_point_segment_sq(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq == 0.0 {
        return point.distance_squared(a);
    }
    let u = (point - a).dot(ab) / length_sq;
    if u < 0.0 {
        point.distance_squared(a)
    } else if u > 1.0 {
        point.distance_squared(b)
    } else {
        point.distance_squared(a + ab * u)
    }
}
