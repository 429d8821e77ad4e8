use std::ops::{AddAssign, Deref};

/// A region in a [`RasterizationGrid`](crate::RasterizationGrid).
///
/// Regions are numbered from 1 in the order the watershed creates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(bevy_reflect::Reflect))]
#[repr(transparent)]
pub struct RegionId(pub u16);

impl Deref for RegionId {
    type Target = u16;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Default for RegionId {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<u16> for RegionId {
    fn from(value: u16) -> Self {
        RegionId(value)
    }
}

/// Saturates at `u16::MAX`.
impl AddAssign<u16> for RegionId {
    fn add_assign(&mut self, rhs: u16) {
        self.0 = self.0.saturating_add(rhs);
    }
}

impl RegionId {
    /// The null region. Obstacles, the padding ring and cells too close to obstacles stay in it.
    pub const NONE: Self = Self(0);

    /// Whether this is an actual region, i.e. not [`RegionId::NONE`].
    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}
