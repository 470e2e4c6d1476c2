//! Axis-Aligned Bounds
//!
//! Play-area boxes defined by two corners.

use serde::{Serialize, Deserialize};

use super::vec3::Vec3;

/// Axis-aligned box given by a low and a high corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lowest corner (after normalization)
    pub low: Vec3,
    /// Highest corner (after normalization)
    pub high: Vec3,
}

impl Bounds {
    /// Create bounds from raw corners, as given.
    pub const fn new(low: Vec3, high: Vec3) -> Self {
        Self { low, high }
    }

    /// Swap components per axis so that `low <= high` on X, Y and Z.
    ///
    /// Each axis is handled on its own; an inverted X does not move Y or Z.
    pub fn normalized(self) -> Self {
        let mut low = self.low;
        let mut high = self.high;

        if high.x < low.x {
            std::mem::swap(&mut low.x, &mut high.x);
        }
        if high.y < low.y {
            std::mem::swap(&mut low.y, &mut high.y);
        }
        if high.z < low.z {
            std::mem::swap(&mut low.z, &mut high.z);
        }

        Self { low, high }
    }

    /// Check if a point lies inside (inclusive).
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.low.x && point.x <= self.high.x
            && point.y >= self.low.y && point.y <= self.high.y
            && point.z >= self.low.z && point.z <= self.high.z
    }
}
