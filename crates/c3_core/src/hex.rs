//! Hex-grid coordinates and map distance.
//!
//! Positions are integer axial coordinates, so every distance is exact
//! and identical across platforms.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl HexCoord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Map origin.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Number of hex steps between two coordinates.
    ///
    /// Computed in `i64`, so it holds across the whole `i32` range.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = i64::from(self.q) - i64::from(other.q);
        let dr = i64::from(self.r) - i64::from(other.r);
        let ds = dq + dr;
        let steps = dq.unsigned_abs().max(dr.unsigned_abs()).max(ds.unsigned_abs());
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    /// Whether `other` lies within `radius` steps of this coordinate.
    #[must_use]
    pub fn within(self, other: Self, radius: u32) -> bool {
        self.distance(other) <= radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_along_axis() {
        let a = HexCoord::ORIGIN;
        assert_eq!(a.distance(HexCoord::new(5, 0)), 5);
        assert_eq!(a.distance(HexCoord::new(0, -7)), 7);
    }

    #[test]
    fn test_distance_diagonal() {
        // (3, -3) is three steps along a single cube diagonal
        assert_eq!(HexCoord::ORIGIN.distance(HexCoord::new(3, -3)), 3);
        // (3, 3) needs six steps
        assert_eq!(HexCoord::ORIGIN.distance(HexCoord::new(3, 3)), 6);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = HexCoord::new(-4, 9);
        let b = HexCoord::new(12, -2);
        assert_eq!(a.distance(b), b.distance(a));
    }

    #[test]
    fn test_within() {
        let a = HexCoord::ORIGIN;
        assert!(a.within(HexCoord::new(60, 0), 60));
        assert!(!a.within(HexCoord::new(61, 0), 60));
    }

    #[test]
    fn test_distance_at_coordinate_extremes() {
        let low = HexCoord::new(i32::MIN, i32::MIN);
        let high = HexCoord::new(i32::MAX, i32::MAX);
        assert_eq!(low.distance(low), 0);
        assert_eq!(low.distance(high), u32::MAX);
        assert_eq!(
            HexCoord::new(i32::MIN, 0).distance(HexCoord::new(i32::MIN + 5, -5)),
            5
        );
    }
}
