// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Point, Vec2};

/// An axis in the plane.
///
/// Axis intercepts are expressed against an axis: solving a curve against
/// [`Axis::Horizontal`] at `value` finds where its x coordinate equals
/// `value`, i.e. where it crosses the vertical line `x = value`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

impl Axis {
    /// Get the axis perpendicular to this one.
    #[inline]
    pub const fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The coordinate of `p` along this axis.
    #[inline]
    pub const fn coord(self, p: Point) -> f64 {
        match self {
            Self::Horizontal => p.x,
            Self::Vertical => p.y,
        }
    }

    /// The component of `v` along this axis.
    #[inline]
    pub const fn component(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_and_cross() {
        let p = Point::new(7.0, 2.0);
        assert_eq!(Axis::Horizontal.coord(p), 7.0);
        assert_eq!(Axis::Vertical.component(Vec2::new(7.0, 2.0)), 2.0);
        assert_eq!(Axis::Vertical.coord(p), 2.0);
        assert_eq!(Axis::Vertical.cross().coord(p), 7.0);
    }
}
