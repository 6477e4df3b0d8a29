// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle.

use crate::common::pin;
use crate::Point;

/// An axis-aligned rectangle.
///
/// Used for curve bounds; an empty rectangle is never produced, since every
/// curve has at least its two endpoints.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate.
    pub x0: f64,
    /// The minimum y coordinate.
    pub y0: f64,
    /// The maximum x coordinate.
    pub x1: f64,
    /// The maximum y coordinate.
    pub y1: f64,
}

impl Rect {
    /// A new rectangle from minimum and maximum coordinates.
    #[inline]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A new rectangle from two points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Rect {
        let p0 = p0.into();
        let p1 = p1.into();
        Rect {
            x0: p0.x.min(p1.x),
            y0: p0.y.min(p1.y),
            x1: p0.x.max(p1.x),
            y1: p0.y.max(p1.y),
        }
    }

    /// The smallest rectangle enclosing two rectangles.
    #[inline]
    pub fn union(&self, other: Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Compute the union with one point.
    ///
    /// This method includes the perimeter of zero-area rectangles.
    #[inline]
    pub fn union_pt(&self, pt: Point) -> Rect {
        Rect::new(
            self.x0.min(pt.x),
            self.y0.min(pt.y),
            self.x1.max(pt.x),
            self.y1.max(pt.y),
        )
    }

    /// Whether the two rectangles share any point, their boundaries included.
    #[inline]
    pub fn overlaps(&self, other: Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Whether `pt` lies inside the rectangle or on its boundary.
    #[inline]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x0 && pt.x <= self.x1 && pt.y >= self.y0 && pt.y <= self.y1
    }

    /// Clamp `pt` so that it lies inside the rectangle.
    #[inline]
    pub fn pin(&self, pt: Point) -> Point {
        Point::new(pin(pt.x, self.x0, self.x1), pin(pt.y, self.y0, self.y1))
    }

    /// Expand the rectangle by `delta` on every side.
    #[inline]
    #[must_use]
    pub fn inflate(&self, delta: f64) -> Rect {
        Rect::new(
            self.x0 - delta,
            self.y0 - delta,
            self.x1 + delta,
            self.y1 + delta,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_normalizes() {
        let r = Rect::from_points((3.0, 1.0), (1.0, 4.0));
        assert_eq!(r, Rect::new(1.0, 1.0, 3.0, 4.0));
    }

    #[test]
    fn touching_rects_overlap() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 1.0, 2.0, 2.0);
        let c = Rect::new(1.5, 0.0, 2.0, 0.5);
        assert!(a.overlaps(b));
        assert!(!a.overlaps(c));
    }

    #[test]
    fn pin_inside() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(r.pin(Point::new(2.0, -1.0)), Point::new(1.0, 0.0));
        assert_eq!(r.pin(Point::new(0.5, 0.5)), Point::new(0.5, 0.5));
    }
}
