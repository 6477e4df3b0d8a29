// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path output: the sink the engine writes results into, and a recording
//! Bézier path.

use alloc::vec::Vec;
use core::ops::Mul;

use crate::{Affine, Point};

/// A consumer of path elements.
///
/// The engine calls [`PathSink::make_empty`] once before emitting a result,
/// then one `move_to` per output contour, drawing elements, and a
/// `close_path` that ends the contour.
pub trait PathSink {
    /// Discard anything previously written.
    fn make_empty(&mut self);

    /// Begin a new subpath at `p`.
    fn move_to(&mut self, p: Point);

    /// Draw a line to `p`.
    fn line_to(&mut self, p: Point);

    /// Draw a quadratic Bézier with control `p1` to `p2`.
    fn quad_to(&mut self, p1: Point, p2: Point);

    /// Draw a conic with control `p1` and `weight` to `p2`.
    fn conic_to(&mut self, p1: Point, p2: Point, weight: f64);

    /// Draw a cubic Bézier with controls `p1`, `p2` to `p3`.
    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point);

    /// Close the current subpath.
    fn close_path(&mut self);
}

/// The element of a Bézier path.
///
/// A valid path has `MoveTo` at the beginning of each subpath.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEl {
    /// Move directly to the point without drawing anything, starting a new
    /// subpath.
    MoveTo(Point),
    /// Draw a line from the current location to the point.
    LineTo(Point),
    /// Draw a quadratic Bézier using the current location and the two
    /// points.
    QuadTo(Point, Point),
    /// Draw a conic using the current location, the two points and the
    /// weight.
    ConicTo(Point, Point, f64),
    /// Draw a cubic Bézier using the current location and the three points.
    CurveTo(Point, Point, Point),
    /// Close off the path.
    ClosePath,
}

/// A path of Bézier segments up to cubic, including conics, possibly with
/// multiple subpaths.
#[derive(Clone, Default, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezPath(Vec<PathEl>);

impl BezPath {
    /// Create a new path.
    pub fn new() -> BezPath {
        BezPath::default()
    }

    /// Create a path from a vector of path elements.
    pub fn from_vec(v: Vec<PathEl>) -> BezPath {
        BezPath(v)
    }

    /// Push a generic path element onto the path.
    pub fn push(&mut self, el: PathEl) {
        self.0.push(el);
    }

    /// Push a "move to" element onto the path.
    pub fn move_to<P: Into<Point>>(&mut self, p: P) {
        self.push(PathEl::MoveTo(p.into()));
    }

    /// Push a "line to" element onto the path.
    pub fn line_to<P: Into<Point>>(&mut self, p: P) {
        self.push(PathEl::LineTo(p.into()));
    }

    /// Push a "quad to" element onto the path.
    pub fn quad_to<P: Into<Point>>(&mut self, p1: P, p2: P) {
        self.push(PathEl::QuadTo(p1.into(), p2.into()));
    }

    /// Push a "conic to" element onto the path.
    pub fn conic_to<P: Into<Point>>(&mut self, p1: P, p2: P, weight: f64) {
        self.push(PathEl::ConicTo(p1.into(), p2.into(), weight));
    }

    /// Push a "curve to" element onto the path.
    pub fn curve_to<P: Into<Point>>(&mut self, p1: P, p2: P, p3: P) {
        self.push(PathEl::CurveTo(p1.into(), p2.into(), p3.into()));
    }

    /// Push a "close path" element onto the path.
    pub fn close_path(&mut self) {
        self.push(PathEl::ClosePath);
    }

    /// Get the path elements.
    pub fn elements(&self) -> &[PathEl] {
        &self.0
    }

    /// Returns an iterator over the path's elements.
    pub fn iter(&self) -> impl Iterator<Item = PathEl> + '_ {
        self.0.iter().copied()
    }

    /// Is this path empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of subpaths, counted by `MoveTo` elements.
    pub fn subpath_count(&self) -> usize {
        self.0
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count()
    }

    /// Apply an affine transform to every point of the path.
    pub fn apply_affine(&mut self, affine: Affine) {
        for el in &mut self.0 {
            *el = affine * *el;
        }
    }
}

impl PathSink for BezPath {
    fn make_empty(&mut self) {
        self.0.clear();
    }

    fn move_to(&mut self, p: Point) {
        self.push(PathEl::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.push(PathEl::LineTo(p));
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.push(PathEl::QuadTo(p1, p2));
    }

    fn conic_to(&mut self, p1: Point, p2: Point, weight: f64) {
        self.push(PathEl::ConicTo(p1, p2, weight));
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.push(PathEl::CurveTo(p1, p2, p3));
    }

    fn close_path(&mut self) {
        self.push(PathEl::ClosePath);
    }
}

impl FromIterator<PathEl> for BezPath {
    fn from_iter<T: IntoIterator<Item = PathEl>>(iter: T) -> Self {
        BezPath(iter.into_iter().collect())
    }
}

impl Extend<PathEl> for BezPath {
    fn extend<I: IntoIterator<Item = PathEl>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl Mul<PathEl> for Affine {
    type Output = PathEl;

    fn mul(self, other: PathEl) -> PathEl {
        match other {
            PathEl::MoveTo(p) => PathEl::MoveTo(self * p),
            PathEl::LineTo(p) => PathEl::LineTo(self * p),
            PathEl::QuadTo(p1, p2) => PathEl::QuadTo(self * p1, self * p2),
            PathEl::ConicTo(p1, p2, w) => PathEl::ConicTo(self * p1, self * p2, w),
            PathEl::CurveTo(p1, p2, p3) => PathEl::CurveTo(self * p1, self * p2, self * p3),
            PathEl::ClosePath => PathEl::ClosePath,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_records_elements() {
        let mut path = BezPath::new();
        path.move_to((9.0, 9.0));
        PathSink::make_empty(&mut path);
        assert!(path.is_empty());

        let sink: &mut dyn PathSink = &mut path;
        sink.move_to(Point::new(0.0, 0.0));
        sink.conic_to(Point::new(1.0, 0.0), Point::new(1.0, 1.0), 0.5);
        sink.close_path();
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::ConicTo(Point::new(1.0, 0.0), Point::new(1.0, 1.0), 0.5),
                PathEl::ClosePath,
            ]
        );
        assert_eq!(path.subpath_count(), 1);
    }

    #[test]
    fn affine_keeps_conic_weight() {
        let mut path = BezPath::new();
        path.move_to((1.0, 1.0));
        path.conic_to((2.0, 1.0), (2.0, 2.0), 0.7);
        path.apply_affine(Affine::scale(2.0));
        assert_eq!(
            path.elements()[1],
            PathEl::ConicTo(Point::new(4.0, 2.0), Point::new(4.0, 4.0), 0.7)
        );
    }
}
