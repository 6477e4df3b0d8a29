// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use core::ops::Mul;

use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

use crate::roots::linear_root;
use crate::{
    Affine, Axis, CurveOps, ParamCurve, ParamCurveExtrema, PathSink, Point, PtT, Rect, Roots, Vec2,
    MAX_EXTREMA,
};

/// A single line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }
}

impl ParamCurve for Line {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p1
    }
}

impl ParamCurveExtrema for Line {
    #[inline]
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        ArrayVec::new()
    }
}

impl CurveOps for Line {
    #[inline]
    fn tangent(&self, _t: f64) -> Vec2 {
        self.p1 - self.p0
    }

    /// The single linear solve; a line running along the axis has no
    /// isolated roots and reports none.
    fn axis_roots(&self, axis: Axis, value: f64) -> Roots {
        let mut roots = Roots::new();
        if let Some(t) = linear_root(axis.coord(self.p0), axis.coord(self.p1), value) {
            roots.push(t);
        }
        roots
    }

    #[inline]
    fn subdivide(&self, start: PtT, end: PtT) -> Line {
        Line::new(start.pt, end.pt)
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite()
    }

    #[inline]
    fn is_line(&self, _tolerance: f64) -> bool {
        true
    }

    #[inline]
    fn bounds(&self) -> Rect {
        Rect::from_points(self.p0, self.p1)
    }

    #[inline]
    fn hull(&self) -> SmallVec<[Point; 4]> {
        smallvec![self.p0, self.p1]
    }

    #[inline]
    fn transform(&self, affine: Affine) -> Line {
        affine * *self
    }

    #[inline]
    fn reversed(&self) -> Line {
        Line::new(self.p1, self.p0)
    }

    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool) {
        if first {
            sink.move_to(self.p0);
        }
        sink.line_to(self.p1);
        if last {
            sink.close_path();
        }
    }
}

impl Mul<Line> for Affine {
    type Output = Line;

    #[inline]
    fn mul(self, other: Line) -> Line {
        Line {
            p0: self * other.p0,
            p1: self * other.p1,
        }
    }
}
