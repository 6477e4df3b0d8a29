// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadratic Bézier segments.

use core::ops::Mul;

use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

use crate::curve::controls_near_chord;
use crate::roots::quadratic_roots;
use crate::{
    Affine, Axis, CurveOps, Line, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, PathSink, Point,
    PtT, Rect, Roots, Vec2, MAX_EXTREMA,
};

/// A single quadratic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadBez {
    /// The start point.
    pub p0: Point,
    /// The control point.
    pub p1: Point,
    /// The end point.
    pub p2: Point,
}

impl QuadBez {
    /// Create a new quadratic Bézier segment.
    #[inline]
    pub fn new<V: Into<Point>>(p0: V, p1: V, p2: V) -> QuadBez {
        QuadBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
        }
    }

    /// Coefficients of `a t² + b t + c` along one axis.
    fn axis_coeffs(&self, axis: Axis) -> (f64, f64, f64) {
        let c0 = axis.coord(self.p0);
        let c1 = axis.coord(self.p1);
        let c2 = axis.coord(self.p2);
        (c0 - 2.0 * c1 + c2, 2.0 * (c1 - c0), c0)
    }
}

impl ParamCurve for QuadBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        (self.p0.to_vec2() * (mt * mt)
            + (self.p1.to_vec2() * (mt * 2.0) + self.p2.to_vec2() * t) * t)
            .to_point()
    }

    #[inline]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline]
    fn end(&self) -> Point {
        self.p2
    }
}

impl ParamCurveDeriv for QuadBez {
    type DerivResult = Line;

    #[inline]
    fn deriv(&self) -> Line {
        Line::new(
            (2.0 * (self.p1 - self.p0)).to_point(),
            (2.0 * (self.p2 - self.p1)).to_point(),
        )
    }
}

impl ParamCurveExtrema for QuadBez {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let dd = d1 - d0;
        if dd.x != 0.0 {
            let t = -d0.x / dd.x;
            if t > 0.0 && t < 1.0 {
                result.push(t);
            }
        }
        if dd.y != 0.0 {
            let t = -d0.y / dd.y;
            if t > 0.0 && t < 1.0 {
                result.push(t);
                if result.len() == 2 && result[0] > t {
                    result.swap(0, 1);
                }
            }
        }
        result
    }
}

impl CurveOps for QuadBez {
    fn tangent(&self, t: f64) -> Vec2 {
        let d = self.deriv().eval(t).to_vec2();
        if d == Vec2::ZERO {
            // The control coincides with an endpoint.
            self.p2 - self.p0
        } else {
            d
        }
    }

    fn axis_roots(&self, axis: Axis, value: f64) -> Roots {
        let (a, b, c) = self.axis_coeffs(axis);
        quadratic_roots(a, b, c - value)
    }

    /// The new control is `2·mid - (start + end) / 2`, where `mid` is the
    /// point halfway (in parameter) between the two positions, pinned to
    /// the new endpoints' rectangle.
    fn subdivide(&self, start: PtT, end: PtT) -> QuadBez {
        let mid = self.eval(0.5 * (start.t + end.t));
        let ends = start.pt.to_vec2().lerp(end.pt.to_vec2(), 0.5);
        let control = (mid.to_vec2() * 2.0 - ends).to_point();
        QuadBez {
            p0: start.pt,
            p1: Rect::from_points(start.pt, end.pt).pin(control),
            p2: end.pt,
        }
    }

    #[inline]
    fn is_line(&self, tolerance: f64) -> bool {
        controls_near_chord(self.p0, self.p2, &[self.p1], tolerance)
    }

    #[inline]
    fn hull(&self) -> SmallVec<[Point; 4]> {
        smallvec![self.p0, self.p1, self.p2]
    }

    #[inline]
    fn transform(&self, affine: Affine) -> QuadBez {
        affine * *self
    }

    #[inline]
    fn reversed(&self) -> QuadBez {
        QuadBez::new(self.p2, self.p1, self.p0)
    }

    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool) {
        if first {
            sink.move_to(self.p0);
        }
        sink.quad_to(self.p1, self.p2);
        if last {
            sink.close_path();
        }
    }
}

impl Mul<QuadBez> for Affine {
    type Output = QuadBez;

    #[inline]
    fn mul(self, other: QuadBez) -> QuadBez {
        QuadBez {
            p0: self * other.p0,
            p1: self * other.p1,
            p2: self * other.p2,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Axis, CurveOps, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, Point, QuadBez, T_EPSILON,
    };

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!((p1 - p0).hypot() < epsilon, "{p0:?} != {p1:?}");
    }

    #[test]
    fn quadbez_deriv() {
        let q = QuadBez::new((0.0, 0.0), (0.0, 0.5), (1.0, 1.0));
        let deriv = q.deriv();

        let n = 10;
        for i in 0..=n {
            let t = (i as f64) * (n as f64).recip();
            let delta = 1e-6;
            let p = q.eval(t);
            let p1 = q.eval(t + delta);
            let d_approx = (p1 - p) * delta.recip();
            let d = deriv.eval(t).to_vec2();
            assert!((d - d_approx).hypot() < delta * 2.0);
        }
    }

    #[test]
    fn quadbez_extrema() {
        // y = x^2
        let q = QuadBez::new((-1.0, 1.0), (0.0, -1.0), (1.0, 1.0));
        let extrema = q.extrema();
        assert_eq!(extrema.len(), 1);
        assert!((extrema[0] - 0.5).abs() < 1e-6);

        let q = QuadBez::new((0.0, 0.5), (1.0, 1.0), (0.5, 0.0));
        let extrema = q.extrema();
        assert_eq!(extrema.len(), 2);
        assert!((extrema[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((extrema[1] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn quadbez_axis_roots() {
        let q = QuadBez::new((-1.0, 1.0), (0.0, -1.0), (1.0, 1.0));
        // y(t) = 4t² - 4t + 1 = (2t - 1)²
        let roots = q.axis_ts(Axis::Vertical, 0.0, T_EPSILON);
        assert_eq!(roots.len(), 1);
        assert!((roots.as_slice()[0] - 0.5).abs() < 1e-9);
        let mut roots = q.axis_ts(Axis::Vertical, 0.5, T_EPSILON);
        roots.sort();
        assert_eq!(roots.len(), 2);
        for t in roots.iter() {
            assert!((q.eval(t).y - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn quadbez_subdivide_matches_curve() {
        let q = QuadBez::new((3.1, 4.1), (5.9, 2.6), (5.3, 5.8));
        // Monotonic over this range, so pinning leaves the control alone.
        let sub = q.subdivide_t(0.4, 0.7);
        assert_eq!(sub.p0, q.pt_t(0.4).pt);
        assert_eq!(sub.p2, q.pt_t(0.7).pt);
        for i in 0..=10 {
            let s = f64::from(i) / 10.0;
            assert_near(sub.eval(s), q.eval(0.4 + 0.3 * s), 1e-9);
        }
    }

    #[test]
    fn quadbez_line_test() {
        let q = QuadBez::new((0.0, 0.0), (1.0, 1e-12), (2.0, 0.0));
        assert!(q.is_line(1e-9));
        let q = QuadBez::new((0.0, 0.0), (1.0, 0.5), (2.0, 0.0));
        assert!(!q.is_line(1e-9));
    }
}
