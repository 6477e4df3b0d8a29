// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments.

use core::ops::Mul;

use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

use crate::curve::controls_near_chord;
use crate::roots::{cubic_roots, quadratic_roots, quadratic_roots_precise};
use crate::{
    Affine, Axis, CurveOps, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, PathSink, Point, PtT,
    QuadBez, Rect, Roots, Vec2, MAX_EXTREMA, T_EPSILON,
};

/// A single cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBez {
    /// The start point.
    pub p0: Point,
    /// The first control point.
    pub p1: Point,
    /// The second control point.
    pub p2: Point,
    /// The end point.
    pub p3: Point,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// Coefficients of `a t³ + b t² + c t + d` along one axis.
    fn axis_coeffs(&self, axis: Axis) -> (f64, f64, f64, f64) {
        let c0 = axis.coord(self.p0);
        let c1 = axis.coord(self.p1);
        let c2 = axis.coord(self.p2);
        let c3 = axis.coord(self.p3);
        (
            -c0 + 3.0 * (c1 - c2) + c3,
            3.0 * (c0 - 2.0 * c1 + c2),
            3.0 * (c1 - c0),
            c0,
        )
    }
}

impl ParamCurve for CubicBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let v = self.p0.to_vec2() * (mt * mt * mt)
            + (self.p1.to_vec2() * (mt * mt * 3.0)
                + (self.p2.to_vec2() * (mt * 3.0) + self.p3.to_vec2() * t) * t)
                * t;
        v.to_point()
    }

    #[inline]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline]
    fn end(&self) -> Point {
        self.p3
    }
}

impl ParamCurveDeriv for CubicBez {
    type DerivResult = QuadBez;

    #[inline]
    fn deriv(&self) -> QuadBez {
        QuadBez::new(
            (3.0 * (self.p1 - self.p0)).to_point(),
            (3.0 * (self.p2 - self.p1)).to_point(),
            (3.0 * (self.p3 - self.p2)).to_point(),
        )
    }
}

impl ParamCurveExtrema for CubicBez {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        fn one_coord(result: &mut ArrayVec<f64, MAX_EXTREMA>, d0: f64, d1: f64, d2: f64) {
            let a = d0 - 2.0 * d1 + d2;
            let b = 2.0 * (d1 - d0);
            let c = d0;
            // Nearly degenerate cubics give ill-conditioned equations here.
            let roots = quadratic_roots_precise(a, b, c).keep_interior_ts(T_EPSILON);
            for t in roots.iter() {
                if !result.is_full() {
                    result.push(t);
                }
            }
        }
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let d2 = self.p3 - self.p2;
        one_coord(&mut result, d0.x, d1.x, d2.x);
        one_coord(&mut result, d0.y, d1.y, d2.y);
        result.sort_by(|a, b| a.total_cmp(b));
        result
    }
}

impl CurveOps for CubicBez {
    /// Where the derivative vanishes at an end (a control coincides with
    /// an endpoint), the direction toward the next distinct point is used.
    fn tangent(&self, t: f64) -> Vec2 {
        let d = self.deriv().eval(t).to_vec2();
        if d != Vec2::ZERO {
            return d;
        }
        let fallback = if t == 0.0 {
            self.p2 - self.p0
        } else if t == 1.0 {
            self.p3 - self.p1
        } else {
            Vec2::ZERO
        };
        if fallback != Vec2::ZERO {
            fallback
        } else {
            self.p3 - self.p0
        }
    }

    fn axis_roots(&self, axis: Axis, value: f64) -> Roots {
        let (a, b, c, d) = self.axis_coeffs(axis);
        cubic_roots(a, b, c, d - value)
    }

    /// Samples the curve at one and two thirds of the way from `start.t`
    /// to `end.t` and solves for the two controls that reproduce them.
    ///
    /// A cubic segment `(a, b, c, d)` passes through
    /// `e = (8a + 12b + 6c + d) / 27` and `f = (a + 6b + 12c + 8d) / 27`,
    /// so with `m = 27e - 8a - d` and `n = 27f - a - 8d` the controls are
    /// `b = (2m - n) / 18` and `c = (2n - m) / 18`.
    fn subdivide(&self, start: PtT, end: PtT) -> CubicBez {
        let (t1, t2) = (start.t, end.t);
        let a = start.pt.to_vec2();
        let d = end.pt.to_vec2();
        let e = self.eval((2.0 * t1 + t2) / 3.0).to_vec2();
        let f = self.eval((t1 + 2.0 * t2) / 3.0).to_vec2();
        let m = e * 27.0 - a * 8.0 - d;
        let n = f * 27.0 - a - d * 8.0;
        let b = ((m * 2.0 - n) / 18.0).to_point();
        let c = ((n * 2.0 - m) / 18.0).to_point();
        let ends = Rect::from_points(start.pt, end.pt);
        CubicBez {
            p0: start.pt,
            p1: ends.pin(b),
            p2: ends.pin(c),
            p3: end.pt,
        }
    }

    #[inline]
    fn is_line(&self, tolerance: f64) -> bool {
        controls_near_chord(self.p0, self.p3, &[self.p1, self.p2], tolerance)
    }

    #[inline]
    fn hull(&self) -> SmallVec<[Point; 4]> {
        smallvec![self.p0, self.p1, self.p2, self.p3]
    }

    #[inline]
    fn transform(&self, affine: Affine) -> CubicBez {
        affine * *self
    }

    #[inline]
    fn reversed(&self) -> CubicBez {
        CubicBez::new(self.p3, self.p2, self.p1, self.p0)
    }

    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool) {
        if first {
            sink.move_to(self.p0);
        }
        sink.curve_to(self.p1, self.p2, self.p3);
        if last {
            sink.close_path();
        }
    }

    /// Parameters where the cross product of the first and second
    /// derivatives changes sign.
    fn inflections(&self) -> Roots {
        let a = self.p1 - self.p0;
        let b = self.p2.to_vec2() - self.p1.to_vec2() * 2.0 + self.p0.to_vec2();
        let c = self.p3 - self.p0 + (self.p1 - self.p2) * 3.0;
        quadratic_roots(b.cross(c), a.cross(c), a.cross(b)).keep_interior_ts(T_EPSILON)
    }
}

impl Mul<CubicBez> for Affine {
    type Output = CubicBez;

    #[inline]
    fn mul(self, c: CubicBez) -> CubicBez {
        CubicBez {
            p0: self * c.p0,
            p1: self * c.p1,
            p2: self * c.p2,
            p3: self * c.p3,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{
        Axis, CubicBez, CurveOps, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, Point, Vec2,
        T_EPSILON,
    };

    fn s_curve() -> CubicBez {
        CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, -1.0), (3.0, 0.0))
    }

    #[test]
    fn cubicbez_deriv() {
        // y = x^2
        let c = CubicBez::new(
            (0.0, 0.0),
            (1.0 / 3.0, 0.0),
            (2.0 / 3.0, 1.0 / 3.0),
            (1.0, 1.0),
        );
        let deriv = c.deriv();

        let n = 10;
        for i in 0..=n {
            let t = f64::from(i) * f64::from(n).recip();
            let delta = 1e-6;
            let p = c.eval(t);
            let p1 = c.eval(t + delta);
            let d_approx = (p1 - p) * delta.recip();
            let d = deriv.eval(t).to_vec2();
            assert!((d - d_approx).hypot() < delta * 2.0);
        }
    }

    #[test]
    fn cubicbez_extrema() {
        // y = x^2
        let q = CubicBez::new((-1.0, 1.0), (0.0, -1.0), (0.0, -1.0), (1.0, 1.0));
        let extrema = q.extrema();
        assert_eq!(extrema.len(), 1);
        assert!((extrema[0] - 0.5).abs() < 1e-6);

        let q = CubicBez::new((0.4, 0.5), (0.0, 1.0), (1.0, 0.0), (0.5, 0.4));
        let extrema = q.extrema();
        assert_eq!(extrema.len(), 4);
        assert!(extrema.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn cubicbez_inflection() {
        let c = s_curve();
        let inflections = c.inflections();
        assert_eq!(inflections.len(), 1);
        assert!((inflections.as_slice()[0] - 0.5).abs() < 1e-12);
        // A parabola never changes curvature sign.
        let parabola = CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0));
        assert!(parabola.inflections().is_empty());
    }

    #[test]
    fn cubicbez_axis_roots() {
        // y = 3t(1 - t)(1 - 2t)
        let mut roots = s_curve().axis_ts(Axis::Vertical, 0.0, T_EPSILON);
        roots.sort();
        assert_eq!(roots.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn cubicbez_tangent_at_degenerate_ends() {
        let c = CubicBez::new((0.0, 0.0), (0.0, 0.0), (1.0, 2.0), (3.0, 3.0));
        assert_eq!(c.tangent(0.0), Vec2::new(1.0, 2.0));
        let c = CubicBez::new((0.0, 0.0), (0.0, 0.0), (3.0, 3.0), (3.0, 3.0));
        assert_eq!(c.tangent(1.0), Vec2::new(3.0, 3.0));
        assert_eq!(c.tangent(0.0), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn cubicbez_subdivide_reproduces_curve() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 0.25), (2.0, 1.5), (3.0, 4.0));
        let sub = c.subdivide_t(0.25, 0.75);
        for i in 0..=10 {
            let s = f64::from(i) / 10.0;
            let expected = c.eval(0.25 + 0.5 * s);
            assert!((sub.eval(s) - expected).hypot() < 1e-12, "at {s}");
        }
    }

    #[test]
    fn cubicbez_subdivide_ends_are_exact() {
        let mut rng = StdRng::seed_from_u64(7);
        let pt = |rng: &mut StdRng| {
            Point::new(rng.random_range(-100.0..100.0), rng.random_range(-100.0..100.0))
        };
        for _ in 0..1000 {
            let c = CubicBez::new(pt(&mut rng), pt(&mut rng), pt(&mut rng), pt(&mut rng));
            let t1: f64 = rng.random_range(0.0..1.0);
            let t2: f64 = rng.random_range(t1..=1.0);
            let sub = c.subdivide_t(t1, t2);
            assert_eq!(sub.pt_t(0.0).pt, c.pt_t(t1).pt);
            assert_eq!(sub.pt_t(1.0).pt, c.pt_t(t2).pt);
        }
        let sub = s_curve().subdivide_t(0.0, 1.0);
        assert_eq!(sub.p0, Point::new(0.0, 0.0));
        assert_eq!(sub.p3, Point::new(3.0, 0.0));
    }

    #[test]
    fn cubicbez_line_test() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0));
        assert!(c.is_line(1e-9));
        assert!(!s_curve().is_line(1e-9));
        let dot = CubicBez::new((1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0));
        assert!(dot.is_line(1e-9));
    }
}
