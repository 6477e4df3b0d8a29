// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conic sections as rational quadratic Béziers.

use core::ops::Mul;

use arrayvec::ArrayVec;
use smallvec::{smallvec, SmallVec};

use crate::common::almost_equal_ulps;
use crate::curve::controls_near_chord;
use crate::roots::{quadratic_roots, quadratic_roots_precise};
use crate::{
    Affine, Axis, CurveOps, ParamCurve, ParamCurveExtrema, PathSink, Point, PtT, Rect, Roots,
    Vec2, MAX_EXTREMA, T_EPSILON,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A rational quadratic Bézier.
///
/// With a weight of 1 this is an ordinary quadratic Bézier. Weights below 1
/// give elliptical arcs and weights above 1 give hyperbolic arcs; a quarter
/// circle has weight `√2 / 2`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conic {
    /// The start point.
    pub p0: Point,
    /// The control point.
    pub p1: Point,
    /// The end point.
    pub p2: Point,
    /// The weight of the control point.
    pub weight: f64,
}

impl Conic {
    /// Create a new conic.
    #[inline]
    pub fn new<V: Into<Point>>(p0: V, p1: V, p2: V, weight: f64) -> Conic {
        Conic {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            weight,
        }
    }

    /// The numerator and denominator of the rational form at `t`.
    ///
    /// The denominator is `((w - 1)·-2)t² + 2(w - 1)t + 1`.
    fn homogeneous(&self, t: f64) -> (Vec2, f64) {
        let mt = 1.0 - t;
        let w = self.weight;
        let numer = self.p0.to_vec2() * (mt * mt)
            + self.p1.to_vec2() * (2.0 * w * mt * t)
            + self.p2.to_vec2() * (t * t);
        let wm1 = w - 1.0;
        let denom = ((wm1 * -2.0) * t + 2.0 * wm1) * t + 1.0;
        (numer, denom)
    }

    /// Coefficients `[a, b, c]` of the tangent `(a t + b) t + c`.
    ///
    /// This is the numerator of the derivative with the (always positive)
    /// squared denominator dropped.
    fn tangent_coeffs(&self) -> [Vec2; 3] {
        let p20 = self.p2 - self.p0;
        let p10 = self.p1 - self.p0;
        let wp10 = p10 * self.weight;
        [p20 * self.weight - p20, p20 - wp10 * 2.0, wp10]
    }
}

impl ParamCurve for Conic {
    fn eval(&self, t: f64) -> Point {
        let (numer, denom) = self.homogeneous(t);
        (numer / denom).to_point()
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

impl ParamCurveExtrema for Conic {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let [a, b, c] = self.tangent_coeffs();
        let mut result = ArrayVec::new();
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let roots = quadratic_roots_precise(
                axis.component(a),
                axis.component(b),
                axis.component(c),
            )
            .keep_interior_ts(T_EPSILON);
            for t in roots.iter() {
                if !result.is_full() {
                    result.push(t);
                }
            }
        }
        result.sort_by(|a, b| a.total_cmp(b));
        result
    }
}

impl CurveOps for Conic {
    fn tangent(&self, t: f64) -> Vec2 {
        let [a, b, c] = self.tangent_coeffs();
        let d = (a * t + b) * t + c;
        if d == Vec2::ZERO {
            self.p2 - self.p0
        } else {
            d
        }
    }

    /// Solves `numerator(t) = value · denominator(t)`.
    fn axis_roots(&self, axis: Axis, value: f64) -> Roots {
        let c0 = axis.coord(self.p0);
        let c1 = axis.coord(self.p1) * self.weight;
        let c2 = axis.coord(self.p2);
        let wm1 = self.weight - 1.0;
        let a = c0 - 2.0 * c1 + c2 + 2.0 * wm1 * value;
        let b = 2.0 * (c1 - c0) - 2.0 * wm1 * value;
        let c = c0 - value;
        quadratic_roots(a, b, c)
    }

    /// Both the control point and the weight are recomputed from the
    /// rational form at the two ends and the parametric midpoint.
    ///
    /// When the new control's denominator vanishes, or the end
    /// denominators have different signs, the weight is meaningless and
    /// the result is a straight conic: weight 1 with its control at the
    /// midpoint of the new ends.
    fn subdivide(&self, start: PtT, end: PtT) -> Conic {
        let (an, az) = self.homogeneous(start.t);
        let (cn, cz) = self.homogeneous(end.t);
        let (dn, dz) = self.homogeneous(0.5 * (start.t + end.t));
        let bn = dn * 2.0 - (an + cn) * 0.5;
        let bz = 2.0 * dz - 0.5 * (az + cz);
        let zz = az * cz;
        let mut control = (bn / bz).to_point();
        let mut weight = bz / zz.sqrt();
        if almost_equal_ulps(bz, 0.0) || !(zz > 0.0) || !weight.is_finite() || !control.is_finite()
        {
            control = start.pt.midpoint(end.pt);
            weight = 1.0;
        }
        Conic {
            p0: start.pt,
            p1: Rect::from_points(start.pt, end.pt).pin(control),
            p2: end.pt,
            weight,
        }
    }

    fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.weight.is_finite()
    }

    #[inline]
    fn is_line(&self, tolerance: f64) -> bool {
        controls_near_chord(self.p0, self.p2, &[self.p1], tolerance)
    }

    #[inline]
    fn hull(&self) -> SmallVec<[Point; 4]> {
        smallvec![self.p0, self.p1, self.p2]
    }

    /// Affine maps preserve the weight.
    #[inline]
    fn transform(&self, affine: Affine) -> Conic {
        affine * *self
    }

    #[inline]
    fn reversed(&self) -> Conic {
        Conic::new(self.p2, self.p1, self.p0, self.weight)
    }

    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool) {
        if first {
            sink.move_to(self.p0);
        }
        sink.conic_to(self.p1, self.p2, self.weight);
        if last {
            sink.close_path();
        }
    }

    fn approx_eq(&self, other: &Conic, tolerance: f64) -> bool {
        self.p0.distance(other.p0) <= tolerance
            && self.p1.distance(other.p1) <= tolerance
            && self.p2.distance(other.p2) <= tolerance
            && (self.weight - other.weight).abs() <= tolerance
    }
}

impl Mul<Conic> for Affine {
    type Output = Conic;

    #[inline]
    fn mul(self, other: Conic) -> Conic {
        Conic {
            p0: self * other.p0,
            p1: self * other.p1,
            p2: self * other.p2,
            weight: other.weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{Axis, Conic, CurveOps, ParamCurve, ParamCurveExtrema, Point, T_EPSILON};

    fn quarter_circle() -> Conic {
        Conic::new((1.0, 0.0), (1.0, 1.0), (0.0, 1.0), core::f64::consts::FRAC_1_SQRT_2)
    }

    #[test]
    fn conic_eval_on_circle() {
        let c = quarter_circle();
        for i in 0..=16 {
            let t = f64::from(i) / 16.0;
            let p = c.eval(t);
            assert!((p.to_vec2().hypot() - 1.0).abs() < 1e-12, "{p:?} at {t}");
        }
        let mid = c.eval(0.5);
        assert!((mid.x - mid.y).abs() < 1e-12);
    }

    #[test]
    fn conic_tangent_is_perpendicular_to_radius() {
        let c = quarter_circle();
        for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
            let radius = c.eval(t).to_vec2();
            let tangent = c.tangent(t);
            assert!(radius.dot(tangent).abs() < 1e-12, "at {t}");
            assert!(radius.cross(tangent) > 0.0);
        }
    }

    #[test]
    fn conic_subdivide_stays_on_circle() {
        let c = quarter_circle();
        let sub = c.subdivide_t(0.25, 0.75);
        assert_eq!(sub.p0, c.pt_t(0.25).pt);
        assert_eq!(sub.p2, c.pt_t(0.75).pt);
        assert!(sub.weight > c.weight && sub.weight < 1.0);
        for i in 0..=8 {
            let p = sub.eval(f64::from(i) / 8.0);
            assert!((p.to_vec2().hypot() - 1.0).abs() < 1e-12, "{p:?}");
        }
    }

    #[test]
    fn conic_axis_roots() {
        let c = quarter_circle();
        let half = 0.5;
        let roots = c.axis_ts(Axis::Horizontal, half, T_EPSILON);
        assert_eq!(roots.len(), 1);
        let p = c.eval(roots.as_slice()[0]);
        assert!((p.x - half).abs() < 1e-12);
        assert!((p.y - 0.75f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn conic_extrema() {
        // A half circle from (1, 0) to (-1, 0) is not monotonic in y.
        let c = Conic::new((1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), 1e-3);
        let extrema = c.extrema();
        assert_eq!(extrema.len(), 1);
        assert!((extrema[0] - 0.5).abs() < 1e-9);
        assert!(quarter_circle().extrema().is_empty());
    }

    #[test]
    fn conic_degenerate_weight_falls_back() {
        // With weight -1 the denominator is (1 - 2t)², zero at t = 0.5.
        let c = Conic::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0), -1.0);
        let start = c.pt_t(0.0);
        let end = crate::PtT::new(Point::new(1.0, 0.5), 0.5);
        let sub = c.subdivide(start, end);
        assert_eq!(sub.weight, 1.0);
        assert_eq!(sub.p1, Point::new(0.5, 0.25));
    }

    #[test]
    fn conic_subdivide_weight_always_finite() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let mut pt = || {
                Point::new(
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                )
            };
            let (p0, p1, p2) = (pt(), pt(), pt());
            let weight = rng.random_range(-2.0..4.0);
            let c = Conic::new(p0, p1, p2, weight);
            let t1: f64 = rng.random_range(0.0..1.0);
            let t2: f64 = rng.random_range(t1..=1.0);
            let (start, end) = (c.pt_t(t1), c.pt_t(t2));
            if !start.pt.is_finite() || !end.pt.is_finite() {
                continue;
            }
            let sub = c.subdivide(start, end);
            assert!(sub.is_finite(), "{c:?} [{t1}, {t2}] gave {sub:?}");
            assert!(sub.is_monotonic());
            if weight > 0.0 {
                assert!(sub.weight >= 0.0, "{c:?} [{t1}, {t2}] gave {sub:?}");
            }
        }
    }
}
