// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Real roots of low-order polynomials, restricted to curve parameters.
//!
//! Every solver here tolerates a vanishing leading coefficient by falling
//! back to the next lower order (cubic to quadratic to linear to nothing),
//! so callers never special-case degenerate curves.

use core::fmt;

use arrayvec::ArrayVec;

use crate::common::almost_equal_ulps;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// The largest number of roots a [`Roots`] set can hold.
pub const MAX_ROOTS: usize = 5;

/// Parametric values closer than this to 0 or 1 are snapped to the bound.
///
/// This is single-precision machine epsilon: curve parameters computed in
/// double precision are trusted to about this much.
pub const T_EPSILON: f64 = f32::EPSILON as f64;

/// Why a root search produced no usable roots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RootFail {
    /// The roots are valid (possibly empty).
    #[default]
    None,
    /// The intersection could not be computed reliably; the rotated frame
    /// exceeded its safe coordinate range.
    RawIntersectFailed,
    /// All hits lie before the start of the reference segment.
    OutsideFirstPt,
    /// All hits lie past the end of the reference segment.
    OutsideLastPt,
}

/// A small unordered set of real polynomial roots.
///
/// Holds up to [`MAX_ROOTS`] values, tagged with a failure reason when no
/// valid set could be produced.
#[derive(Clone, Default, PartialEq)]
pub struct Roots {
    roots: ArrayVec<f64, MAX_ROOTS>,
    fail: RootFail,
}

impl Roots {
    /// An empty, valid root set.
    #[inline]
    pub fn new() -> Roots {
        Roots::default()
    }

    /// A root set that carries only a failure reason.
    #[inline]
    pub fn failed(fail: RootFail) -> Roots {
        Roots {
            roots: ArrayVec::new(),
            fail,
        }
    }

    /// Build a root set from values.
    ///
    /// Values beyond [`MAX_ROOTS`] are ignored.
    pub fn from_slice(values: &[f64]) -> Roots {
        let mut roots = Roots::new();
        for &v in values {
            roots.push(v);
        }
        roots
    }

    /// Append a root, ignoring it if the set is full.
    #[inline]
    pub fn push(&mut self, root: f64) {
        let _ = self.roots.try_push(root);
    }

    /// Append a root unless one within a few ulps is already present.
    ///
    /// The first occurrence wins.
    pub fn push_unique(&mut self, root: f64) {
        if !self.roots.iter().any(|&r| almost_equal_ulps(r, root)) {
            self.push(root);
        }
    }

    /// The failure reason, [`RootFail::None`] for a valid set.
    #[inline]
    pub fn fail(&self) -> RootFail {
        self.fail
    }

    /// Tag the set with a failure reason.
    #[inline]
    pub fn set_fail(&mut self, fail: RootFail) {
        self.fail = fail;
    }

    /// The number of roots.
    #[inline]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether there are no roots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The roots, in the order found.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.roots
    }

    /// Iterate over the roots.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.roots.iter().copied()
    }

    /// Sort the roots ascending. `NaN` values sort last.
    pub fn sort(&mut self) {
        self.roots.sort_by(|a, b| a.total_cmp(b));
    }

    /// Keep only roots that are valid curve parameters.
    ///
    /// Roots outside `[-epsilon, 1 + epsilon]` are dropped, roots within
    /// `epsilon` of either bound are snapped to exactly `0.0` or `1.0`, and
    /// duplicates (within `epsilon`) are removed, keeping the first.
    #[must_use]
    pub fn keep_valid_ts(&self, epsilon: f64) -> Roots {
        let mut valid = Roots::failed(self.fail);
        for root in self.iter() {
            if root.is_nan() || root < -epsilon || root > 1.0 + epsilon {
                continue;
            }
            let t = if root <= epsilon {
                0.0
            } else if root >= 1.0 - epsilon {
                1.0
            } else {
                root
            };
            if !valid.roots.iter().any(|&v| (v - t).abs() <= epsilon) {
                valid.push(t);
            }
        }
        valid
    }

    /// Keep only roots strictly inside the curve.
    ///
    /// Like [`Roots::keep_valid_ts`], but roots within `epsilon` of 0 or 1
    /// are discarded rather than snapped. Used for extrema and inflections,
    /// where a solution at an endpoint is not a feature of the curve.
    #[must_use]
    pub fn keep_interior_ts(&self, epsilon: f64) -> Roots {
        let mut interior = Roots::failed(self.fail);
        for root in self.iter() {
            if root.is_nan() || root <= epsilon || root >= 1.0 - epsilon {
                continue;
            }
            if !interior.roots.iter().any(|&v| (v - root).abs() <= epsilon) {
                interior.push(root);
            }
        }
        interior
    }
}

impl fmt::Debug for Roots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Roots");
        dbg.field("roots", &self.roots.as_slice());
        if self.fail != RootFail::None {
            dbg.field("fail", &self.fail);
        }
        dbg.finish()
    }
}

impl<'a> IntoIterator for &'a Roots {
    type Item = &'a f64;
    type IntoIter = core::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}

/// Solve `a + (b - a) t = v` for `t`.
///
/// Returns `None` when `a` and `b` differ by no more than machine epsilon:
/// the segment runs along the axis, and the caller must treat it as
/// coincident rather than divide by a vanishing denominator.
pub fn linear_root(a: f64, b: f64, v: f64) -> Option<f64> {
    let denom = b - a;
    if denom.abs() <= f64::EPSILON {
        return None;
    }
    Some((v - a) / denom)
}

/// Find real roots of `a t² + b t + c = 0`.
///
/// Uses the reduced form with `p = b / 2a` and `q = c / a`; there are no
/// real roots when `p² < q`, one when `p² == q`, and two otherwise. When
/// `a` is zero, or so small that `p` or `q` is not finite, the linear
/// equation is solved instead.
///
/// This is the fast form. See [`quadratic_roots_precise`] for the variant
/// used where cancellation matters.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::new();
    let p = b / (2.0 * a);
    let q = c / a;
    if !p.is_finite() || !q.is_finite() {
        linear_roots_into(&mut roots, b, c);
        return roots;
    }
    let p2 = p * p;
    if p2 < q {
        return roots;
    }
    if p2 == q {
        roots.push(-p);
        return roots;
    }
    let sqrt = (p2 - q).sqrt();
    roots.push(sqrt - p);
    roots.push(-sqrt - p);
    roots
}

/// Find real roots of `a t² + b t + c = 0`, guarding against cancellation.
///
/// The discriminant is evaluated with fused multiply-adds, a discriminant
/// within rounding of zero is reported as one double root, and the second
/// root is recovered from the product of roots rather than by subtracting
/// nearly equal values. Degenerate curves (collinear or coincident control
/// points) produce exactly these ill-conditioned equations, where the fast
/// form can report the wrong number of roots.
pub fn quadratic_roots_precise(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::new();
    let sc0 = c / a;
    let sc1 = b / a;
    if !sc0.is_finite() || !sc1.is_finite() {
        linear_roots_into(&mut roots, b, c);
        return roots;
    }
    // disc = sc1² - 4 sc0, with the product rounded once.
    let disc = sc1.mul_add(sc1, -4.0 * sc0);
    let root1 = if !disc.is_finite() {
        // sc1² overflowed. Find one root from sc1 t + t² = 0, the other
        // from the product of roots.
        -sc1
    } else {
        let scale = (sc1 * sc1).max((4.0 * sc0).abs());
        if disc.abs() <= 4.0 * f64::EPSILON * scale {
            roots.push(-0.5 * sc1);
            return roots;
        }
        if disc < 0.0 {
            return roots;
        }
        -0.5 * (sc1 + disc.sqrt().copysign(sc1))
    };
    let root2 = sc0 / root1;
    roots.push(root1);
    if root2.is_finite() {
        roots.push_unique(root2);
    }
    roots
}

fn linear_roots_into(roots: &mut Roots, b: f64, c: f64) {
    let root = -c / b;
    if root.is_finite() {
        roots.push(root);
    }
}

/// Find real roots of `a t³ + b t² + c t + d = 0`.
///
/// Exact roots at `t = 0` (`d == 0`) and `t = 1` (`a + b + c + d == 0`) are
/// factored out before any numerical solving. Otherwise the normalized
/// depressed cubic is classified by its discriminant into the
/// three-real-root trigonometric branch or the one-real-root Cardano
/// branch. Roots are deduplicated as they are found, since the
/// trigonometric branch can reach the same root through two phases.
pub fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Roots {
    if d == 0.0 {
        // t = 0 is a root; solve a t² + b t + c = 0 for the rest.
        let mut roots = quadratic_roots(a, b, c);
        roots.push_unique(0.0);
        return roots;
    }
    if a + b + c + d == 0.0 {
        // t = 1 is a root; deflate by (t - 1).
        let mut roots = quadratic_roots(a, a + b, a + b + c);
        roots.push_unique(1.0);
        return roots;
    }
    let na = b / a;
    let nb = c / a;
    let nc = d / a;
    if !na.is_finite() || !nb.is_finite() || !nc.is_finite() {
        return quadratic_roots(b, c, d);
    }
    let mut roots = Roots::new();
    let na2 = na * na;
    let q = (na2 - nb * 3.0) / 9.0;
    let r = (2.0 * na2 * na - 9.0 * na * nb + 27.0 * nc) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;
    let adiv3 = na / 3.0;
    if r2 < q3 {
        // Three real roots.
        let theta = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        let neg_2_root_q = -2.0 * q.sqrt();
        const TAU: f64 = 2.0 * core::f64::consts::PI;
        roots.push_unique(neg_2_root_q * (theta / 3.0).cos() - adiv3);
        roots.push_unique(neg_2_root_q * ((theta + TAU) / 3.0).cos() - adiv3);
        roots.push_unique(neg_2_root_q * ((theta - TAU) / 3.0).cos() - adiv3);
    } else {
        // One real root, plus a double root when the discriminant vanishes.
        let mut big_a = (r.abs() + (r2 - q3).sqrt()).cbrt();
        if r > 0.0 {
            big_a = -big_a;
        }
        if big_a != 0.0 {
            big_a += q / big_a;
        }
        roots.push_unique(big_a - adiv3);
        if almost_equal_ulps(r2, q3) {
            roots.push_unique(-big_a / 2.0 - adiv3);
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify(roots: Roots, expected: &[f64], epsilon: f64) {
        let mut roots = roots;
        roots.sort();
        assert_eq!(roots.len(), expected.len(), "{roots:?} vs {expected:?}");
        for (r, e) in roots.iter().zip(expected) {
            assert!((r - e).abs() < epsilon, "{roots:?} vs {expected:?}");
        }
    }

    #[test]
    fn linear() {
        assert_eq!(linear_root(0.0, 4.0, 1.0), Some(0.25));
        assert_eq!(linear_root(3.0, 3.0, 3.0), None);
        assert_eq!(linear_root(3.0, 3.0 + f64::EPSILON, 3.0), None);
    }

    #[test]
    fn quadratic_double_root_counts_once() {
        // (t - 0.5)²
        verify(quadratic_roots(1.0, -1.0, 0.25), &[0.5], 1e-12);
        verify(quadratic_roots_precise(1.0, -1.0, 0.25), &[0.5], 1e-12);
        // (t - 1)²
        verify(quadratic_roots(4.0, -8.0, 4.0), &[1.0], 1e-12);
    }

    #[test]
    fn quadratic() {
        let s5 = 5.0f64.sqrt();
        verify(quadratic_roots(1.0, 0.0, -5.0), &[-s5, s5], 1e-12);
        verify(quadratic_roots(1.0, 0.0, 5.0), &[], 0.0);
        verify(quadratic_roots(0.0, 1.0, 5.0), &[-5.0], 1e-12);
        verify(quadratic_roots(0.0, 0.0, 5.0), &[], 0.0);
        verify(quadratic_roots_precise(1.0, 0.0, -5.0), &[-s5, s5], 1e-12);
        verify(quadratic_roots_precise(0.0, 1.0, 5.0), &[-5.0], 1e-12);
        verify(quadratic_roots_precise(1.0, 1e200, 1.0), &[-1e200, -1e-200], 1e-12);
    }

    #[test]
    fn quadratic_precise_degenerate() {
        // Tiny coefficients, as produced by a nearly straight curve, still
        // give a single double root.
        let (a, b, c) = (1e-8, -2e-8, 1e-8);
        verify(quadratic_roots_precise(a, b, c), &[1.0], 1e-7);
    }

    #[test]
    fn cubic_three_distinct() {
        // (t - 1)(t - 2)(t - 3)
        verify(cubic_roots(1.0, -6.0, 11.0, -6.0), &[1.0, 2.0, 3.0], 1e-4);
    }

    #[test]
    fn cubic_exact_endpoints() {
        // t (t - 0.5)(t - 2)
        let roots = cubic_roots(1.0, -2.5, 1.0, 0.0);
        assert!(roots.iter().any(|r| r == 0.0));
        verify(roots, &[0.0, 0.5, 2.0], 1e-12);
        // (t - 1)(t + 1)(t - 3) = t³ - 3t² - t + 3
        let roots = cubic_roots(1.0, -3.0, -1.0, 3.0);
        assert!(roots.iter().any(|r| r == 1.0));
        verify(roots, &[-1.0, 1.0, 3.0], 1e-12);
    }

    #[test]
    fn cubic_degrades() {
        verify(cubic_roots(0.0, 1.0, -3.0, 2.0), &[1.0, 2.0], 1e-12);
        verify(cubic_roots(0.0, 0.0, 2.0, -1.0), &[0.5], 1e-12);
        verify(cubic_roots(0.0, 0.0, 0.0, 1.0), &[], 0.0);
    }

    #[test]
    fn cubic_single_and_double() {
        verify(cubic_roots(1.0, 0.0, 0.0, -5.0), &[5.0f64.cbrt()], 1e-12);
        // (t + 1)²(t - 2) = t³ - 3t - 2
        verify(cubic_roots(1.0, 0.0, -3.0, -2.0), &[-1.0, 2.0], 1e-6);
    }

    #[test]
    fn keep_valid_snaps_to_bounds() {
        let roots = Roots::from_slice(&[0.999999999, -1e-9, 0.5, 1.5, -0.25]);
        let valid = roots.keep_valid_ts(T_EPSILON);
        assert_eq!(valid.as_slice(), &[1.0, 0.0, 0.5]);
    }

    #[test]
    fn keep_valid_dedups() {
        let roots = Roots::from_slice(&[0.25, 0.25 + 1e-12, 1.0 + 1e-10, 1.0]);
        let valid = roots.keep_valid_ts(T_EPSILON);
        assert_eq!(valid.as_slice(), &[0.25, 1.0]);
    }

    #[test]
    fn keep_interior_drops_bounds() {
        let roots = Roots::from_slice(&[0.999999999, -1e-9, 0.5, f64::NAN]);
        let interior = roots.keep_interior_ts(T_EPSILON);
        assert_eq!(interior.as_slice(), &[0.5]);
    }

    #[test]
    fn failure_survives_filtering() {
        let roots = Roots::failed(RootFail::OutsideLastPt);
        assert_eq!(roots.keep_valid_ts(T_EPSILON).fail(), RootFail::OutsideLastPt);
    }
}
