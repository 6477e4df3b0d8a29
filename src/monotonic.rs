// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decomposition of curves into monotonic pieces.
//!
//! A curve is monotonic when its control points lie inside the rectangle
//! spanned by its endpoints. The intersection code relies on this to bound
//! searches and to reason about parameter order along axis-aligned rays.

use smallvec::SmallVec;

use crate::{CurveOps, PtT};

/// The parameters where `curve` must be split: 0, 1, and every interior
/// extremum and inflection, sorted and deduplicated to within `epsilon`.
pub fn split_ts<C: CurveOps>(curve: &C, epsilon: f64) -> SmallVec<[f64; 8]> {
    let mut ts: SmallVec<[f64; 8]> = SmallVec::new();
    ts.push(0.0);
    ts.extend(
        curve
            .extrema()
            .into_iter()
            .filter(|&t| t > epsilon && t < 1.0 - epsilon),
    );
    ts.extend(curve.inflections().keep_interior_ts(epsilon).iter());
    ts.push(1.0);
    ts.sort_by(|a, b| a.total_cmp(b));
    ts.dedup_by(|b, a| *b - *a <= epsilon);
    if ts.last() != Some(&1.0) {
        // Dedup kept an interior value within epsilon of the end.
        ts.pop();
        ts.push(1.0);
    }
    ts
}

/// Split a curve into monotonic pieces.
///
/// Each piece is re-derived from the original curve between consecutive
/// split parameters, rather than by interpolating the original controls.
/// Pieces that would have zero length are skipped, so the result can be
/// empty for a curve that is a single point.
pub fn monotonic_split<C: CurveOps>(curve: &C, epsilon: f64) -> SmallVec<[C; 4]> {
    let ts = split_ts(curve, epsilon);
    let mut pieces = SmallVec::new();
    if ts.len() == 2 {
        if curve.start() == curve.end() && curve.hull().iter().all(|&p| p == curve.start()) {
            return pieces;
        }
        // No interior features; only rounding can have pushed a control
        // out of the endpoint rectangle.
        if curve.is_monotonic() {
            pieces.push(curve.clone());
        } else {
            pieces.push(curve.subdivide_t(0.0, 1.0));
        }
        return pieces;
    }
    let pts: SmallVec<[PtT; 8]> = ts.iter().map(|&t| curve.pt_t(t)).collect();
    for pair in pts.windows(2) {
        if pair[0].pt == pair[1].pt {
            continue;
        }
        pieces.push(curve.subdivide(pair[0], pair[1]));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::{Conic, CubicBez, Curve, ParamCurve, Point, QuadBez, Rect, T_EPSILON};

    fn check_pieces(curve: &Curve) {
        let pieces = monotonic_split(curve, T_EPSILON);
        assert!(!pieces.is_empty());
        assert_eq!(pieces[0].start(), curve.start());
        assert_eq!(pieces[pieces.len() - 1].end(), curve.end());
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        let mut ends = Rect::from_points(curve.start(), curve.end());
        let mut all = ends;
        for piece in &pieces {
            assert!(piece.is_monotonic(), "{piece:?} from {curve:?}");
            ends = ends.union(Rect::from_points(piece.start(), piece.end()));
            all = all.union(piece.bounds());
        }
        assert_eq!(ends, all);
    }

    #[test]
    fn split_quad_at_extremum() {
        let q = QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0));
        let pieces = monotonic_split(&q, T_EPSILON);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].p2, Point::new(1.0, 1.0));
        assert!((pieces[0].p1 - Point::new(0.5, 1.0)).hypot() < 1e-12);
    }

    #[test]
    fn split_cubic_at_inflection() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, -1.0), (3.0, 0.0));
        let ts = split_ts(&c, T_EPSILON);
        assert_eq!(ts.len(), 5);
        assert!((ts[2] - 0.5).abs() < 1e-12);
        check_pieces(&c.into());
    }

    #[test]
    fn monotonic_curve_is_unchanged() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 0.25), (2.0, 1.5), (3.0, 4.0));
        let pieces = monotonic_split(&c, T_EPSILON);
        assert_eq!(pieces.as_slice(), &[c]);
    }

    #[test]
    fn point_curve_has_no_pieces() {
        let q = QuadBez::new((1.0, 1.0), (1.0, 1.0), (1.0, 1.0));
        assert!(monotonic_split(&q, T_EPSILON).is_empty());
    }

    #[test]
    fn random_curves_split_into_monotonic_pieces() {
        let mut rng = StdRng::seed_from_u64(1);
        let pt = |rng: &mut StdRng| {
            Point::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0))
        };
        for _ in 0..500 {
            let q = QuadBez::new(pt(&mut rng), pt(&mut rng), pt(&mut rng));
            check_pieces(&q.into());
            let weight = rng.random_range(0.1..3.0);
            let k = Conic::new(pt(&mut rng), pt(&mut rng), pt(&mut rng), weight);
            check_pieces(&k.into());
            let c = CubicBez::new(pt(&mut rng), pt(&mut rng), pt(&mut rng), pt(&mut rng));
            check_pieces(&c.into());
        }
    }
}
