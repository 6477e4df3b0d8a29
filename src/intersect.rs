// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections between curves.
//!
//! A curve meets a line where, in the frame that makes the line vertical,
//! the curve crosses `x = 0`; every kind's axis solver does the rest.
//! Two curves are intersected by halving both until the pieces are
//! straight enough to be treated as lines.

use smallvec::SmallVec;

use crate::{Affine, Axis, Curve, CurveOps, Limits, Line, OpError, Point, RootFail, Roots};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A point where two curves meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// The parameter on the first curve.
    pub t0: f64,
    /// The parameter on the second curve.
    pub t1: f64,
    /// Where the curves meet.
    pub pt: Point,
}

/// The parameter of the projection of `pt` onto `line`.
///
/// 0 at the start of the line and 1 at its end; `NaN` for a line of zero
/// length.
pub fn line_t(line: &Line, pt: Point) -> f64 {
    let d = line.p1 - line.p0;
    (pt - line.p0).dot(d) / d.hypot2()
}

/// Parameters on `curve` where it crosses the segment `line`.
///
/// The curve is mapped into the frame where `line` runs up the y axis
/// from the origin, and solved for `x = 0`. Hits beyond the ends of the
/// segment are dropped; when every hit was dropped the result is tagged
/// [`RootFail::OutsideFirstPt`] or [`RootFail::OutsideLastPt`]. When the
/// mapped curve exceeds [`Limits::max_rotated`] the solve is not trusted
/// and the result is tagged [`RootFail::RawIntersectFailed`].
pub fn line_roots<C: CurveOps>(curve: &C, line: &Line, limits: &Limits) -> Roots {
    let len2 = (line.p1 - line.p0).hypot2();
    if len2 == 0.0 {
        return Roots::new();
    }
    let rotated = curve.transform(Affine::toward_vertical(*line));
    let in_range = |p: &Point| p.x.abs() <= limits.max_rotated && p.y.abs() <= limits.max_rotated;
    if !rotated.hull().iter().all(in_range) {
        return Roots::failed(RootFail::RawIntersectFailed);
    }
    let raw = rotated.axis_ts(Axis::Horizontal, 0.0, limits.t_epsilon);
    let mut roots = Roots::failed(raw.fail());
    let (mut before, mut after) = (0, 0);
    for t in raw.iter() {
        let s = rotated.pt_t(t).pt.y / len2;
        if s < -limits.t_epsilon {
            before += 1;
        } else if s > 1.0 + limits.t_epsilon {
            after += 1;
        } else {
            roots.push(t);
        }
    }
    if roots.is_empty() {
        if before > 0 && after == 0 {
            roots.set_fail(RootFail::OutsideFirstPt);
        } else if after > 0 && before == 0 {
            roots.set_fail(RootFail::OutsideLastPt);
        }
    }
    roots
}

fn snap_t(t: f64, epsilon: f64) -> Option<f64> {
    if t.is_nan() || t < -epsilon || t > 1.0 + epsilon {
        None
    } else if t <= epsilon {
        Some(0.0)
    } else if t >= 1.0 - epsilon {
        Some(1.0)
    } else {
        Some(t)
    }
}

/// Intersections of two segments, as `(t on a, t on b)` pairs.
///
/// Collinear overlapping segments meet at each endpoint that lies on the
/// other segment.
pub fn segment_hits(a: &Line, b: &Line, limits: &Limits) -> SmallVec<[(f64, f64); 2]> {
    let mut hits: SmallVec<[(f64, f64); 2]> = SmallVec::new();
    let eps = limits.t_epsilon;
    let da = a.p1 - a.p0;
    let db = b.p1 - b.p0;
    let (la, lb) = (da.hypot(), db.hypot());
    if la == 0.0 || lb == 0.0 {
        return hits;
    }
    let denom = da.cross(db);
    if denom.abs() <= limits.line_tolerance * la * lb {
        let offset = (b.p0 - a.p0).cross(da).abs() / la;
        if offset > limits.point_tolerance {
            return hits;
        }
        let mut push = |ta: Option<f64>, tb: Option<f64>| {
            if let (Some(ta), Some(tb)) = (ta, tb) {
                if !hits.iter().any(|&(x, y)| x == ta && y == tb) {
                    hits.push((ta, tb));
                }
            }
        };
        push(snap_t(line_t(a, b.p0), eps), Some(0.0));
        push(snap_t(line_t(a, b.p1), eps), Some(1.0));
        push(Some(0.0), snap_t(line_t(b, a.p0), eps));
        push(Some(1.0), snap_t(line_t(b, a.p1), eps));
        return hits;
    }
    let w = b.p0 - a.p0;
    if let (Some(ta), Some(tb)) = (
        snap_t(w.cross(db) / denom, eps),
        snap_t(w.cross(da) / denom, eps),
    ) {
        hits.push((ta, tb));
    }
    hits
}

/// Collects hits between two curves, in their full parameter ranges.
struct Search<'a> {
    a: &'a Curve,
    b: &'a Curve,
    limits: &'a Limits,
    hits: SmallVec<[Intersection; 4]>,
    error: Option<OpError>,
}

impl Search<'_> {
    fn push(&mut self, ta: f64, tb: f64) {
        let eps = self.limits.t_epsilon;
        let (Some(ta), Some(tb)) = (snap_t(ta, eps), snap_t(tb, eps)) else {
            return;
        };
        if self
            .hits
            .iter()
            .any(|h| (h.t0 - ta).abs() <= eps && (h.t1 - tb).abs() <= eps)
        {
            return;
        }
        let pt = if ta == 0.0 || ta == 1.0 || !(tb == 0.0 || tb == 1.0) {
            self.a.pt_t(ta).pt
        } else {
            self.b.pt_t(tb).pt
        };
        self.hits.push(Intersection { t0: ta, t1: tb, pt });
        if self.hits.len() > self.limits.max_hits_per_pair {
            self.error = Some(OpError::Intersection);
        }
    }

    /// Hits of a curve piece against a straight piece's chord.
    ///
    /// `line_is_a` says which of the two curves the chord belongs to.
    fn line_leaf(
        &mut self,
        chord: &Line,
        line_range: (f64, f64),
        piece: &Curve,
        piece_range: (f64, f64),
        line_is_a: bool,
    ) {
        let roots = line_roots(piece, chord, self.limits);
        if roots.fail() == RootFail::RawIntersectFailed {
            self.error = Some(OpError::VerticalRotationRange);
            return;
        }
        for t in roots.iter() {
            let s = line_t(chord, piece.pt_t(t).pt);
            let t_line = line_range.0 + s * (line_range.1 - line_range.0);
            let t_piece = piece_range.0 + t * (piece_range.1 - piece_range.0);
            if line_is_a {
                self.push(t_line, t_piece);
            } else {
                self.push(t_piece, t_line);
            }
        }
    }

    fn recurse(&mut self, a_range: (f64, f64), b_range: (f64, f64), depth: u32) {
        if self.error.is_some() {
            return;
        }
        let pa = self.a.subdivide_t(a_range.0, a_range.1);
        let pb = self.b.subdivide_t(b_range.0, b_range.1);
        let tolerance = self.limits.point_tolerance;
        if !pa.bounds().inflate(tolerance).overlaps(pb.bounds()) {
            return;
        }
        let a_line = pa.is_line(self.limits.line_tolerance);
        let b_line = pb.is_line(self.limits.line_tolerance);
        if (a_line && b_line) || depth >= self.limits.max_depth {
            let lerp = |range: (f64, f64), s: f64| range.0 + s * (range.1 - range.0);
            for (sa, sb) in segment_hits(&pa.chord(), &pb.chord(), self.limits) {
                self.push(lerp(a_range, sa), lerp(b_range, sb));
            }
            return;
        }
        if a_line {
            self.line_leaf(&pa.chord(), a_range, &pb, b_range, true);
            return;
        }
        if b_line {
            self.line_leaf(&pb.chord(), b_range, &pa, a_range, false);
            return;
        }
        let am = 0.5 * (a_range.0 + a_range.1);
        let bm = 0.5 * (b_range.0 + b_range.1);
        for a_half in [(a_range.0, am), (am, a_range.1)] {
            for b_half in [(b_range.0, bm), (bm, b_range.1)] {
                self.recurse(a_half, b_half, depth + 1);
            }
        }
    }
}

/// Find where two monotonic curves meet.
///
/// Curves that are the same shape, in either direction, report no hits:
/// they are coincident rather than crossing, and are merged by the caller.
///
/// # Errors
///
/// [`OpError::VerticalRotationRange`] if a line solve left its trusted
/// range, and [`OpError::Intersection`] if the curves meet in more than
/// [`Limits::max_hits_per_pair`] places, which happens when they overlap
/// along part of their length.
pub fn intersect(
    a: &Curve,
    b: &Curve,
    limits: &Limits,
) -> Result<SmallVec<[Intersection; 4]>, OpError> {
    let tolerance = limits.point_tolerance;
    if a.approx_eq(b, tolerance) || a.approx_eq(&b.reversed(), tolerance) {
        return Ok(SmallVec::new());
    }
    let mut search = Search {
        a,
        b,
        limits,
        hits: SmallVec::new(),
        error: None,
    };
    match (a, b) {
        (Curve::Line(la), Curve::Line(lb)) => {
            for (ta, tb) in segment_hits(la, lb, limits) {
                search.push(ta, tb);
            }
        }
        (Curve::Line(la), _) => search.line_leaf(la, (0.0, 1.0), b, (0.0, 1.0), true),
        (_, Curve::Line(lb)) => search.line_leaf(lb, (0.0, 1.0), a, (0.0, 1.0), false),
        _ => search.recurse((0.0, 1.0), (0.0, 1.0), 0),
    }
    match search.error {
        Some(err) => Err(err),
        None => Ok(search.hits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CubicBez, QuadBez};

    fn limits() -> Limits {
        Limits::default()
    }

    #[test]
    fn crossing_lines() {
        let a = Line::new((0.0, 0.0), (2.0, 2.0));
        let b = Line::new((0.0, 2.0), (2.0, 0.0));
        let hits = intersect(&a.into(), &b.into(), &limits()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].t0, hits[0].t1), (0.5, 0.5));
        assert_eq!(hits[0].pt, Point::new(1.0, 1.0));
    }

    #[test]
    fn collinear_overlap() {
        let a = Line::new((0.0, 0.0), (4.0, 0.0));
        let b = Line::new((1.0, 0.0), (6.0, 0.0));
        let mut hits = segment_hits(&a, &b, &limits());
        hits.sort_by(|x, y| x.0.total_cmp(&y.0));
        assert_eq!(hits.as_slice(), &[(0.25, 0.0), (1.0, 0.6)]);
        let c = Line::new((0.0, 1.0), (4.0, 1.0));
        assert!(segment_hits(&a, &c, &limits()).is_empty());
    }

    #[test]
    fn line_roots_outside() {
        let line = Line::new((0.0, 0.0), (1.0, 0.0));
        let curve = QuadBez::new((3.0, -1.0), (3.5, 0.0), (3.0, 1.0));
        let roots = line_roots(&curve, &line, &limits());
        assert!(roots.is_empty());
        assert_eq!(roots.fail(), RootFail::OutsideLastPt);
        let line = Line::new((5.0, 0.0), (6.0, 0.0));
        assert_eq!(
            line_roots(&curve, &line, &limits()).fail(),
            RootFail::OutsideFirstPt
        );
    }

    #[test]
    fn line_roots_out_of_range() {
        let line = Line::new((0.0, 0.0), (1e9, 1e9));
        let curve = QuadBez::new((0.0, 1e9), (1e9, 1e9), (1e9, 0.0));
        let roots = line_roots(&curve, &line, &limits());
        assert_eq!(roots.fail(), RootFail::RawIntersectFailed);
    }

    #[test]
    fn line_meets_quad() {
        let line = Line::new((0.0, 0.5), (2.0, 0.5));
        // y = 2t(1 - t), so y = 0.5 only at the apex, t = 0.5.
        let quad = QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0));
        let a = Curve::from(quad.subdivide_t(0.0, 0.5));
        let hits = intersect(&line.into(), &a, &limits()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].t1, 1.0);
        assert!((hits[0].t0 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn curves_cross() {
        // Two monotonic cubics crossing once near (1, 1).
        let a = CubicBez::new((0.0, 0.0), (0.5, 0.1), (1.5, 1.9), (2.0, 2.0));
        let b = CubicBez::new((0.0, 2.0), (0.5, 1.9), (1.5, 0.1), (2.0, 0.0));
        let hits = intersect(&a.into(), &b.into(), &limits()).unwrap();
        assert_eq!(hits.len(), 1);
        let hit = hits[0];
        assert!((hit.t0 - 0.5).abs() < 1e-6, "{hit:?}");
        assert!((hit.t1 - 0.5).abs() < 1e-6, "{hit:?}");
        assert!((hit.pt - Point::new(1.0, 1.0)).hypot() < 1e-6);
    }

    #[test]
    fn same_curve_is_not_a_crossing() {
        let a = Curve::from(CubicBez::new((0.0, 0.0), (0.5, 0.1), (1.5, 1.9), (2.0, 2.0)));
        assert!(intersect(&a, &a.reversed(), &limits()).unwrap().is_empty());
    }

    #[test]
    fn overlapping_curves_are_an_error() {
        let c = CubicBez::new((0.0, 0.0), (0.5, 0.1), (1.5, 1.9), (2.0, 2.0));
        let a = Curve::from(c.subdivide_t(0.0, 0.75));
        let b = Curve::from(c.subdivide_t(0.25, 1.0));
        assert_eq!(intersect(&a, &b, &limits()), Err(OpError::Intersection));
    }
}
