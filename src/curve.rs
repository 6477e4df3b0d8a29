// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The curve capability interface, and the curve type the engine stores.
//!
//! Every operation the engine needs from a curve is a method of
//! [`CurveOps`]. The built-in kinds ([`Line`], [`QuadBez`], [`Conic`] and
//! [`CubicBez`]) implement it directly and are dispatched statically
//! through the [`Curve`] enum. Caller-defined kinds implement
//! [`CurveTable`], are registered with a [`Context`] to obtain a
//! [`CurveKind`], and are dispatched dynamically through that table.
//!
//! [`Context`]: crate::Context

use alloc::sync::Arc;
use core::fmt;

use arrayvec::ArrayVec;
use smallvec::SmallVec;

use crate::{
    Affine, Axis, Conic, CubicBez, Line, ParamCurve, ParamCurveExtrema, PathSink, Point, PtT,
    QuadBez, Rect, Roots, Vec2, MAX_EXTREMA,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// The operations every curve kind provides to the engine.
///
/// Curves handed to the engine are monotonic: their control points lie
/// inside the rectangle spanned by their endpoints. Several operations
/// (subdivision pinning, intersection bounds) rely on it.
pub trait CurveOps: ParamCurve + ParamCurveExtrema + Clone {
    /// The direction of travel at `t`.
    ///
    /// The magnitude is unspecified; only the direction is meaningful.
    fn tangent(&self, t: f64) -> Vec2;

    /// The roots of `axis.coord(self.eval(t)) == value`, unfiltered.
    ///
    /// Callers restrict them with [`Roots::keep_valid_ts`].
    fn axis_roots(&self, axis: Axis, value: f64) -> Roots;

    /// The part of the curve between two positions on it.
    ///
    /// The result starts exactly at `start.pt` and ends exactly at
    /// `end.pt`; interior control data is recomputed and pinned inside
    /// the new endpoints' rectangle.
    #[must_use]
    fn subdivide(&self, start: PtT, end: PtT) -> Self;

    /// Whether the control points are close enough to the chord that the
    /// curve can be treated as a line.
    ///
    /// `tolerance` is a distance; it is scaled by the chord length when
    /// the chord is longer than one unit.
    fn is_line(&self, tolerance: f64) -> bool;

    /// The endpoints and control points, in order.
    fn hull(&self) -> SmallVec<[Point; 4]>;

    /// Apply an affine transform to every point of the curve.
    #[must_use]
    fn transform(&self, affine: Affine) -> Self;

    /// The same curve traversed in the opposite direction.
    #[must_use]
    fn reversed(&self) -> Self;

    /// Emit the curve as path elements.
    ///
    /// `first` is set on the first curve of an output contour, which must
    /// begin a new subpath; `last` is set on its final curve, which must
    /// close it.
    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool);

    /// The position at `t`, exact at the endpoints.
    #[inline]
    fn pt_t(&self, t: f64) -> PtT {
        let pt = if t == 0.0 {
            self.start()
        } else if t == 1.0 {
            self.end()
        } else {
            self.eval(t)
        };
        PtT::new(pt, t)
    }

    /// The normal at `t`: the tangent turned clockwise (in a Y-down
    /// coordinate system).
    #[inline]
    fn normal(&self, t: f64) -> Vec2 {
        self.tangent(t).turn_90()
    }

    /// The part of the curve between two parameters.
    #[must_use]
    fn subdivide_t(&self, t1: f64, t2: f64) -> Self {
        self.subdivide(self.pt_t(t1), self.pt_t(t2))
    }

    /// Parameters in `[0, 1]` where the curve meets `axis == value`.
    fn axis_ts(&self, axis: Axis, value: f64, epsilon: f64) -> Roots {
        self.axis_roots(axis, value).keep_valid_ts(epsilon)
    }

    /// Interior parameters where the curvature changes sign.
    ///
    /// Only cubics have these.
    fn inflections(&self) -> Roots {
        Roots::new()
    }

    /// Whether every point is finite.
    fn is_finite(&self) -> bool {
        self.hull().iter().all(|p| p.is_finite())
    }

    /// The smallest rectangle containing the hull.
    fn bounds(&self) -> Rect {
        let hull = self.hull();
        hull.iter()
            .fold(Rect::from_points(self.start(), self.end()), |r, &p| {
                r.union_pt(p)
            })
    }

    /// Whether the control points lie inside the endpoints' rectangle.
    fn is_monotonic(&self) -> bool {
        let ends = Rect::from_points(self.start(), self.end());
        self.hull().iter().all(|&p| ends.contains(p))
    }

    /// Whether two curves have the same shape, point by point.
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let a = self.hull();
        let b = other.hull();
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(p, q)| p.distance(*q) <= tolerance)
    }
}

/// Whether every point of `controls` lies within `tolerance` of the chord
/// from `p0` to `p1`.
pub(crate) fn controls_near_chord(
    p0: Point,
    p1: Point,
    controls: &[Point],
    tolerance: f64,
) -> bool {
    let chord = p1 - p0;
    let len = chord.hypot();
    if len == 0.0 {
        return controls.iter().all(|&p| p.distance(p0) <= tolerance);
    }
    let limit = tolerance * len.max(1.0) * len;
    controls
        .iter()
        .all(|&p| (p - p0).cross(chord).abs() <= limit)
}

/// Identifies a curve kind within a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KindId(pub(crate) u32);

impl KindId {
    /// Lines.
    pub const LINE: KindId = KindId(0);
    /// Quadratic Béziers.
    pub const QUAD: KindId = KindId(1);
    /// Conics.
    pub const CONIC: KindId = KindId(2);
    /// Cubic Béziers.
    pub const CUBIC: KindId = KindId(3);
    /// The first id handed to a caller-registered kind.
    pub(crate) const FIRST_CUSTOM: u32 = 4;

    /// The raw id.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

/// The capability table of a caller-defined curve kind.
///
/// The required methods mirror [`CurveOps`]; the provided ones have
/// fallbacks that are correct for kinds whose data is only points. Optional
/// hooks with no sensible fallback (such as [`CurveTable::rotate_controls`])
/// do nothing by default.
pub trait CurveTable: Send + Sync {
    /// A name for debugging output.
    fn name(&self) -> &str {
        "custom"
    }

    /// Evaluate the curve at `t`.
    fn eval(&self, curve: &CustomCurve, t: f64) -> Point;

    /// The direction of travel at `t`.
    fn tangent(&self, curve: &CustomCurve, t: f64) -> Vec2;

    /// See [`CurveOps::axis_roots`].
    fn axis_roots(&self, curve: &CustomCurve, axis: Axis, value: f64) -> Roots;

    /// See [`CurveOps::subdivide`].
    ///
    /// Implementations usually build the result with [`CustomCurve::with_data`].
    fn subdivide(&self, curve: &CustomCurve, start: PtT, end: PtT) -> CustomCurve;

    /// See [`CurveOps::output`].
    fn output(&self, curve: &CustomCurve, sink: &mut dyn PathSink, first: bool, last: bool);

    /// See [`CurveOps::is_finite`].
    fn is_finite(&self, curve: &CustomCurve) -> bool {
        curve.points.iter().all(|p| p.is_finite()) && curve.data.iter().all(|v| v.is_finite())
    }

    /// See [`CurveOps::is_line`].
    fn is_line(&self, curve: &CustomCurve, tolerance: f64) -> bool {
        let points = &curve.points;
        controls_near_chord(
            curve.start(),
            curve.end(),
            &points[1..points.len() - 1],
            tolerance,
        )
    }

    /// Transform the interior control data.
    ///
    /// The engine has already transformed the endpoints. Does nothing by
    /// default, which is right only for kinds without interior points.
    fn rotate_controls(&self, _curve: &mut CustomCurve, _affine: Affine) {}

    /// See [`CurveOps::reversed`]. Reverses the points and scalars by default.
    fn reversed(&self, curve: &CustomCurve) -> CustomCurve {
        let mut points = curve.points.clone();
        points.reverse();
        let mut data = curve.data.clone();
        data.reverse();
        curve.with_data(&points, &data)
    }

    /// Interior parameters of x and y extrema. None by default.
    fn extrema(&self, _curve: &CustomCurve) -> Roots {
        Roots::new()
    }

    /// Interior parameters of inflections. None by default.
    fn inflections(&self, _curve: &CustomCurve) -> Roots {
        Roots::new()
    }
}

/// A registered curve kind: its id and capability table.
#[derive(Clone)]
pub struct CurveKind {
    id: KindId,
    table: Arc<dyn CurveTable>,
}

impl CurveKind {
    pub(crate) fn new(id: KindId, table: Arc<dyn CurveTable>) -> CurveKind {
        CurveKind { id, table }
    }

    /// The kind's id.
    #[inline]
    pub fn id(&self) -> KindId {
        self.id
    }

    /// The kind's capability table.
    #[inline]
    pub fn table(&self) -> &dyn CurveTable {
        &*self.table
    }
}

impl PartialEq for CurveKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveKind")
            .field("id", &self.id.0)
            .field("name", &self.table.name())
            .finish()
    }
}

/// A curve of a caller-defined kind.
///
/// The first and last of `points` are the endpoints; the kind's table
/// interprets the rest, and `data`, as it likes.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomCurve {
    kind: CurveKind,
    /// Endpoints and control points.
    pub points: SmallVec<[Point; 4]>,
    /// Scalar control data, such as weights.
    pub data: SmallVec<[f64; 2]>,
}

impl CustomCurve {
    /// Create a curve of a registered kind.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two points are given.
    pub fn new(kind: &CurveKind, points: &[Point], data: &[f64]) -> CustomCurve {
        assert!(points.len() >= 2, "a curve needs at least two points");
        CustomCurve {
            kind: kind.clone(),
            points: SmallVec::from_slice(points),
            data: SmallVec::from_slice(data),
        }
    }

    /// A curve of the same kind with new points and data.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two points are given.
    pub fn with_data(&self, points: &[Point], data: &[f64]) -> CustomCurve {
        CustomCurve::new(&self.kind, points, data)
    }

    /// The curve's kind.
    #[inline]
    pub fn kind(&self) -> &CurveKind {
        &self.kind
    }
}

impl ParamCurve for CustomCurve {
    fn eval(&self, t: f64) -> Point {
        self.kind.table.eval(self, t)
    }

    #[inline]
    fn start(&self) -> Point {
        self.points[0]
    }

    #[inline]
    fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }
}

impl ParamCurveExtrema for CustomCurve {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let mut roots = self.kind.table.extrema(self);
        roots.sort();
        roots.iter().take(MAX_EXTREMA).collect()
    }
}

impl CurveOps for CustomCurve {
    fn tangent(&self, t: f64) -> Vec2 {
        self.kind.table.tangent(self, t)
    }

    fn axis_roots(&self, axis: Axis, value: f64) -> Roots {
        self.kind.table.axis_roots(self, axis, value)
    }

    fn subdivide(&self, start: PtT, end: PtT) -> CustomCurve {
        let mut sub = self.kind.table.subdivide(self, start, end);
        let last = sub.points.len() - 1;
        sub.points[0] = start.pt;
        sub.points[last] = end.pt;
        sub
    }

    fn is_line(&self, tolerance: f64) -> bool {
        self.kind.table.is_line(self, tolerance)
    }

    fn hull(&self) -> SmallVec<[Point; 4]> {
        self.points.clone()
    }

    fn transform(&self, affine: Affine) -> CustomCurve {
        let mut curve = self.clone();
        let last = curve.points.len() - 1;
        curve.points[0] = affine * curve.points[0];
        curve.points[last] = affine * curve.points[last];
        self.kind.table.rotate_controls(&mut curve, affine);
        curve
    }

    fn reversed(&self) -> CustomCurve {
        self.kind.table.reversed(self)
    }

    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool) {
        self.kind.table.output(self, sink, first, last);
    }

    fn inflections(&self) -> Roots {
        self.kind.table.inflections(self)
    }

    fn is_finite(&self) -> bool {
        self.kind.table.is_finite(self)
    }

    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.kind == other.kind
            && self.data == other.data
            && self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(other.points.iter())
                .all(|(p, q)| p.distance(*q) <= tolerance)
    }
}

/// A curve of any kind.
///
/// This is what contours store. The built-in kinds are matched statically;
/// only [`Curve::Custom`] goes through a capability table.
#[derive(Clone, Debug, PartialEq)]
pub enum Curve {
    /// A line.
    Line(Line),
    /// A quadratic Bézier.
    Quad(QuadBez),
    /// A conic (rational quadratic Bézier).
    Conic(Conic),
    /// A cubic Bézier.
    Cubic(CubicBez),
    /// A caller-defined kind.
    Custom(CustomCurve),
}

/// Forward a method call to whichever curve the enum holds.
macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Curve::Line($c) => $body,
            Curve::Quad($c) => $body,
            Curve::Conic($c) => $body,
            Curve::Cubic($c) => $body,
            Curve::Custom($c) => $body,
        }
    };
}

/// Forward a method call that returns a curve of the same kind.
macro_rules! dispatch_map {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Curve::Line($c) => Curve::Line($body),
            Curve::Quad($c) => Curve::Quad($body),
            Curve::Conic($c) => Curve::Conic($body),
            Curve::Cubic($c) => Curve::Cubic($body),
            Curve::Custom($c) => Curve::Custom($body),
        }
    };
}

impl Curve {
    /// The id of this curve's kind.
    pub fn kind_id(&self) -> KindId {
        match self {
            Curve::Line(_) => KindId::LINE,
            Curve::Quad(_) => KindId::QUAD,
            Curve::Conic(_) => KindId::CONIC,
            Curve::Cubic(_) => KindId::CUBIC,
            Curve::Custom(c) => c.kind.id,
        }
    }

    /// A debugging name for this curve's kind.
    pub fn kind_name(&self) -> &str {
        match self {
            Curve::Line(_) => "line",
            Curve::Quad(_) => "quad",
            Curve::Conic(_) => "conic",
            Curve::Cubic(_) => "cubic",
            Curve::Custom(c) => c.kind.table.name(),
        }
    }

    /// The chord of the curve, from start to end.
    pub fn chord(&self) -> Line {
        Line::new(self.start(), self.end())
    }
}

impl ParamCurve for Curve {
    fn eval(&self, t: f64) -> Point {
        dispatch!(self, c => c.eval(t))
    }

    fn start(&self) -> Point {
        dispatch!(self, c => c.start())
    }

    fn end(&self) -> Point {
        dispatch!(self, c => c.end())
    }
}

impl ParamCurveExtrema for Curve {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        dispatch!(self, c => c.extrema())
    }
}

impl CurveOps for Curve {
    fn tangent(&self, t: f64) -> Vec2 {
        dispatch!(self, c => c.tangent(t))
    }

    fn axis_roots(&self, axis: Axis, value: f64) -> Roots {
        dispatch!(self, c => c.axis_roots(axis, value))
    }

    fn subdivide(&self, start: PtT, end: PtT) -> Curve {
        dispatch_map!(self, c => c.subdivide(start, end))
    }

    fn is_line(&self, tolerance: f64) -> bool {
        dispatch!(self, c => c.is_line(tolerance))
    }

    fn hull(&self) -> SmallVec<[Point; 4]> {
        dispatch!(self, c => c.hull())
    }

    fn transform(&self, affine: Affine) -> Curve {
        dispatch_map!(self, c => c.transform(affine))
    }

    fn reversed(&self) -> Curve {
        dispatch_map!(self, c => c.reversed())
    }

    fn output(&self, sink: &mut dyn PathSink, first: bool, last: bool) {
        dispatch!(self, c => c.output(sink, first, last))
    }

    fn inflections(&self) -> Roots {
        dispatch!(self, c => c.inflections())
    }

    fn is_finite(&self) -> bool {
        dispatch!(self, c => c.is_finite())
    }

    fn bounds(&self) -> Rect {
        dispatch!(self, c => c.bounds())
    }

    fn approx_eq(&self, other: &Curve, tolerance: f64) -> bool {
        match (self, other) {
            (Curve::Line(a), Curve::Line(b)) => a.approx_eq(b, tolerance),
            (Curve::Quad(a), Curve::Quad(b)) => a.approx_eq(b, tolerance),
            (Curve::Conic(a), Curve::Conic(b)) => a.approx_eq(b, tolerance),
            (Curve::Cubic(a), Curve::Cubic(b)) => a.approx_eq(b, tolerance),
            (Curve::Custom(a), Curve::Custom(b)) => a.approx_eq(b, tolerance),
            _ => false,
        }
    }
}

impl From<Line> for Curve {
    fn from(line: Line) -> Curve {
        Curve::Line(line)
    }
}

impl From<QuadBez> for Curve {
    fn from(quad: QuadBez) -> Curve {
        Curve::Quad(quad)
    }
}

impl From<Conic> for Curve {
    fn from(conic: Conic) -> Curve {
        Curve::Conic(conic)
    }
}

impl From<CubicBez> for Curve {
    fn from(cubic: CubicBez) -> Curve {
        Curve::Cubic(cubic)
    }
}

impl From<CustomCurve> for Curve {
    fn from(custom: CustomCurve) -> Curve {
        Curve::Custom(custom)
    }
}
