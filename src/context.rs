// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine instance: contours, registered curve kinds, limits and the
//! sticky error state.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use log::{debug, warn};

use crate::monotonic::monotonic_split;
use crate::{
    BezPath, Curve, CurveKind, CurveOps, CurveTable, Dispatch, ErrorDispatch, KindId, Limits,
    Line, OpError, ParamCurve, PathEl, PathSink, Point, PtT, Rect, WindingModel,
};
use crate::{Conic, CubicBez, QuadBez};

/// Identifies a contour within its context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContourId(usize);

/// A curve of a contour, with its coverage payload.
#[derive(Clone, Debug)]
pub(crate) struct ContourCurve<W> {
    pub(crate) curve: Curve,
    pub(crate) winding: W,
}

/// A closed sequence of curves.
#[derive(Clone, Debug)]
pub(crate) struct Contour<W> {
    pub(crate) curves: Vec<ContourCurve<W>>,
}

/// A set of contours to be combined under one winding model.
///
/// Curves are added to contours with a coverage payload of the model's
/// [`WindingModel::Winding`] type; [`Context::resolve`] then writes every
/// edge the model keeps to a [`PathSink`], joined into closed loops.
///
/// ```
/// use bezop::{BezPath, BinaryModel, BinaryOp, BinaryWinding, Context, Rect};
///
/// let mut ctx = Context::new(BinaryModel::new(BinaryOp::Intersect));
/// ctx.add_rect(Rect::new(0.0, 0.0, 2.0, 2.0), BinaryWinding::LEFT);
/// ctx.add_rect(Rect::new(1.0, 1.0, 3.0, 3.0), BinaryWinding::RIGHT);
/// let mut out = BezPath::new();
/// ctx.resolve(&mut out).unwrap();
/// assert_eq!(out.subpath_count(), 1);
/// ```
pub struct Context<M: WindingModel> {
    pub(crate) model: M,
    pub(crate) contours: Vec<Contour<M::Winding>>,
    kinds: Vec<CurveKind>,
    next_kind: u32,
    pub(crate) limits: Limits,
    dispatch: Option<ErrorDispatch>,
    error: Option<OpError>,
    normalized: bool,
}

impl<M: WindingModel> Context<M> {
    /// Create an empty context.
    pub fn new(model: M) -> Context<M> {
        Context {
            model,
            contours: Vec::new(),
            kinds: Vec::new(),
            next_kind: KindId::FIRST_CUSTOM,
            limits: Limits::default(),
            dispatch: None,
            error: None,
            normalized: false,
        }
    }

    /// The winding model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The numeric limits in effect.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Replace the numeric limits.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
        self.normalized = false;
    }

    /// Install a hook that may let resolution continue past errors.
    pub fn set_error_dispatch(&mut self, dispatch: ErrorDispatch) {
        self.dispatch = Some(dispatch);
    }

    /// The sticky error, if one has been raised.
    pub fn error(&self) -> Option<OpError> {
        self.error
    }

    /// Clear the sticky error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Register a caller-defined curve kind.
    ///
    /// Curves of the kind are built with [`CustomCurve::new`] using the
    /// returned handle.
    ///
    /// [`CustomCurve::new`]: crate::CustomCurve::new
    pub fn register_kind(&mut self, table: impl CurveTable + 'static) -> CurveKind {
        let id = KindId(self.next_kind);
        self.next_kind += 1;
        let kind = CurveKind::new(id, Arc::new(table));
        debug!("registered curve kind {} as {}", kind.table().name(), id.get());
        self.kinds.push(kind.clone());
        kind
    }

    /// Start a new, empty contour.
    pub fn add_contour(&mut self) -> ContourId {
        self.contours.push(Contour { curves: Vec::new() });
        ContourId(self.contours.len() - 1)
    }

    /// Remove every curve from a contour, keeping the contour usable.
    ///
    /// # Panics
    ///
    /// Panics if the contour does not belong to this context.
    pub fn reset_contour(&mut self, contour: ContourId) {
        self.contours[contour.0].curves.clear();
        self.normalized = false;
    }

    /// The number of curves in a contour, after monotonic splitting.
    ///
    /// # Panics
    ///
    /// Panics if the contour does not belong to this context.
    pub fn contour_len(&self, contour: ContourId) -> usize {
        self.contours[contour.0].curves.len()
    }

    /// Append a curve to a contour.
    ///
    /// The curve is split into monotonic pieces, each carrying a copy of
    /// `winding`. Curves of a contour must join end to start, and the last
    /// must end where the first starts.
    ///
    /// # Panics
    ///
    /// Panics if the contour does not belong to this context, or if a
    /// custom curve's kind was not registered with it.
    pub fn add_curve(&mut self, contour: ContourId, curve: impl Into<Curve>, winding: M::Winding) {
        let curve = curve.into();
        if let Curve::Custom(custom) = &curve {
            assert!(
                self.kinds.contains(custom.kind()),
                "curve kind {:?} is not registered with this context",
                custom.kind()
            );
        }
        let curves = &mut self.contours[contour.0].curves;
        self.normalized = false;
        if !curve.is_finite() {
            // Kept whole so that `normalize` sees the bad coordinates.
            curves.push(ContourCurve { curve, winding });
            return;
        }
        for piece in monotonic_split(&curve, self.limits.t_epsilon) {
            curves.push(ContourCurve {
                curve: piece,
                winding: winding.clone(),
            });
        }
    }

    /// Add every subpath of `path` as a new contour.
    ///
    /// A `ClosePath` element closes its subpath with a line when needed. A
    /// subpath that is not closed is added as it is, and is reported by
    /// [`Context::resolve`] as [`OpError::EndNotConnected`] unless it
    /// happens to end where it started.
    pub fn add_path(&mut self, path: &BezPath, winding: M::Winding) -> Vec<ContourId> {
        let mut ids = Vec::new();
        let mut current = None;
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;
        for el in path.iter() {
            let curve: Curve = match el {
                PathEl::MoveTo(p) => {
                    current = Some(self.add_contour());
                    ids.extend(current);
                    start = p;
                    last = p;
                    continue;
                }
                PathEl::LineTo(p) => Line::new(last, p).into(),
                PathEl::QuadTo(p1, p2) => QuadBez::new(last, p1, p2).into(),
                PathEl::ConicTo(p1, p2, w) => Conic::new(last, p1, p2, w).into(),
                PathEl::CurveTo(p1, p2, p3) => CubicBez::new(last, p1, p2, p3).into(),
                PathEl::ClosePath => {
                    if last == start {
                        continue;
                    }
                    Line::new(last, start).into()
                }
            };
            let contour = match current {
                Some(contour) => contour,
                None => {
                    // Drawing without a MoveTo starts at the origin.
                    let contour = self.add_contour();
                    ids.push(contour);
                    current = Some(contour);
                    contour
                }
            };
            last = curve.end();
            self.add_curve(contour, curve, winding.clone());
        }
        ids
    }

    /// Add a rectangle as a new contour, wound counter-clockwise in a Y-up
    /// coordinate system (clockwise on a Y-down screen).
    pub fn add_rect(&mut self, rect: Rect, winding: M::Winding) -> ContourId {
        let contour = self.add_contour();
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        for i in 0..4 {
            let line = Line::new(corners[i], corners[(i + 1) % 4]);
            self.add_curve(contour, line, winding.clone());
        }
        contour
    }

    /// Report an error through the dispatch hook.
    ///
    /// Returns `Ok` when the hook chose to continue; otherwise the error
    /// becomes sticky and is returned.
    pub(crate) fn raise(&mut self, err: OpError) -> Result<(), OpError> {
        let decision = match &mut self.dispatch {
            Some(dispatch) => dispatch.dispatch(err),
            None => Dispatch::Halt,
        };
        match decision {
            Dispatch::Continue => {
                warn!("continuing past error: {err}");
                Ok(())
            }
            Dispatch::Halt => {
                debug!("halting on error: {err}");
                self.error = Some(err);
                Err(err)
            }
        }
    }

    /// Condition the contours for resolution.
    ///
    /// Curves with non-finite points are reported. Built-in curves whose
    /// controls lie on their chord become lines, while custom kinds keep
    /// their own output. Curves of zero length are removed,
    /// and curve ends within [`Limits::point_tolerance`] of the next
    /// curve's start are moved onto it. [`Context::resolve`] does this
    /// itself when it has not been done since the last change.
    ///
    /// # Errors
    ///
    /// [`OpError::NonFiniteCurvePoints`] if a curve has a NaN or infinite
    /// coordinate and the error dispatch does not continue; such curves
    /// are dropped when it does.
    pub fn normalize(&mut self) -> Result<(), OpError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let limits = self.limits;
        let mut non_finite = false;
        for contour in &mut self.contours {
            let before = contour.curves.len();
            contour.curves.retain(|c| {
                let finite = c.curve.is_finite();
                non_finite |= !finite;
                finite
            });
            for c in &mut contour.curves {
                let built_in = matches!(
                    c.curve,
                    Curve::Quad(_) | Curve::Conic(_) | Curve::Cubic(_)
                );
                if built_in && c.curve.is_line(limits.line_tolerance) {
                    c.curve = Curve::Line(c.curve.chord());
                }
            }
            contour.curves.retain(|c| {
                !(c.curve.start().distance(c.curve.end()) <= limits.point_tolerance
                    && c.curve.is_line(limits.line_tolerance))
            });
            snap_joins(&mut contour.curves, limits.point_tolerance);
            if contour.curves.len() != before {
                debug!(
                    "normalize: contour shrank from {before} to {} curves",
                    contour.curves.len()
                );
            }
        }
        if non_finite {
            self.raise(OpError::NonFiniteCurvePoints)?;
        }
        self.normalized = true;
        Ok(())
    }

    /// Whether [`Context::normalize`] has run since the last change.
    pub(crate) fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Compute the result and write it to `sink`.
    ///
    /// The sink is emptied first. Each kept edge is emitted by its kind's
    /// output operation, the first edge of each loop with `first` set and
    /// the last with `last` set.
    ///
    /// # Errors
    ///
    /// Any [`OpError`] raised along the way that the error dispatch does
    /// not continue past. The error is also kept as the context's sticky
    /// error; a context with a sticky error refuses to resolve until
    /// [`Context::clear_error`] is called.
    pub fn resolve(&mut self, sink: &mut dyn PathSink) -> Result<(), OpError> {
        sink.make_empty();
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.normalized {
            self.normalize()?;
        }
        crate::resolve::resolve(self, sink)
    }
}

/// Move each curve's start onto the previous curve's end when they are
/// within `tolerance`, wrapping from the last curve to the first.
fn snap_joins<W>(curves: &mut [ContourCurve<W>], tolerance: f64) {
    let n = curves.len();
    for i in 0..n {
        let prev_end = curves[(i + n - 1) % n].curve.end();
        let curve = &curves[i].curve;
        let start = curve.start();
        if start != prev_end && start.distance(prev_end) <= tolerance {
            let moved = curve.subdivide(PtT::new(prev_end, 0.0), curve.pt_t(1.0));
            curves[i].curve = moved;
        }
    }
}

impl<M: WindingModel + fmt::Debug> fmt::Debug for Context<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("model", &self.model)
            .field("contours", &self.contours.len())
            .field("kinds", &self.kinds)
            .field("limits", &self.limits)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Affine, Axis, Roots, UnaryWinding, Vec2};

    #[test]
    fn add_curve_splits_monotonic() {
        let mut ctx = Context::new(UnaryWinding::new());
        let contour = ctx.add_contour();
        ctx.add_curve(
            contour,
            QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0)),
            1,
        );
        assert_eq!(ctx.contour_len(contour), 2);
        ctx.reset_contour(contour);
        assert_eq!(ctx.contour_len(contour), 0);
    }

    #[test]
    fn add_path_closes_subpaths() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((1.0, 1.0));
        path.close_path();
        path.move_to((5.0, 5.0));
        path.line_to((6.0, 5.0));
        path.line_to((5.0, 5.0));
        path.close_path();
        let mut ctx = Context::new(UnaryWinding::new());
        let ids = ctx.add_path(&path, 1);
        assert_eq!(ids.len(), 2);
        assert_eq!(ctx.contour_len(ids[0]), 3);
        assert_eq!(ctx.contour_len(ids[1]), 2);
    }

    #[test]
    fn normalize_straightens_and_drops() {
        let mut ctx = Context::new(UnaryWinding::new());
        let contour = ctx.add_contour();
        ctx.add_curve(contour, Line::new((0.0, 0.0), (2.0, 0.0)), 1);
        ctx.add_curve(contour, QuadBez::new((2.0, 0.0), (2.0, 1.0), (2.0, 2.0)), 1);
        ctx.add_curve(contour, Line::new((2.0, 2.0), (2.0, 2.0)), 1);
        ctx.add_curve(contour, Line::new((2.0, 2.0), (0.0, 1e-12)), 1);
        ctx.normalize().unwrap();
        let curves = &ctx.contours[contour.0].curves;
        assert_eq!(curves.len(), 3);
        assert!(matches!(curves[1].curve, Curve::Line(_)));
        assert_eq!(curves[0].curve.start(), Point::new(0.0, 1e-12));
    }

    #[test]
    fn non_finite_is_sticky() {
        let mut ctx = Context::new(UnaryWinding::new());
        let contour = ctx.add_contour();
        ctx.add_curve(contour, Line::new((0.0, 0.0), (f64::NAN, 0.0)), 1);
        assert_eq!(ctx.normalize(), Err(OpError::NonFiniteCurvePoints));
        assert_eq!(ctx.error(), Some(OpError::NonFiniteCurvePoints));
        let mut out = BezPath::new();
        assert_eq!(ctx.resolve(&mut out), Err(OpError::NonFiniteCurvePoints));
        ctx.clear_error();
        assert_eq!(ctx.error(), None);
    }

    #[test]
    fn dispatch_can_continue() {
        let mut ctx = Context::new(UnaryWinding::new());
        ctx.set_error_dispatch(ErrorDispatch::continue_on(&[OpError::NonFiniteCurvePoints]));
        let contour = ctx.add_contour();
        ctx.add_curve(contour, Line::new((0.0, 0.0), (f64::INFINITY, 0.0)), 1);
        assert_eq!(ctx.normalize(), Ok(()));
        assert_eq!(ctx.contour_len(contour), 0);
        assert_eq!(ctx.error(), None);
    }

    #[test]
    fn nan_control_point_is_reported() {
        let mut ctx = Context::new(UnaryWinding::new());
        let contour = ctx.add_contour();
        ctx.add_curve(
            contour,
            QuadBez::new((0.0, 0.0), (f64::NAN, f64::NAN), (2.0, 0.0)),
            1,
        );
        ctx.add_curve(contour, Line::new((2.0, 0.0), (0.0, 0.0)), 1);
        assert_eq!(ctx.contour_len(contour), 2);
        assert_eq!(ctx.normalize(), Err(OpError::NonFiniteCurvePoints));
    }

    #[test]
    fn infinite_control_point_is_reported() {
        let mut ctx = Context::new(UnaryWinding::new());
        let contour = ctx.add_contour();
        ctx.add_curve(
            contour,
            CubicBez::new((0.0, 0.0), (1.0, f64::INFINITY), (2.0, 1.0), (3.0, 0.0)),
            1,
        );
        ctx.add_curve(contour, Line::new((3.0, 0.0), (0.0, 0.0)), 1);
        assert_eq!(ctx.normalize(), Err(OpError::NonFiniteCurvePoints));
        let mut out = BezPath::new();
        assert_eq!(ctx.resolve(&mut out), Err(OpError::NonFiniteCurvePoints));
    }

    #[test]
    fn context_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Context<UnaryWinding>>();
        assert_send::<ErrorDispatch>();
    }

    /// A straight segment stored as a start, an end and nothing else.
    struct Segment;

    impl CurveTable for Segment {
        fn name(&self) -> &str {
            "segment"
        }

        fn eval(&self, curve: &crate::CustomCurve, t: f64) -> Point {
            curve.points[0].lerp(curve.points[1], t)
        }

        fn tangent(&self, curve: &crate::CustomCurve, _t: f64) -> Vec2 {
            curve.points[1] - curve.points[0]
        }

        fn axis_roots(&self, curve: &crate::CustomCurve, axis: Axis, value: f64) -> Roots {
            let line = Line::new(curve.points[0], curve.points[1]);
            line.axis_roots(axis, value)
        }

        fn subdivide(
            &self,
            curve: &crate::CustomCurve,
            start: PtT,
            end: PtT,
        ) -> crate::CustomCurve {
            curve.with_data(&[start.pt, end.pt], &[])
        }

        fn output(
            &self,
            curve: &crate::CustomCurve,
            sink: &mut dyn PathSink,
            first: bool,
            last: bool,
        ) {
            if first {
                sink.move_to(curve.points[0]);
            }
            sink.line_to(curve.points[1]);
            if last {
                sink.close_path();
            }
        }
    }

    #[test]
    fn custom_kind() {
        let mut ctx = Context::new(UnaryWinding::new());
        let kind = ctx.register_kind(Segment);
        assert_eq!(kind.id().get(), 4);
        let ends = [Point::new(0.0, 0.0), Point::new(4.0, 2.0)];
        let seg = crate::CustomCurve::new(&kind, &ends, &[]);
        let curve = Curve::from(seg);
        assert_eq!(curve.kind_name(), "segment");
        assert_eq!(curve.eval(0.5), Point::new(2.0, 1.0));
        assert!(curve.is_line(1e-9));
        let moved = curve.transform(Affine::translate((1.0, 1.0)));
        assert_eq!(moved.end(), Point::new(5.0, 3.0));
        let contour = ctx.add_contour();
        ctx.add_curve(contour, curve, 1);
        assert_eq!(ctx.contour_len(contour), 1);
    }
}
