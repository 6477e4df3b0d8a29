// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning a context's contours into result loops.
//!
//! The stages are:
//!
//! 1. check that every contour closes;
//! 2. intersect every pair of curves whose bounds meet;
//! 3. split curves at the intersections into edges, snapping their ends
//!    to shared vertices;
//! 4. merge coincident edges, dropping those left without coverage;
//! 5. find the coverage on each edge's left by casting an axis-aligned ray
//!    from its midpoint, and ask the winding model whether to keep it;
//! 6. join kept edges into closed loops and emit them.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};
use smallvec::SmallVec;

use crate::intersect::intersect;
use crate::{
    Axis, Context, Curve, CurveOps, Limits, OpError, ParamCurve, PathSink, Point, PtT, Vec2,
    WindKeep, WindingModel,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A piece of an input curve between two vertices.
#[derive(Debug)]
struct Edge<W> {
    curve: Curve,
    wind: W,
    v0: usize,
    v1: usize,
}

/// Points that are the same to within a tolerance share one index.
#[derive(Debug)]
struct VertexPool {
    points: Vec<Point>,
    tolerance: f64,
}

impl VertexPool {
    fn new(tolerance: f64) -> VertexPool {
        VertexPool {
            points: Vec::new(),
            tolerance,
        }
    }

    fn snap(&mut self, pt: Point) -> usize {
        if let Some(i) = self
            .points
            .iter()
            .position(|p| p.distance(pt) <= self.tolerance)
        {
            return i;
        }
        self.points.push(pt);
        self.points.len() - 1
    }
}

/// A kept edge, oriented so the result is on its left.
#[derive(Debug)]
struct Directed {
    curve: Curve,
    from: usize,
    to: usize,
}

pub(crate) fn resolve<M: WindingModel>(
    ctx: &mut Context<M>,
    sink: &mut dyn PathSink,
) -> Result<(), OpError> {
    debug_assert!(ctx.is_normalized(), "resolving before normalizing");
    let limits = ctx.limits;

    if ctx.contours.iter().any(|c| !is_closed(c, &limits)) {
        ctx.raise(OpError::EndNotConnected)?;
    }
    let curves: Vec<(Curve, M::Winding)> = ctx
        .contours
        .iter()
        .flat_map(|c| c.curves.iter())
        .map(|c| (c.curve.clone(), c.winding.clone()))
        .collect();

    let mut cuts: Vec<SmallVec<[PtT; 2]>> = vec![SmallVec::new(); curves.len()];
    let mut hit_count = 0;
    for i in 0..curves.len() {
        let bounds = curves[i].0.bounds().inflate(limits.point_tolerance);
        for j in i + 1..curves.len() {
            if !bounds.overlaps(curves[j].0.bounds()) {
                continue;
            }
            match intersect(&curves[i].0, &curves[j].0, &limits) {
                Ok(hits) => {
                    hit_count += hits.len();
                    for hit in hits {
                        cuts[i].push(PtT::new(hit.pt, hit.t0));
                        cuts[j].push(PtT::new(hit.pt, hit.t1));
                    }
                }
                Err(err) => ctx.raise(err)?,
            }
        }
    }
    debug!("resolve: {} curves, {hit_count} intersections", curves.len());

    let mut pool = VertexPool::new(limits.point_tolerance);
    let mut edges = split_edges(curves, cuts, &mut pool, &limits);
    let split_count = edges.len();
    merge_coincident(&ctx.model, &mut edges, &limits);
    edges.retain(|e| ctx.model.visible(&e.wind));
    debug!(
        "resolve: {split_count} edges after splitting, {} after merging",
        edges.len()
    );

    let mut kept = Vec::new();
    for (index, edge) in edges.iter().enumerate() {
        let sum = winding_sum(&ctx.model, &edges, index, &limits);
        let keep = ctx.model.keep(&edge.wind, &sum);
        trace!(
            "edge {index} {} {:?} -> {:?}: wind {:?} sum {:?} {keep:?}",
            edge.curve.kind_name(),
            edge.curve.start(),
            edge.curve.end(),
            edge.wind,
            sum,
        );
        match keep {
            WindKeep::Discard => {}
            WindKeep::Start => kept.push(Directed {
                curve: edge.curve.clone(),
                from: edge.v0,
                to: edge.v1,
            }),
            WindKeep::End => kept.push(Directed {
                curve: edge.curve.reversed(),
                from: edge.v1,
                to: edge.v0,
            }),
        }
    }
    debug!("resolve: kept {} of {} edges", kept.len(), edges.len());

    let assembly = assemble(&kept, pool.points.len(), limits.max_limbs);
    debug!(
        "resolve: {} loops, {} open, {} limbs",
        assembly.loops.len(),
        assembly.open,
        assembly.limbs
    );
    if assembly.too_complex {
        ctx.raise(OpError::DecisionTreeTooComplex)?;
    }
    if assembly.open > 0 {
        ctx.raise(OpError::OpenLoops)?;
    }
    for path in &assembly.loops {
        let last = path.len() - 1;
        for (i, &k) in path.iter().enumerate() {
            kept[k].curve.output(sink, i == 0, i == last);
        }
    }
    Ok(())
}

fn is_closed<W>(contour: &crate::context::Contour<W>, limits: &Limits) -> bool {
    let curves = &contour.curves;
    let n = curves.len();
    (0..n).all(|i| {
        let end = curves[i].curve.end();
        let next = curves[(i + 1) % n].curve.start();
        end.distance(next) <= limits.point_tolerance
    })
}

/// Split each curve at its cuts, and give every piece vertex indices.
fn split_edges<W: Clone>(
    curves: Vec<(Curve, W)>,
    cuts: Vec<SmallVec<[PtT; 2]>>,
    pool: &mut VertexPool,
    limits: &Limits,
) -> Vec<Edge<W>> {
    let eps = limits.t_epsilon;
    let mut edges = Vec::new();
    for ((curve, wind), mut cuts) in curves.into_iter().zip(cuts) {
        cuts.retain(|c| c.t > eps && c.t < 1.0 - eps);
        cuts.sort_by(|a, b| a.t.total_cmp(&b.t));
        cuts.dedup_by(|b, a| b.t - a.t <= eps);
        let mut ends: SmallVec<[PtT; 4]> = SmallVec::new();
        ends.push(curve.pt_t(0.0));
        ends.extend(cuts);
        ends.push(curve.pt_t(1.0));
        if ends.len() == 2 {
            let v0 = pool.snap(ends[0].pt);
            let v1 = pool.snap(ends[1].pt);
            if v0 == v1 {
                continue;
            }
            let (p0, p1) = (pool.points[v0], pool.points[v1]);
            let curve = if p0 == curve.start() && p1 == curve.end() {
                curve
            } else {
                curve.subdivide(PtT::new(p0, 0.0), PtT::new(p1, 1.0))
            };
            edges.push(Edge {
                curve,
                wind,
                v0,
                v1,
            });
            continue;
        }
        for pair in ends.windows(2) {
            let v0 = pool.snap(pair[0].pt);
            let v1 = pool.snap(pair[1].pt);
            if v0 == v1 {
                continue;
            }
            let start = PtT::new(pool.points[v0], pair[0].t);
            let end = PtT::new(pool.points[v1], pair[1].t);
            edges.push(Edge {
                curve: curve.subdivide(start, end),
                wind: wind.clone(),
                v0,
                v1,
            });
        }
    }
    edges
}

/// Fold each edge into an earlier edge of the same shape between the same
/// vertices, adding coverage for the same direction and subtracting it for
/// the opposite one. Absorbed edges are zeroed.
fn merge_coincident<M: WindingModel>(model: &M, edges: &mut [Edge<M::Winding>], limits: &Limits) {
    let mut groups: BTreeMap<(usize, usize), SmallVec<[usize; 2]>> = BTreeMap::new();
    for (i, e) in edges.iter().enumerate() {
        groups
            .entry((e.v0.min(e.v1), e.v0.max(e.v1)))
            .or_default()
            .push(i);
    }
    let tolerance = limits.point_tolerance;
    for group in groups.values().filter(|g| g.len() > 1) {
        let mut absorbed: SmallVec<[bool; 2]> = SmallVec::from_elem(false, group.len());
        for x in 0..group.len() {
            if absorbed[x] {
                continue;
            }
            for y in x + 1..group.len() {
                if absorbed[y] {
                    continue;
                }
                let (i, j) = (group[x], group[y]);
                let same_direction = edges[i].v0 == edges[j].v0;
                let coincident = if same_direction {
                    edges[i].curve.approx_eq(&edges[j].curve, tolerance)
                } else {
                    edges[i].curve.approx_eq(&edges[j].curve.reversed(), tolerance)
                };
                if !coincident {
                    continue;
                }
                let merged = if same_direction {
                    model.add(&edges[i].wind, &edges[j].wind)
                } else {
                    model.subtract(&edges[i].wind, &edges[j].wind)
                };
                trace!("merging edge {j} into {i}: {merged:?}");
                edges[i].wind = merged;
                model.zero(&mut edges[j].wind);
                absorbed[y] = true;
            }
        }
    }
}

/// The coverage of the region on the left of `edges[index]`.
///
/// A ray leaves the edge's midpoint along +x when the edge is steep, or
/// along +y when it is shallow, and every other edge it crosses adds or
/// removes its coverage. An edge crosses the ray when its ends lie on
/// opposite sides of it, counting an end exactly on the ray as below it,
/// so a ray through a vertex counts it once.
fn winding_sum<M: WindingModel>(
    model: &M,
    edges: &[Edge<M::Winding>],
    index: usize,
    limits: &Limits,
) -> M::Winding {
    let edge = &edges[index];
    let mid = edge.curve.pt_t(0.5).pt;
    let tangent = edge.curve.tangent(0.5);
    let horizontal = tangent.y.abs() >= tangent.x.abs();
    // `axis` measures across the ray, `along` measures along it.
    let (axis, ray) = if horizontal {
        (Axis::Vertical, Vec2::new(1.0, 0.0))
    } else {
        (Axis::Horizontal, Vec2::new(0.0, 1.0))
    };
    let along = axis.cross();
    let value = axis.coord(mid);
    let origin = along.coord(mid);

    let mut sum = model.zeroed(&edge.wind);
    for (k, other) in edges.iter().enumerate() {
        if k == index {
            continue;
        }
        let (start, end) = (other.curve.start(), other.curve.end());
        let (c0, c1) = (axis.coord(start), axis.coord(end));
        if (c0 > value) == (c1 > value) {
            continue;
        }
        if along.coord(start) <= origin && along.coord(end) <= origin {
            // Monotonic, so entirely behind the ray's origin.
            continue;
        }
        let hit = match other.curve.axis_ts(axis, value, limits.t_epsilon).iter().next() {
            Some(t) => along.coord(other.curve.pt_t(t).pt),
            None => {
                let s = (value - c0) / (c1 - c0);
                along.coord(start) + s * (along.coord(end) - along.coord(start))
            }
        };
        if hit <= origin {
            continue;
        }
        // Upward across a rightward ray, or leftward across an upward ray.
        let adds = if horizontal { c1 > c0 } else { c1 < c0 };
        sum = if adds {
            model.add(&sum, &other.wind)
        } else {
            model.subtract(&sum, &other.wind)
        };
    }
    if tangent.cross(ray) > 0.0 {
        sum
    } else {
        model.add(&sum, &edge.wind)
    }
}

#[derive(Debug, Default)]
struct Assembly {
    loops: Vec<Vec<usize>>,
    open: usize,
    limbs: usize,
    too_complex: bool,
}

/// Join directed edges into closed loops.
///
/// From each unused edge, walk forward choosing at every vertex the
/// leftmost unused way on, backtracking out of dead ends. Taking a way on
/// while another unused one remains at the same vertex counts as a limb.
/// Each loop's search has its own count and stops once `max_limbs` is
/// exceeded; `Assembly::limbs` records the largest count seen.
fn assemble(kept: &[Directed], vertex_count: usize, max_limbs: usize) -> Assembly {
    let mut outgoing: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); vertex_count];
    for (i, d) in kept.iter().enumerate() {
        outgoing[d.from].push(i);
    }
    let mut used = vec![false; kept.len()];
    let mut assembly = Assembly::default();
    for first in 0..kept.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let home = kept[first].from;
        let mut path = vec![first];
        let mut limbs = 0;
        let mut frames: Vec<(SmallVec<[usize; 2]>, usize)> = Vec::new();
        let closed = 'search: loop {
            let last = path[path.len() - 1];
            if kept[last].to == home {
                break true;
            }
            frames.push((turn_order(kept, &outgoing, last), 0));
            loop {
                let Some((choices, next)) = frames.last_mut() else {
                    break 'search false;
                };
                if *next < choices.len() {
                    let c = choices[*next];
                    *next += 1;
                    if used[c] {
                        continue;
                    }
                    if choices[*next..].iter().any(|&o| !used[o]) {
                        limbs += 1;
                        assembly.limbs = assembly.limbs.max(limbs);
                        if limbs > max_limbs {
                            assembly.too_complex = true;
                            return assembly;
                        }
                    }
                    used[c] = true;
                    path.push(c);
                    continue 'search;
                }
                frames.pop();
                if frames.is_empty() {
                    break 'search false;
                }
                if let Some(undone) = path.pop() {
                    used[undone] = false;
                }
            }
        };
        if closed {
            assembly.loops.push(path);
        } else {
            trace!("edge {first} does not close a loop");
            assembly.open += 1;
        }
    }
    assembly
}

/// The edges leaving the end of `kept[from]`, leftmost turn first.
fn turn_order(
    kept: &[Directed],
    outgoing: &[SmallVec<[usize; 2]>],
    from: usize,
) -> SmallVec<[usize; 2]> {
    let incoming = kept[from].curve.tangent(1.0);
    let mut choices: SmallVec<[(f64, usize); 2]> = outgoing[kept[from].to]
        .iter()
        .map(|&c| {
            let out = kept[c].curve.tangent(0.0);
            (incoming.cross(out).atan2(incoming.dot(out)), c)
        })
        .collect();
    choices.sort_by(|a, b| b.0.total_cmp(&a.0));
    choices.into_iter().map(|(_, c)| c).collect()
}
