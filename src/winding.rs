// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Winding models: how edge coverage combines, and which edges survive.
//!
//! Every edge carries a winding payload describing how much, and in which
//! direction, it contributes to the fill of the region on its left. The
//! engine accumulates payloads with [`WindingModel::add`] and
//! [`WindingModel::subtract`], and finally asks [`WindingModel::keep`]
//! whether each edge bounds the result.

use core::fmt::Debug;

/// The fate of an edge in the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindKeep {
    /// The edge is not part of the result.
    Discard,
    /// The edge bounds the result with the filled side on its left; it is
    /// emitted in its natural direction.
    Start,
    /// The edge bounds the result with the filled side on its right; it is
    /// emitted reversed.
    End,
}

/// A fill rule and the coverage arithmetic behind it.
///
/// Implementations are stateless with respect to edges: all per-edge state
/// lives in the [`WindingModel::Winding`] payloads passed in.
pub trait WindingModel {
    /// The per-edge coverage payload.
    type Winding: Clone + PartialEq + Debug;

    /// Combine the coverage of two edges, as when coincident edges merge.
    fn add(&self, a: &Self::Winding, b: &Self::Winding) -> Self::Winding;

    /// Remove the contribution `b` from `a`.
    fn subtract(&self, a: &Self::Winding, b: &Self::Winding) -> Self::Winding;

    /// Reset a payload to contribute nothing.
    fn zero(&self, winding: &mut Self::Winding);

    /// Whether a payload contributes anything.
    fn visible(&self, winding: &Self::Winding) -> bool;

    /// Decide an edge's fate.
    ///
    /// `wind` is the edge's own coverage and `sum` is the accumulated
    /// coverage of the region on its left; the region on its right has
    /// coverage `sum - wind`.
    fn keep(&self, wind: &Self::Winding, sum: &Self::Winding) -> WindKeep;

    /// A payload that contributes nothing, shaped like `like`.
    fn zeroed(&self, like: &Self::Winding) -> Self::Winding {
        let mut winding = like.clone();
        self.zero(&mut winding);
        winding
    }
}

/// How a winding number maps to inside or outside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillRule {
    /// Inside wherever the winding number is not zero.
    #[default]
    NonZero,
    /// Inside wherever the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Whether a region with this winding number is filled.
    #[inline]
    pub fn is_filled(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding & 1 != 0,
        }
    }
}

/// The single-shape model used to remove self-intersections.
///
/// The payload is one signed counter: `+1` for an edge of a contour
/// wound counter-clockwise (in a Y-up system), `-1` for the reverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnaryWinding {
    fill: FillRule,
}

impl UnaryWinding {
    /// The non-zero model.
    pub fn new() -> UnaryWinding {
        UnaryWinding::default()
    }

    /// A model with the given fill rule.
    pub fn with_fill(fill: FillRule) -> UnaryWinding {
        UnaryWinding { fill }
    }

    /// The model's fill rule.
    pub fn fill(&self) -> FillRule {
        self.fill
    }
}

impl WindingModel for UnaryWinding {
    type Winding = i32;

    #[inline]
    fn add(&self, a: &i32, b: &i32) -> i32 {
        a + b
    }

    #[inline]
    fn subtract(&self, a: &i32, b: &i32) -> i32 {
        a - b
    }

    #[inline]
    fn zero(&self, winding: &mut i32) {
        *winding = 0;
    }

    #[inline]
    fn visible(&self, winding: &i32) -> bool {
        *winding != 0
    }

    fn keep(&self, &wind: &i32, &sum: &i32) -> WindKeep {
        match self.fill {
            FillRule::NonZero => {
                if wind == 0 || (sum != 0 && sum != wind) {
                    WindKeep::Discard
                } else if sum != 0 {
                    WindKeep::Start
                } else {
                    WindKeep::End
                }
            }
            FillRule::EvenOdd => {
                let left = self.fill.is_filled(sum);
                let right = self.fill.is_filled(sum - wind);
                match (left, right) {
                    (true, false) => WindKeep::Start,
                    (false, true) => WindKeep::End,
                    _ => WindKeep::Discard,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unary_keep() {
        let model = UnaryWinding::new();
        assert_eq!(model.keep(&1, &1), WindKeep::Start);
        assert_eq!(model.keep(&1, &0), WindKeep::End);
        assert_eq!(model.keep(&-1, &-1), WindKeep::Start);
        assert_eq!(model.keep(&1, &2), WindKeep::Discard);
        assert_eq!(model.keep(&0, &0), WindKeep::Discard);
        assert_eq!(model.keep(&0, &3), WindKeep::Discard);
    }

    #[test]
    fn unary_zeroed_is_discarded() {
        let model = UnaryWinding::new();
        for wind in -3..=3 {
            let zeroed = model.zeroed(&wind);
            assert!(!model.visible(&zeroed));
            for sum in -5..=5 {
                assert_eq!(model.keep(&zeroed, &sum), WindKeep::Discard);
            }
        }
    }

    #[test]
    fn unary_nonzero_matches_sides() {
        // Start exactly when only the left side is filled, End exactly when
        // only the right side is.
        let model = UnaryWinding::new();
        for wind in -3..=3 {
            for sum in -5..=5 {
                let left = sum != 0;
                let right = sum - wind != 0;
                let expected = match (left, right) {
                    (true, false) => WindKeep::Start,
                    (false, true) => WindKeep::End,
                    _ => WindKeep::Discard,
                };
                assert_eq!(model.keep(&wind, &sum), expected, "wind {wind} sum {sum}");
            }
        }
    }

    #[test]
    fn even_odd() {
        let model = UnaryWinding::with_fill(FillRule::EvenOdd);
        assert_eq!(model.keep(&1, &1), WindKeep::Start);
        assert_eq!(model.keep(&1, &2), WindKeep::End);
        assert_eq!(model.keep(&2, &2), WindKeep::Discard);
        assert_eq!(model.add(&1, &-1), 0);
    }
}
