// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The two-operand winding model used for boolean operations.

use crate::{FillRule, WindKeep, WindingModel};

/// A boolean operation on two filled shapes.
///
/// The discriminants follow the conventional operator order, and index the
/// decision and inversion tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// The left operand minus the right.
    Difference = 0,
    /// Where both operands are filled.
    Intersect = 1,
    /// Where either operand is filled.
    Union = 2,
    /// Where exactly one operand is filled.
    Xor = 3,
    /// The right operand minus the left.
    ReverseDifference = 4,
}

impl BinaryOp {
    /// All operators, in table order.
    pub const ALL: [BinaryOp; 5] = [
        BinaryOp::Difference,
        BinaryOp::Intersect,
        BinaryOp::Union,
        BinaryOp::Xor,
        BinaryOp::ReverseDifference,
    ];

    /// Apply the operator to two memberships.
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            BinaryOp::Difference => left && !right,
            BinaryOp::Intersect => left && right,
            BinaryOp::Union => left || right,
            BinaryOp::Xor => left != right,
            BinaryOp::ReverseDifference => !left && right,
        }
    }

    /// The operator to run on the operands' ordinary fills when either
    /// operand is inverse filled.
    ///
    /// Combine with [`BinaryOp::output_inverted`]: the result of `self` on
    /// the inverted operands is the result of the mapped operator on the
    /// plain operands, inverted when `output_inverted` says so. Mapping
    /// twice with the same flags returns `self`.
    pub fn map_inverted(self, left_inverse: bool, right_inverse: bool) -> BinaryOp {
        use BinaryOp::{
            Difference as Diff, Intersect as Sect, ReverseDifference as RDiff, Union, Xor,
        };
        const MAP: [[[BinaryOp; 2]; 2]; 5] = [
            [[Diff, Sect], [Union, RDiff]],
            [[Sect, Diff], [RDiff, Union]],
            [[Union, RDiff], [Diff, Sect]],
            [[Xor, Xor], [Xor, Xor]],
            [[RDiff, Union], [Sect, Diff]],
        ];
        MAP[self as usize][usize::from(left_inverse)][usize::from(right_inverse)]
    }

    /// Whether the result of [`BinaryOp::map_inverted`] must be inverse
    /// filled.
    pub fn output_inverted(self, left_inverse: bool, right_inverse: bool) -> bool {
        const OUT: [[[bool; 2]; 2]; 5] = [
            [[false, false], [true, false]],
            [[false, false], [false, true]],
            [[false, true], [true, true]],
            [[false, true], [true, false]],
            [[false, true], [false, false]],
        ];
        OUT[self as usize][usize::from(left_inverse)][usize::from(right_inverse)]
    }
}

/// The coverage of one edge by each operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryWinding {
    /// Coverage contributed by the left operand.
    pub left: i32,
    /// Coverage contributed by the right operand.
    pub right: i32,
}

impl BinaryWinding {
    /// Create a payload.
    #[inline]
    pub const fn new(left: i32, right: i32) -> BinaryWinding {
        BinaryWinding { left, right }
    }

    /// The payload of an edge of the left operand wound counter-clockwise.
    pub const LEFT: BinaryWinding = BinaryWinding::new(1, 0);

    /// The payload of an edge of the right operand wound counter-clockwise.
    pub const RIGHT: BinaryWinding = BinaryWinding::new(0, 1);
}

/// How one operand relates to an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WindState {
    /// Neither side is inside the operand.
    Zero = 0,
    /// Only the edge's left side is inside.
    FlipOn = 1,
    /// Only the edge's right side is inside.
    FlipOff = 2,
    /// Both sides are inside.
    One = 3,
}

impl WindState {
    fn classify(fill: FillRule, wind: i32, sum: i32) -> WindState {
        match (fill.is_filled(sum), fill.is_filled(sum - wind)) {
            (false, false) => WindState::Zero,
            (true, false) => WindState::FlipOn,
            (false, true) => WindState::FlipOff,
            (true, true) => WindState::One,
        }
    }
}

const D: WindKeep = WindKeep::Discard;
const S: WindKeep = WindKeep::Start;
const E: WindKeep = WindKeep::End;

/// Edge decisions, indexed by operator, then the left operand's state, then
/// the right operand's state.
///
/// When both operands flip on the same edge the two flips either reinforce
/// or cancel; this is why `FlipOn` and `FlipOff` are kept apart even where
/// they agree on visibility.
const KEEP: [[[WindKeep; 4]; 4]; 5] = [
    // Difference
    [
        [D, D, D, D],
        [S, D, S, D],
        [E, E, D, D],
        [D, E, S, D],
    ],
    // Intersect
    [
        [D, D, D, D],
        [D, S, D, S],
        [D, D, E, E],
        [D, S, E, D],
    ],
    // Union
    [
        [D, S, E, D],
        [S, S, D, D],
        [E, D, E, D],
        [D, D, D, D],
    ],
    // Xor
    [
        [D, S, E, D],
        [S, D, D, E],
        [E, D, D, S],
        [D, E, S, D],
    ],
    // ReverseDifference
    [
        [D, S, E, D],
        [D, D, E, E],
        [D, S, D, S],
        [D, D, D, D],
    ],
];

/// The winding model for a boolean operation on two shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryModel {
    op: BinaryOp,
    left_fill: FillRule,
    right_fill: FillRule,
}

impl BinaryModel {
    /// A model for `op` with both operands filled non-zero.
    pub fn new(op: BinaryOp) -> BinaryModel {
        BinaryModel::with_fills(op, FillRule::NonZero, FillRule::NonZero)
    }

    /// A model for `op` with the given operand fill rules.
    pub fn with_fills(op: BinaryOp, left_fill: FillRule, right_fill: FillRule) -> BinaryModel {
        BinaryModel {
            op,
            left_fill,
            right_fill,
        }
    }

    /// The operator.
    pub fn op(&self) -> BinaryOp {
        self.op
    }
}

impl WindingModel for BinaryModel {
    type Winding = BinaryWinding;

    #[inline]
    fn add(&self, a: &BinaryWinding, b: &BinaryWinding) -> BinaryWinding {
        BinaryWinding::new(a.left + b.left, a.right + b.right)
    }

    #[inline]
    fn subtract(&self, a: &BinaryWinding, b: &BinaryWinding) -> BinaryWinding {
        BinaryWinding::new(a.left - b.left, a.right - b.right)
    }

    #[inline]
    fn zero(&self, winding: &mut BinaryWinding) {
        *winding = BinaryWinding::default();
    }

    #[inline]
    fn visible(&self, winding: &BinaryWinding) -> bool {
        winding.left != 0 || winding.right != 0
    }

    fn keep(&self, wind: &BinaryWinding, sum: &BinaryWinding) -> WindKeep {
        let left = WindState::classify(self.left_fill, wind.left, sum.left);
        let right = WindState::classify(self.right_fill, wind.right, sum.right);
        KEEP[self.op as usize][left as usize][right as usize]
    }
}
