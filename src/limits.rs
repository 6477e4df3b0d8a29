// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric policy for a context.

/// Tolerances and bounds used while resolving a context.
///
/// The defaults suit geometry with coordinates of moderate magnitude, say
/// within `±1e6`. For very large or very small inputs, scale the geometry
/// into that range or set the limits with [`Context::set_limits`].
///
/// [`Context::set_limits`]: crate::Context::set_limits
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Curve parameters closer than this to 0 or 1 are snapped to the bound,
    /// and parameters closer than this to each other are the same.
    pub t_epsilon: f64,
    /// Points closer than this are the same vertex.
    pub point_tolerance: f64,
    /// How far a control point may stray from the chord of a curve that is
    /// treated as a line. Scaled by the chord length when the chord is
    /// longer than one unit.
    pub line_tolerance: f64,
    /// The largest coordinate magnitude trusted in a frame rotated to make a
    /// reference line vertical.
    pub max_rotated: f64,
    /// How many times a pair of curves may be halved while searching for
    /// their intersections.
    pub max_depth: u32,
    /// How many branching choices the search for one loop may make before
    /// giving up. A choice counts when another unused way on remains at the
    /// same vertex.
    pub max_limbs: usize,
    /// More distinct intersections than this between two curves is an
    /// error.
    pub max_hits_per_pair: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            t_epsilon: f64::from(f32::EPSILON),
            point_tolerance: 1e-9,
            line_tolerance: 1e-9,
            max_rotated: 1e15,
            max_depth: 32,
            max_limbs: 4096,
            max_hits_per_pair: 9,
        }
    }
}
