// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while resolving a context.

use alloc::boxed::Box;
use core::fmt;

/// A failure that stops a context from producing a result.
///
/// Once raised (and not downgraded by an [`ErrorDispatch`]), the error is
/// sticky: the context reports it from [`Context::error`] and refuses
/// further resolves until [`Context::clear_error`].
///
/// [`Context::error`]: crate::Context::error
/// [`Context::clear_error`]: crate::Context::clear_error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpError {
    /// A contour's last curve does not end where its first curve starts.
    #[error("contour end is not connected to its start")]
    EndNotConnected,
    /// A curve has a NaN or infinite coordinate.
    #[error("curve has non-finite points")]
    NonFiniteCurvePoints,
    /// Curve intersections could not be computed consistently.
    #[error("curves could not be intersected")]
    Intersection,
    /// The kept edges do not join into closed loops.
    #[error("result has open loops")]
    OpenLoops,
    /// A rotated frame exceeded its trusted coordinate range.
    #[error("vertical rotation exceeded its numeric range")]
    VerticalRotationRange,
    /// Joining kept edges into loops needed more search than allowed.
    #[error("loop decision tree is too complex")]
    DecisionTreeTooComplex,
}

/// What to do about an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dispatch {
    /// Stop, leaving the error set on the context.
    #[default]
    Halt,
    /// Ignore the error and carry on as well as possible.
    Continue,
}

/// A caller hook that decides whether an error stops resolution.
pub struct ErrorDispatch(Box<dyn FnMut(OpError) -> Dispatch + Send>);

impl ErrorDispatch {
    /// Wrap a decision function.
    pub fn new(f: impl FnMut(OpError) -> Dispatch + Send + 'static) -> ErrorDispatch {
        ErrorDispatch(Box::new(f))
    }

    /// A dispatch that continues past the given kinds of error and halts on
    /// the rest.
    pub fn continue_on(kinds: &'static [OpError]) -> ErrorDispatch {
        ErrorDispatch::new(move |err| {
            if kinds.contains(&err) {
                Dispatch::Continue
            } else {
                Dispatch::Halt
            }
        })
    }

    pub(crate) fn dispatch(&mut self, err: OpError) -> Dispatch {
        (self.0)(err)
    }
}

impl fmt::Debug for ErrorDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorDispatch").finish_non_exhaustive()
    }
}
