// Copyright 2025 the Bezop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boolean operations on paths made of curves.
//!
//! Bezop takes closed contours built from lines, quadratic and cubic
//! Béziers, conics, and caller-registered curve kinds, and computes the
//! outline of the region a [`WindingModel`] selects: the union,
//! intersection or difference of two operands with [`BinaryModel`], or the
//! filled area of a single self-overlapping path with [`UnaryWinding`].
//!
//! Curves are added to a [`Context`], which splits them into pieces
//! monotonic in both axes, finds every place they meet, and decides for
//! each resulting edge whether it bounds the result. The kept edges are
//! joined into closed loops and written to any [`PathSink`], such as a
//! [`BezPath`].
//!
//! # Examples
//!
//! The union of two overlapping squares:
//!
//! ```
//! use bezop::{BezPath, BinaryModel, BinaryOp, BinaryWinding, Context, Rect};
//!
//! let mut ctx = Context::new(BinaryModel::new(BinaryOp::Union));
//! ctx.add_rect(Rect::new(0.0, 0.0, 2.0, 2.0), BinaryWinding::LEFT);
//! ctx.add_rect(Rect::new(1.0, 1.0, 3.0, 3.0), BinaryWinding::RIGHT);
//!
//! let mut result = BezPath::new();
//! ctx.resolve(&mut result).unwrap();
//! assert_eq!(result.subpath_count(), 1);
//! ```
//!
//! Coordinates are Y-up: a contour running counter-clockwise has winding
//! +1 inside it.
//!
//! # Features
//!
//! This crate either uses the standard library or the [`libm`] crate for
//! math functionality. The `std` feature is enabled by default, but can be
//! disabled, as long as the `libm` feature is enabled. This is useful for
//! `no_std` environments. This crate uses the `alloc` crate regardless.
//!
//! The `serde` feature derives serialization for the geometry types and
//! [`Limits`].
//!
//! Progress is reported through the [`log`] facade: `debug` for each stage
//! of a resolve, `trace` for the decision on every edge, and `warn` when an
//! error is continued past.
//!
//! [`libm`]: https://docs.rs/libm
//! [`log`]: https://docs.rs/log

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    clippy::bool_to_int_with_if
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("bezop requires either the `std` or `libm` feature");

extern crate alloc;

mod affine;
mod axis;
mod binary;
pub mod common;
mod conic;
mod context;
mod cubicbez;
mod curve;
mod error;
mod intersect;
mod limits;
mod line;
mod monotonic;
mod param_curve;
mod path;
mod point;
mod quadbez;
mod rect;
mod resolve;
mod roots;
mod vec2;
mod winding;

pub use crate::affine::*;
pub use crate::axis::*;
pub use crate::binary::*;
pub use crate::conic::*;
pub use crate::context::{Context, ContourId};
pub use crate::cubicbez::*;
pub use crate::curve::*;
pub use crate::error::*;
pub use crate::intersect::*;
pub use crate::limits::*;
pub use crate::line::*;
pub use crate::monotonic::*;
pub use crate::param_curve::*;
pub use crate::path::*;
pub use crate::point::*;
pub use crate::quadbez::*;
pub use crate::rect::*;
pub use crate::roots::*;
pub use crate::vec2::*;
pub use crate::winding::*;
