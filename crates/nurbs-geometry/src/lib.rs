//! NURBS evaluation and fitting engine.
//!
//! A [`Spline`] is an ordered set of knot vectors plus weighted control
//! points, generic over parametric dimension and degree. This crate locates
//! knot spans, evaluates basis functions and points, fits curves through
//! sample points, and adaptively flattens curves into polylines.

pub mod basis;
pub mod evaluate;
pub mod fit;
pub mod insert;
pub mod spline;
pub mod tessellate;

pub use insert::{can_insert_knot, InsertionRejection};
pub use spline::{Curve, Spline, Surface, Workspace};
