//! Curve fitting: parameterization, knot placement, and global
//! interpolation.

pub mod interpolate;
pub mod knots;
pub mod parameterize;

pub use interpolate::global;
pub use knots::build_knot_vector;
pub use parameterize::{parameterize, CENTRIPETAL_FIT, CHORDAL_FIT};
