//! NURBS engine linear algebra: dense LU decomposition and substitution.

pub mod lu;

pub use lu::LuDecomposition;
pub use nalgebra::{DMatrix, DVector};
