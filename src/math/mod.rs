//! Mathematical utilities: spline basis, difference penalties, least squares.

pub mod bspline;
pub mod ols;

pub use bspline::*;
pub use ols::*;
