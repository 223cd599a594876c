//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate the smoothing-parameter grid
//! - fit a penalized B-spline smoother for each candidate λ
//! - select λ by GCV
//! - segment observations by era and fit each segment

pub mod era;
pub mod fitter;
pub mod lambda_grid;
pub mod selection;

pub use era::*;
pub use fitter::*;
pub use lambda_grid::*;
pub use selection::*;
