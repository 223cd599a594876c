//! Smoothing-parameter selection by generalized cross-validation.
//!
//! For each candidate λ the smoother is fitted and scored with
//!
//! ```text
//! GCV(λ) = n · RSS(λ) / (n − EDF(λ))²
//! ```
//!
//! Selection rules:
//! 1. Candidates whose fit fails numerically are skipped (and counted).
//! 2. The minimum GCV wins; ties go to the earlier (smaller) λ in the grid.

use crate::error::AppError;
use crate::fit::fitter::{GamFit, GamProblem};

/// Output of a λ search.
#[derive(Debug, Clone)]
pub struct LambdaSearch {
    pub best: GamFit,
    /// `(λ, GCV)` for every candidate that produced a fit, in grid order.
    pub evaluated: Vec<(f64, f64)>,
    /// Number of candidates that failed to fit.
    pub failed: usize,
}

pub fn select_lambda(problem: &GamProblem, lambdas: &[f64]) -> Result<LambdaSearch, AppError> {
    if lambdas.is_empty() {
        return Err(AppError::new(4, "Lambda grid is empty."));
    }

    let mut best: Option<GamFit> = None;
    let mut evaluated = Vec::with_capacity(lambdas.len());
    let mut failed = 0usize;

    for &lambda in lambdas {
        let fit = match problem.fit(lambda) {
            Ok(fit) if fit.gcv.is_finite() => fit,
            Ok(_) => {
                failed += 1;
                continue;
            }
            Err(e) => {
                log::debug!("lambda={lambda:.4e} skipped: {e}");
                failed += 1;
                continue;
            }
        };
        evaluated.push((lambda, fit.gcv));

        let better = match &best {
            None => true,
            Some(b) => fit.gcv < b.gcv,
        };
        if better {
            best = Some(fit);
        }
    }

    let Some(best) = best else {
        return Err(AppError::new(
            4,
            format!("No valid smoothing candidates among {} lambda values.", lambdas.len()),
        ));
    };

    Ok(LambdaSearch {
        best,
        evaluated,
        failed,
    })
}
