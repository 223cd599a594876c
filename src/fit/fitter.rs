//! Penalized B-spline smoother for a single predictor (a one-term GAM).
//!
//! Given:
//! - predictor values `x_i` (age)
//! - responses `y_i` (BPM)
//! - weights `w_i` (normalized to mean 1)
//!
//! a [`GamProblem`] precomputes the design matrix once so that fits for many
//! smoothing parameters only redo the small `k × k` algebra:
//! - coefficients from the augmented least squares system
//! - effective degrees of freedom `tr((BᵀWB + λP)⁻¹ BᵀWB)`
//! - GCV score and residual variance
//! - Bayesian posterior covariance `σ² (BᵀWB + λP)⁻¹` for confidence bands

use nalgebra::{DMatrix, DVector};

use crate::domain::{CurveGrid, FitQuality};
use crate::error::AppError;
use crate::math::{BSplineBasis, difference_matrix, solve_least_squares, symmetric_inverse};

/// Shape of the spline smoother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmootherSpec {
    pub n_splines: usize,
    pub degree: usize,
    pub penalty_order: usize,
}

impl Default for SmootherSpec {
    fn default() -> Self {
        Self {
            n_splines: 20,
            degree: 3,
            penalty_order: 2,
        }
    }
}

/// One observation for the smoother.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

/// Precomputed data for fitting one segment at any λ.
#[derive(Debug, Clone)]
pub struct GamProblem {
    basis: BSplineBasis,
    design: DMatrix<f64>,
    /// Design rows scaled by `√w_i`.
    design_w: DMatrix<f64>,
    y: DVector<f64>,
    y_w: DVector<f64>,
    weights: Vec<f64>,
    btwb: DMatrix<f64>,
    diff: DMatrix<f64>,
}

/// A fitted smoother.
#[derive(Debug, Clone)]
pub struct GamFit {
    basis: BSplineBasis,
    coefs: DVector<f64>,
    cov: DMatrix<f64>,
    pub n: usize,
    pub lambda: f64,
    pub edf: f64,
    pub gcv: f64,
    pub rss: f64,
    pub sigma2: f64,
    pub rmse: f64,
}

impl GamProblem {
    pub fn new(observations: &[Observation], spec: &SmootherSpec) -> Result<Self, AppError> {
        if observations.is_empty() {
            return Err(AppError::new(3, "No observations to fit."));
        }
        if observations
            .iter()
            .any(|o| !(o.x.is_finite() && o.y.is_finite() && o.weight.is_finite() && o.weight > 0.0))
        {
            return Err(AppError::new(4, "Non-finite observation or non-positive weight."));
        }

        let n = observations.len();
        let x_min = observations.iter().map(|o| o.x).fold(f64::INFINITY, f64::min);
        let x_max = observations.iter().map(|o| o.x).fold(f64::NEG_INFINITY, f64::max);
        let basis = BSplineBasis::uniform(x_min, x_max, spec.n_splines, spec.degree)?;

        let w_mean = observations.iter().map(|o| o.weight).sum::<f64>() / n as f64;
        let weights: Vec<f64> = observations.iter().map(|o| o.weight / w_mean).collect();

        let xs: Vec<f64> = observations.iter().map(|o| o.x).collect();
        let design = basis.design_matrix(&xs);
        let y = DVector::from_iterator(n, observations.iter().map(|o| o.y));

        let mut design_w = design.clone();
        let mut y_w = y.clone();
        for (i, &w) in weights.iter().enumerate() {
            let sw = w.sqrt();
            design_w.row_mut(i).scale_mut(sw);
            y_w[i] *= sw;
        }

        let btwb = design_w.transpose() * &design_w;
        let diff = difference_matrix(basis.len(), spec.penalty_order);

        Ok(Self {
            basis,
            design,
            design_w,
            y,
            y_w,
            weights,
            btwb,
            diff,
        })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn basis(&self) -> &BSplineBasis {
        &self.basis
    }

    /// Fit at a fixed smoothing parameter.
    pub fn fit(&self, lambda: f64) -> Result<GamFit, AppError> {
        if !(lambda.is_finite() && lambda > 0.0) {
            return Err(AppError::new(2, format!("Invalid smoothing parameter lambda={lambda}.")));
        }

        let n = self.len();
        let k = self.basis.len();
        let m = self.diff.nrows();

        let mut aug = DMatrix::<f64>::zeros(n + m, k);
        aug.rows_mut(0, n).copy_from(&self.design_w);
        aug.rows_mut(n, m).copy_from(&(&self.diff * lambda.sqrt()));
        let mut rhs = DVector::<f64>::zeros(n + m);
        rhs.rows_mut(0, n).copy_from(&self.y_w);

        let coefs = solve_least_squares(&aug, &rhs)
            .ok_or_else(|| AppError::new(4, format!("Penalized least squares failed at lambda={lambda}.")))?;

        let penalty = self.diff.transpose() * &self.diff;
        let a = &self.btwb + penalty * lambda;
        let a_inv = symmetric_inverse(&a)
            .ok_or_else(|| AppError::new(4, format!("Singular penalized normal matrix at lambda={lambda}.")))?;

        let edf = (&a_inv * &self.btwb).trace();
        let fitted = &self.design * &coefs;
        let rss: f64 = (0..n)
            .map(|i| {
                let r = self.y[i] - fitted[i];
                self.weights[i] * r * r
            })
            .sum();

        let resid_df = n as f64 - edf;
        if !(resid_df > 0.0 && rss.is_finite()) {
            return Err(AppError::new(
                4,
                format!("No residual degrees of freedom at lambda={lambda} (n={n}, edf={edf:.2})."),
            ));
        }
        let sigma2 = rss / resid_df;
        let gcv = n as f64 * rss / (resid_df * resid_df);
        let rmse = (rss / n as f64).sqrt();

        Ok(GamFit {
            basis: self.basis.clone(),
            coefs,
            cov: a_inv * sigma2,
            n,
            lambda,
            edf,
            gcv,
            rss,
            sigma2,
            rmse,
        })
    }
}

impl GamFit {
    pub fn predict(&self, x: f64) -> f64 {
        let b = self.basis.eval(x);
        b.iter().zip(self.coefs.iter()).map(|(bi, ci)| bi * ci).sum()
    }

    /// Posterior standard error of the prediction at `x`.
    pub fn standard_error(&self, x: f64) -> f64 {
        let b = DVector::from_vec(self.basis.eval(x));
        let var = (b.transpose() * &self.cov * &b)[(0, 0)];
        var.max(0.0).sqrt()
    }

    pub fn quality(&self) -> FitQuality {
        FitQuality {
            n: self.n,
            lambda: self.lambda,
            edf: self.edf,
            gcv: self.gcv,
            rmse: self.rmse,
        }
    }

    /// Evaluate prediction and `± z·se` band on `n_points` evenly spaced ages
    /// spanning the fitted range.
    pub fn evaluate(&self, n_points: usize, z: f64) -> CurveGrid {
        let n = n_points.max(2);
        let (x0, x1) = self.basis.range();

        let mut grid = CurveGrid {
            age: Vec::with_capacity(n),
            fit: Vec::with_capacity(n),
            lower: Vec::with_capacity(n),
            upper: Vec::with_capacity(n),
        };
        for i in 0..n {
            let u = i as f64 / (n as f64 - 1.0);
            let x = x0 + u * (x1 - x0);
            let y = self.predict(x);
            let half = z * self.standard_error(x);
            grid.age.push(x);
            grid.fit.push(y);
            grid.lower.push(y - half);
            grid.upper.push(y + half);
        }
        grid
    }
}
