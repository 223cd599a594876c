//! Equally spaced B-spline basis and difference penalties (P-splines).
//!
//! The basis of `n_basis` functions of degree `d` over `[x_min, x_max]` uses
//! `n_basis - d` equal intervals and extends the knot vector by `d` knots on
//! each side, so every point of the range is covered by exactly `d + 1`
//! non-zero functions and the basis sums to one.
//!
//! Smoothness is imposed by penalizing squared `k`-th order differences of
//! adjacent coefficients: `λ ‖D_k β‖²`.

use nalgebra::DMatrix;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct BSplineBasis {
    x_min: f64,
    x_max: f64,
    degree: usize,
    n_basis: usize,
    knots: Vec<f64>,
}

impl BSplineBasis {
    pub fn uniform(x_min: f64, x_max: f64, n_basis: usize, degree: usize) -> Result<Self, AppError> {
        if !(x_min.is_finite() && x_max.is_finite() && x_max > x_min) {
            return Err(AppError::new(
                4,
                format!("Invalid spline range: [{x_min}, {x_max}] (must be finite with max>min)."),
            ));
        }
        if degree == 0 || n_basis < degree + 1 {
            return Err(AppError::new(
                2,
                format!("Invalid spline basis: n_basis={n_basis}, degree={degree}."),
            ));
        }

        let intervals = n_basis - degree;
        let h = (x_max - x_min) / intervals as f64;
        let n_knots = n_basis + degree + 1;
        let knots = (0..n_knots)
            .map(|j| x_min + (j as f64 - degree as f64) * h)
            .collect();

        Ok(Self {
            x_min,
            x_max,
            degree,
            n_basis,
            knots,
        })
    }

    pub fn len(&self) -> usize {
        self.n_basis
    }

    pub fn is_empty(&self) -> bool {
        self.n_basis == 0
    }

    pub fn range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    /// Evaluate every basis function at `x` (clamped to the range).
    ///
    /// # Panics
    /// Panics if `out.len() != self.len()`.
    pub fn eval_into(&self, x: f64, out: &mut [f64]) {
        assert_eq!(out.len(), self.n_basis, "basis output length mismatch");

        let x = x.clamp(self.x_min, self.x_max);
        let t = &self.knots;
        let n_knots = t.len();

        // Cox-de Boor, in place: after raising to degree `d` the first
        // `n_knots - 1 - d` entries hold the degree-`d` functions.
        let mut b = vec![0.0; n_knots - 1];
        for j in 0..n_knots - 1 {
            if t[j] <= x && x < t[j + 1] {
                b[j] = 1.0;
            }
        }
        for d in 1..=self.degree {
            for j in 0..n_knots - 1 - d {
                let left_span = t[j + d] - t[j];
                let right_span = t[j + d + 1] - t[j + 1];
                let left = if left_span > 0.0 {
                    (x - t[j]) / left_span * b[j]
                } else {
                    0.0
                };
                let right = if right_span > 0.0 {
                    (t[j + d + 1] - x) / right_span * b[j + 1]
                } else {
                    0.0
                };
                b[j] = left + right;
            }
        }

        out.copy_from_slice(&b[..self.n_basis]);
    }

    pub fn eval(&self, x: f64) -> Vec<f64> {
        let mut out = vec![0.0; self.n_basis];
        self.eval_into(x, &mut out);
        out
    }

    /// Design matrix with one row per observation.
    pub fn design_matrix(&self, xs: &[f64]) -> DMatrix<f64> {
        let mut m = DMatrix::<f64>::zeros(xs.len(), self.n_basis);
        let mut row = vec![0.0; self.n_basis];
        for (i, &x) in xs.iter().enumerate() {
            self.eval_into(x, &mut row);
            for (j, &v) in row.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }
}

/// `order`-th difference operator as a `(k - order) × k` matrix.
pub fn difference_matrix(k: usize, order: usize) -> DMatrix<f64> {
    let mut d = DMatrix::<f64>::identity(k, k);
    for _ in 0..order {
        let rows = d.nrows();
        if rows < 2 {
            return DMatrix::zeros(0, k);
        }
        let mut next = DMatrix::<f64>::zeros(rows - 1, k);
        for i in 0..rows - 1 {
            for j in 0..k {
                next[(i, j)] = d[(i + 1, j)] - d[(i, j)];
            }
        }
        d = next;
    }
    d
}

/// Penalty matrix `DᵀD` for the given difference order.
pub fn difference_penalty(k: usize, order: usize) -> DMatrix<f64> {
    let d = difference_matrix(k, order);
    d.transpose() * d
}
