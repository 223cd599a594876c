//! Smoothing-parameter grid generation.
//!
//! λ is chosen by a deterministic grid search over log-spaced values; GCV is
//! cheap to evaluate for a one-dimensional smoother and has no local-minimum
//! trouble at this resolution.

use crate::config::ModelConfig;
use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid lambda range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Lambda steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Candidate λ values for a model configuration: the fixed value if set,
/// otherwise the configured log grid.
pub fn lambda_candidates(config: &ModelConfig) -> Result<Vec<f64>, AppError> {
    match config.lambda {
        Some(lambda) => Ok(vec![lambda]),
        None => log_space(config.lambda_min, config.lambda_max, config.lambda_steps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_non_positive_bounds() {
        assert!(log_space(0.0, 10.0, 5).is_err());
        assert!(log_space(1.0, 10.0, 1).is_err());
    }

    #[test]
    fn fixed_lambda_short_circuits_grid() {
        let config = ModelConfig {
            lambda: Some(0.6),
            ..ModelConfig::default()
        };
        assert_eq!(lambda_candidates(&config).unwrap(), vec![0.6]);
        assert_eq!(
            lambda_candidates(&ModelConfig::default()).unwrap().len(),
            ModelConfig::default().lambda_steps
        );
    }
}
