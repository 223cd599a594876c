//! Read/write curve JSON files.
//!
//! Curve JSON is the hand-off between the model and plot stages:
//! - one entry per fitted era
//! - fit diagnostics (n, λ, EDF, GCV, RMSE) and the estimated peak
//! - a precomputed age grid with prediction and confidence band
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, EraCurve};
use crate::error::AppError;

pub const CURVE_TOOL: &str = "bpm";
pub const CURVE_METRIC: &str = "BPM";

/// Wrap fitted era curves into the on-disk representation.
pub fn curve_file(curves: Vec<EraCurve>, band_z: f64) -> CurveFile {
    CurveFile {
        tool: CURVE_TOOL.to_string(),
        metric: CURVE_METRIC.to_string(),
        band_z,
        curves,
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curves: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, curves)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curves: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;

    for c in &curves.curves {
        let n = c.grid.age.len();
        if c.grid.fit.len() != n || c.grid.lower.len() != n || c.grid.upper.len() != n {
            return Err(AppError::new(
                2,
                format!("Invalid curve JSON: grid columns for era '{}' differ in length.", c.era),
            ));
        }
    }
    Ok(curves)
}
