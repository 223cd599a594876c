//! Export fitted curves to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts:
//! - `peak_ages.csv`: one row per era
//! - `curve_<era>.csv`: the evaluated grid for one era

use std::fs::File;
use std::path::Path;

use crate::domain::EraCurve;
use crate::error::AppError;

/// Write one row per era: `Era,PeakAge,PeakBPM,N,Lambda,EDF`.
pub fn write_peak_ages_csv(path: &Path, curves: &[EraCurve]) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    write_record(&mut writer, ["Era", "PeakAge", "PeakBPM", "N", "Lambda", "EDF"])?;
    for c in curves {
        write_record(
            &mut writer,
            [
                c.era.clone(),
                format!("{:.3}", c.peak_age),
                format!("{:.4}", c.peak_bpm),
                c.quality.n.to_string(),
                format!("{:.6}", c.quality.lambda),
                format!("{:.3}", c.quality.edf),
            ],
        )?;
    }
    flush(&mut writer, path)
}

/// Write an era's evaluated grid: `Era,Age,BPM_hat,Lower,Upper`.
pub fn write_era_curve_csv(path: &Path, curve: &EraCurve) -> Result<(), AppError> {
    let mut writer = create_writer(path)?;
    write_record(&mut writer, ["Era", "Age", "BPM_hat", "Lower", "Upper"])?;
    let g = &curve.grid;
    for i in 0..g.len() {
        write_record(
            &mut writer,
            [
                curve.era.clone(),
                format!("{:.4}", g.age[i]),
                format!("{:.6}", g.fit[i]),
                format!("{:.6}", g.lower[i]),
                format!("{:.6}", g.upper[i]),
            ],
        )?;
    }
    flush(&mut writer, path)
}

fn create_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

fn write_record<I, T>(writer: &mut csv::Writer<File>, record: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(record)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))
}

fn flush(writer: &mut csv::Writer<File>, path: &Path) -> Result<(), AppError> {
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveGrid, FitQuality};

    #[test]
    fn peak_ages_has_one_row_per_era() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peak_ages.csv");
        let curve = |era: &str, peak: f64| EraCurve {
            era: era.to_string(),
            peak_age: peak,
            peak_bpm: 2.0,
            quality: FitQuality { n: 300, lambda: 10.0, edf: 5.5, gcv: 4.0, rmse: 2.0 },
            grid: CurveGrid { age: vec![], fit: vec![], lower: vec![], upper: vec![] },
        };
        write_peak_ages_csv(&path, &[curve("Pre-2015", 27.25), curve("2015-2025", 26.5)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Pre-2015,27.250,"));
        assert!(lines[2].starts_with("2015-2025,26.500,"));
    }
}
