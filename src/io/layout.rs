//! Filesystem layout shared by all stages.
//!
//! ```text
//! <root>/data/raw/        per-season raw tables (fetch)
//! <root>/data/clean/      merged player-season table (clean)
//! <root>/data/processed/  modeling table + fitted curves (clean, model)
//! <root>/reports/figures/ rendered charts (plot)
//! ```

use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use crate::domain::{RawTable, Season};
use crate::error::AppError;

pub const PLAYER_SEASONS_FILE: &str = "player_seasons.csv";
pub const FOR_MODEL_FILE: &str = "for_model.csv";
pub const CURVES_FILE: &str = "curves.json";
pub const PEAK_AGES_FILE: &str = "peak_ages.csv";
pub const FIGURE_FILE: &str = "bpm_aging_curves_by_era.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("data").join("raw")
    }

    pub fn clean_dir(&self) -> PathBuf {
        self.root.join("data").join("clean")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("data").join("processed")
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.root.join("reports").join("figures")
    }

    pub fn raw_path(&self, season: Season) -> PathBuf {
        self.raw_dir().join(RawTable::file_name(season))
    }

    pub fn player_seasons_path(&self) -> PathBuf {
        self.clean_dir().join(PLAYER_SEASONS_FILE)
    }

    pub fn for_model_path(&self) -> PathBuf {
        self.processed_dir().join(FOR_MODEL_FILE)
    }

    pub fn curves_path(&self) -> PathBuf {
        self.processed_dir().join(CURVES_FILE)
    }

    pub fn peak_ages_path(&self) -> PathBuf {
        self.processed_dir().join(PEAK_AGES_FILE)
    }

    pub fn era_curve_path(&self, era: &str) -> PathBuf {
        self.processed_dir().join(format!("curve_{}.csv", slug(era)))
    }

    pub fn figure_path(&self) -> PathBuf {
        self.figures_dir().join(FIGURE_FILE)
    }

    /// Per-era curve CSVs currently in the processed directory.
    pub fn era_curve_files(&self) -> Result<Vec<PathBuf>, AppError> {
        let dir = self.processed_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir)
            .map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?
                .path();
            let is_curve = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("curve_") && n.ends_with(".csv"));
            if is_curve && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Delete an output left by an earlier run. Returns whether a file was removed.
pub fn remove_stale(path: &Path) -> Result<bool, AppError> {
    if !path.is_file() {
        return Ok(false);
    }
    fs::remove_file(path)
        .map_err(|e| AppError::new(2, format!("Failed to remove stale '{}': {e}", path.display())))?;
    log::info!("removed stale {}", path.display());
    Ok(true)
}

/// Create `dir` (and parents) if needed.
pub fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", dir.display())))
}

/// File-name-safe version of an era label.
pub fn slug(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_directories_hang_off_root() {
        let layout = DataLayout::new("/tmp/x");
        assert_eq!(layout.raw_path(2015), PathBuf::from("/tmp/x/data/raw/2015_2016_advanced.csv"));
        assert_eq!(layout.figure_path(), PathBuf::from("/tmp/x/reports/figures/bpm_aging_curves_by_era.svg"));
    }

    #[test]
    fn stale_outputs_are_listed_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        assert!(layout.era_curve_files().unwrap().is_empty());

        ensure_dir(&layout.processed_dir()).unwrap();
        for name in ["curve_b.csv", "curve_a.csv", "curves.json", "peak_ages.csv"] {
            fs::write(layout.processed_dir().join(name), "x").unwrap();
        }
        assert_eq!(
            layout.era_curve_files().unwrap(),
            vec![layout.era_curve_path("a"), layout.era_curve_path("b")]
        );

        assert!(remove_stale(&layout.peak_ages_path()).unwrap());
        assert!(!remove_stale(&layout.peak_ages_path()).unwrap());
        assert!(layout.curves_path().exists());
    }

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(slug("Pre 2015"), "Pre_2015");
        assert_eq!(slug("2015-2025"), "2015-2025");
        assert_eq!(slug("a/b"), "a_b");
    }
}
