//! Clean & merge stage.
//!
//! Reads every `data/raw/*.csv`, normalizes headers, coerces types, labels
//! eras, filters low-minute rows and drops duplicate player-seasons. Writes:
//!
//! - `data/clean/player_seasons.csv`: every kept row
//! - `data/processed/for_model.csv`: modeling columns only
//!
//! Problems are collected rather than fatal: a file with an unrecognized name
//! or missing columns is skipped, a malformed row becomes a [`RowError`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::domain::{ModelRow, PlayerSeason, Season, era_label};
use crate::error::AppError;
use crate::io::{
    DataLayout, ensure_dir, list_raw_files, season_from_file_name, write_model_rows,
    write_player_seasons,
};

pub mod columns;
pub mod row;

pub use columns::{ColumnMap, canonical_header};
pub use row::parse_row;

/// A raw file left out of the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// A row-level error encountered during the merge.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub file: String,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub files_read: usize,
    pub files_skipped: Vec<SkippedFile>,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    /// Rows dropped for a blank BPM, age, minutes, team or position.
    pub missing_metric: usize,
    /// Rows under the minutes threshold.
    pub filtered_minutes: usize,
    /// Later occurrences of an already-seen (player, season).
    pub duplicates: usize,
    pub rows_written: usize,
    pub player_seasons_path: PathBuf,
    pub for_model_path: PathBuf,
}

/// Merge result before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSeasons {
    pub rows: Vec<PlayerSeason>,
    pub files_read: usize,
    pub files_skipped: Vec<SkippedFile>,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    pub missing_metric: usize,
    pub filtered_minutes: usize,
    pub duplicates: usize,
}

pub fn clean_and_merge(layout: &DataLayout, config: &PipelineConfig) -> Result<CleanReport, AppError> {
    let raw_dir = layout.raw_dir();
    let files = list_raw_files(&raw_dir)?;
    if files.is_empty() {
        return Err(AppError::new(
            3,
            format!("No raw CSV files found in '{}'.", raw_dir.display()),
        ));
    }

    let merged = merge_files(&files, config)?;
    if !merged.row_errors.is_empty() {
        log::warn!("{} malformed rows excluded", merged.row_errors.len());
    }
    if merged.rows.is_empty() {
        log::warn!("no rows survived cleaning; writing empty tables");
    }

    ensure_dir(&layout.clean_dir())?;
    ensure_dir(&layout.processed_dir())?;

    let player_seasons_path = layout.player_seasons_path();
    let for_model_path = layout.for_model_path();
    write_player_seasons(&player_seasons_path, &merged.rows)?;
    let model_rows: Vec<ModelRow> = merged.rows.iter().map(ModelRow::from).collect();
    write_model_rows(&for_model_path, &model_rows)?;

    log::info!(
        "[clean] files={} rows={} model_rows={}",
        merged.files_read,
        merged.rows_read,
        model_rows.len()
    );

    Ok(CleanReport {
        files_read: merged.files_read,
        files_skipped: merged.files_skipped,
        rows_read: merged.rows_read,
        row_errors: merged.row_errors,
        missing_metric: merged.missing_metric,
        filtered_minutes: merged.filtered_minutes,
        duplicates: merged.duplicates,
        rows_written: model_rows.len(),
        player_seasons_path,
        for_model_path,
    })
}

/// Merge raw files in the given order. Earlier files win on duplicate keys.
pub fn merge_files(files: &[PathBuf], config: &PipelineConfig) -> Result<MergedSeasons, AppError> {
    let mut merged = MergedSeasons {
        rows: Vec::new(),
        files_read: 0,
        files_skipped: Vec::new(),
        rows_read: 0,
        row_errors: Vec::new(),
        missing_metric: 0,
        filtered_minutes: 0,
        duplicates: 0,
    };
    let mut seen: HashSet<(String, Season)> = HashSet::new();

    for path in files {
        let name = file_label(path);
        let Some(season) = season_from_file_name(&name) else {
            skip(&mut merged, name, "file name is not YYYY_YYYY_advanced.csv".to_string());
            continue;
        };

        let mut reader = match csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
        {
            Ok(r) => r,
            Err(e) => {
                skip(&mut merged, name, format!("unreadable: {e}"));
                continue;
            }
        };
        let headers = match reader.headers() {
            Ok(h) => h.clone(),
            Err(e) => {
                skip(&mut merged, name, format!("unreadable header: {e}"));
                continue;
            }
        };
        let map = match ColumnMap::resolve(&headers) {
            Ok(m) => m,
            Err(missing) => {
                skip(&mut merged, name, format!("missing columns: {}", missing.join(", ")));
                continue;
            }
        };

        merged.files_read += 1;
        let era = era_label(season, &config.eras);

        for (idx, result) in reader.records().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            merged.rows_read += 1;

            let parsed = result
                .map_err(|e| format!("CSV parse error: {e}"))
                .and_then(|record| parse_row(&record, &map, season, &era));

            let row = match parsed {
                Ok(Some(row)) => row,
                Ok(None) => {
                    merged.missing_metric += 1;
                    continue;
                }
                Err(message) => {
                    log::debug!("{name}:{line}: {message}");
                    merged.row_errors.push(RowError {
                        file: name.clone(),
                        line,
                        message,
                    });
                    continue;
                }
            };

            if row.minutes < config.clean.min_minutes {
                merged.filtered_minutes += 1;
                continue;
            }
            if !seen.insert(row.key()) {
                merged.duplicates += 1;
                continue;
            }
            merged.rows.push(row);
        }
    }

    Ok(merged)
}

fn skip(merged: &mut MergedSeasons, file: String, reason: String) {
    log::warn!("[skip] {file}: {reason}");
    merged.files_skipped.push(SkippedFile { file, reason });
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_model_rows;
    use std::fs;

    fn write(layout: &DataLayout, name: &str, body: &str) {
        fs::create_dir_all(layout.raw_dir()).unwrap();
        fs::write(layout.raw_dir().join(name), body).unwrap();
    }

    fn config(min_minutes: f64) -> PipelineConfig {
        let mut c = PipelineConfig::default();
        c.clean.min_minutes = min_minutes;
        c
    }

    #[test]
    fn merges_dedups_and_labels_eras() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        write(
            &layout,
            "2014_2015_advanced.csv",
            "Rk,Player,Age,Tm,Pos,MP,BPM,player_id\n\
             1,Traded Guy,27,TOT,SG,2000,1.0,tradegu01\n\
             1,Traded Guy,27,AAA,SG,1200,1.2,tradegu01\n\
             1,Traded Guy,27,BBB,SG,800,0.7,tradegu01\n\
             2,Bench Guy,21,CCC,C,120,-4.0,benchgu01\n",
        );
        write(
            &layout,
            "2015_2016_advanced.csv",
            "\u{feff}Player,Age,Team,Pos,MP,BPM\n\
             Traded Guy,28,AAA,SG,2500,2.0\n\
             No Metric,25,AAA,PF,900,\n\
             Broken,xx,AAA,PF,900,1.0\n",
        );

        let report = clean_and_merge(&layout, &config(500.0)).unwrap();
        assert_eq!(report.files_read, 2);
        assert_eq!(report.rows_read, 7);
        assert_eq!(report.duplicates, 2);
        assert_eq!(report.filtered_minutes, 1);
        assert_eq!(report.missing_metric, 1);
        assert_eq!(report.row_errors.len(), 1);
        assert_eq!(report.row_errors[0].line, 4);
        assert_eq!(report.rows_written, 2);

        let rows = read_model_rows(&layout.for_model_path()).unwrap();
        assert_eq!(rows[0].minutes, 2000.0);
        assert_eq!(rows[0].era, "Pre-2015");
        assert_eq!(rows[1].season, 2015);
        assert_eq!(rows[1].era, "2015-2025");
    }

    #[test]
    fn bad_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        write(&layout, "2000_2001_advanced.csv", "Player,Age,MP\nA,22,900\n");
        write(&layout, "notes.csv", "Player,Age,Tm,Pos,MP,BPM\nA,22,X,C,900,1\n");
        write(&layout, "2001_2002_advanced.csv", "Player,Age,Tm,Pos,MP,BPM\nA,22,X,C,900,1\n");

        let report = clean_and_merge(&layout, &config(0.0)).unwrap();
        assert_eq!(report.files_read, 1);
        assert_eq!(report.files_skipped.len(), 2);
        assert_eq!(report.rows_written, 1);
    }

    #[test]
    fn no_raw_files_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = clean_and_merge(&DataLayout::new(dir.path()), &config(0.0)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
