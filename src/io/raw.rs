//! Raw per-season CSV tables under `data/raw`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::domain::{RawTable, Season};
use crate::error::AppError;

const RAW_SUFFIX: &str = "_advanced.csv";

/// Write a raw table as CSV (headers first).
pub fn write_raw_table(path: &Path, table: &RawTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create raw CSV '{}': {e}", path.display())))?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

    writer
        .write_record(&table.headers)
        .map_err(|e| AppError::new(2, format!("Failed to write raw CSV header: {e}")))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::new(2, format!("Failed to write raw CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush raw CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Season start year encoded in a raw file name like `1990_1991_advanced.csv`.
pub fn season_from_file_name(name: &str) -> Option<Season> {
    let stem = name.strip_suffix(RAW_SUFFIX)?;
    let (start, end) = stem.split_once('_')?;
    if start.len() != 4 || end.len() != 4 {
        return None;
    }
    if !(start.bytes().all(|b| b.is_ascii_digit()) && end.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    start.parse().ok()
}

/// All `*.csv` files in `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_raw_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_is_read_from_file_name() {
        assert_eq!(season_from_file_name("1990_1991_advanced.csv"), Some(1990));
        assert_eq!(season_from_file_name("2015_2016_advanced.csv"), Some(2015));
        assert_eq!(season_from_file_name("2015_advanced.csv"), None);
        assert_eq!(season_from_file_name("abcd_2016_advanced.csv"), None);
        assert_eq!(season_from_file_name("2015_2016_totals.csv"), None);
    }

    #[test]
    fn write_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let table = RawTable {
            season: 2001,
            headers: vec!["Player".into(), "BPM".into()],
            rows: vec![vec!["A, Jr.".into(), "1.5".into()]],
        };
        let path = dir.path().join(RawTable::file_name(2001));
        write_raw_table(&path, &table).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = list_raw_files(dir.path()).unwrap();
        assert_eq!(files, vec![path.clone()]);
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "Player,BPM\n\"A, Jr.\",1.5\n");
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_raw_files(&dir.path().join("absent")).unwrap().is_empty());
    }
}
