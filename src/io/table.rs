//! Cleaned player-season and modeling tables.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{ModelRow, PlayerSeason};
use crate::error::AppError;

pub fn write_player_seasons(path: &Path, rows: &[PlayerSeason]) -> Result<(), AppError> {
    write_rows(path, rows, &PLAYER_SEASON_HEADERS)
}

pub fn write_model_rows(path: &Path, rows: &[ModelRow]) -> Result<(), AppError> {
    write_rows(path, rows, &MODEL_ROW_HEADERS)
}

pub fn read_player_seasons(path: &Path) -> Result<Vec<PlayerSeason>, AppError> {
    read_rows(path)
}

pub fn read_model_rows(path: &Path) -> Result<Vec<ModelRow>, AppError> {
    read_rows(path)
}

const PLAYER_SEASON_HEADERS: [&str; 9] = [
    "Player", "PlayerId", "Age", "Team", "Position", "Minutes", "BPM", "Season", "Era",
];
const MODEL_ROW_HEADERS: [&str; 7] = ["Player", "Age", "BPM", "Minutes", "Season", "Position", "Era"];

fn write_rows<T: Serialize>(path: &Path, rows: &[T], headers: &[&str]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;

    // Headers are written explicitly so an empty table still has a schema.
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer
        .write_record(headers)
        .map_err(|e| AppError::new(2, format!("Failed to write header to '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write row to '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut out = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let row: T = result.map_err(|e| {
            AppError::new(3, format!("Invalid row {} in '{}': {e}", idx + 2, path.display()))
        })?;
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlayerSeason {
        PlayerSeason {
            player: "Tim Duncan".to_string(),
            player_id: None,
            age: 25.0,
            team: "SAS".to_string(),
            position: "PF".to_string(),
            minutes: 3329.0,
            bpm: 6.5,
            season: 2001,
            era: "Pre-2015".to_string(),
        }
    }

    #[test]
    fn player_seasons_reload_with_missing_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ps.csv");
        write_player_seasons(&path, &[sample()]).unwrap();
        let back = read_player_seasons(&path).unwrap();
        assert_eq!(back, vec![sample()]);
    }

    #[test]
    fn empty_model_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        write_model_rows(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Player,Age,BPM,Minutes,Season,Position,Era\n");
        assert!(read_model_rows(&path).unwrap().is_empty());
    }
}
