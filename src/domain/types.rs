//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between stages in memory
//! - written to the CSV/JSON interchange files under `data/`
//! - reloaded by a later stage run as a separate process

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A season, identified by its start year (`2015` is the 2015-16 season).
pub type Season = i32;

/// Era label used for rows whose season falls outside every configured era.
pub const UNKNOWN_ERA: &str = "Unknown";

/// Label used for the pooled fit when era segmentation is disabled.
pub const POOLED_ERA: &str = "All";

/// Human-readable season label, e.g. `2015-16`.
pub fn season_label(season: Season) -> String {
    format!("{season}-{:02}", (season + 1).rem_euclid(100))
}

/// A named, inclusive range of season start years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraSpec {
    pub name: String,
    pub start: Season,
    pub end: Season,
}

impl EraSpec {
    pub fn new(name: impl Into<String>, start: Season, end: Season) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, season: Season) -> bool {
        self.start <= season && season <= self.end
    }
}

/// Name of the first era containing `season`, or [`UNKNOWN_ERA`].
pub fn era_label(season: Season, eras: &[EraSpec]) -> String {
    eras.iter()
        .find(|e| e.contains(season))
        .map(|e| e.name.clone())
        .unwrap_or_else(|| UNKNOWN_ERA.to_string())
}

/// Where raw season tables come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Basketball-Reference advanced stats pages.
    Bbr,
    /// Seeded synthetic league with a known aging curve.
    Synthetic,
}

/// One scraped season: headers plus string cells, exactly as retrieved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub season: Season,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// File name used under `data/raw`, e.g. `2015_2016_advanced.csv`.
    pub fn file_name(season: Season) -> String {
        format!("{}_{}_advanced.csv", season, season + 1)
    }
}

/// A cleaned player-season observation (row of `player_seasons.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeason {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "PlayerId")]
    pub player_id: Option<String>,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Minutes")]
    pub minutes: f64,
    #[serde(rename = "BPM")]
    pub bpm: f64,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Era")]
    pub era: String,
}

impl PlayerSeason {
    /// Merge key: player id when known, otherwise the case-folded name.
    pub fn key(&self) -> (String, Season) {
        let player = match &self.player_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => self.player.to_lowercase(),
        };
        (player, self.season)
    }
}

/// Minimal modeling row (row of `for_model.csv`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRow {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "BPM")]
    pub bpm: f64,
    #[serde(rename = "Minutes")]
    pub minutes: f64,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Era")]
    pub era: String,
}

impl From<&PlayerSeason> for ModelRow {
    fn from(p: &PlayerSeason) -> Self {
        Self {
            player: p.player.clone(),
            age: p.age,
            bpm: p.bpm,
            minutes: p.minutes,
            season: p.season,
            position: p.position.clone(),
            era: p.era.clone(),
        }
    }
}

/// Fit diagnostics for one smoothing fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub n: usize,
    pub lambda: f64,
    /// Effective degrees of freedom (trace of the hat matrix).
    pub edf: f64,
    pub gcv: f64,
    pub rmse: f64,
}

/// An evaluated curve: prediction plus confidence band on an age grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub age: Vec<f64>,
    pub fit: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl CurveGrid {
    pub fn len(&self) -> usize {
        self.age.len()
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }

    /// Grid point with the highest prediction (first one on ties).
    pub fn peak(&self) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for (&a, &y) in self.age.iter().zip(self.fit.iter()) {
            if !y.is_finite() {
                continue;
            }
            match best {
                Some((_, by)) if y <= by => {}
                _ => best = Some((a, y)),
            }
        }
        best
    }
}

/// One era's fitted aging curve as persisted between the model and plot stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraCurve {
    pub era: String,
    pub peak_age: f64,
    pub peak_bpm: f64,
    pub quality: FitQuality,
    pub grid: CurveGrid,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub metric: String,
    /// Normal quantile used for the band half-width.
    pub band_z: f64,
    pub curves: Vec<EraCurve>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn era_label_picks_first_containing_era() {
        let eras = vec![
            EraSpec::new("Pre-2015", 1990, 2014),
            EraSpec::new("2015-2025", 2015, 2025),
        ];
        assert_eq!(era_label(2014, &eras), "Pre-2015");
        assert_eq!(era_label(2015, &eras), "2015-2025");
        assert_eq!(era_label(1980, &eras), UNKNOWN_ERA);
    }

    #[test]
    fn season_label_wraps_century() {
        assert_eq!(season_label(1999), "1999-00");
        assert_eq!(season_label(2015), "2015-16");
    }

    #[test]
    fn key_prefers_player_id() {
        let mut row = PlayerSeason {
            player: "LeBron James".to_string(),
            player_id: Some("jamesle01".to_string()),
            age: 30.0,
            team: "CLE".to_string(),
            position: "SF".to_string(),
            minutes: 2500.0,
            bpm: 8.0,
            season: 2014,
            era: "Pre-2015".to_string(),
        };
        assert_eq!(row.key(), ("jamesle01".to_string(), 2014));
        row.player_id = None;
        assert_eq!(row.key(), ("lebron james".to_string(), 2014));
    }

    #[test]
    fn peak_takes_first_maximum() {
        let grid = CurveGrid {
            age: vec![20.0, 25.0, 30.0],
            fit: vec![1.0, 3.0, 3.0],
            lower: vec![0.0; 3],
            upper: vec![0.0; 3],
        };
        assert_eq!(grid.peak(), Some((25.0, 3.0)));
    }
}
