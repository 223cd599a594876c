//! Seeded synthetic league for offline runs.
//!
//! Each season is generated independently from `(seed, season)`, so a single
//! season can be regenerated without replaying the others. BPM follows
//!
//! ```text
//! bpm(age) = peak_bpm - curvature · (age - peak_age)² + N(0, noise_sd²)
//! ```
//!
//! The table mimics the scraped layout, including multi-team players listed
//! as a `TOT` row followed by one row per team.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::config::SyntheticConfig;
use crate::data::SeasonSource;
use crate::domain::{RawTable, Season};
use crate::error::AppError;

const HEADERS: [&str; 10] = [
    "Rk", "Player", "player_id", "Age", "Birth Year", "Tm", "Pos", "G", "MP", "BPM",
];
const POSITIONS: [&str; 5] = ["PG", "SG", "SF", "PF", "C"];
const TEAMS: usize = 30;
const MIN_AGE: i32 = 19;
const MAX_AGE: i32 = 38;
/// Share of players traded mid-season.
const TRADE_RATE: f64 = 0.05;
/// BPM is not reported below this many minutes.
const BPM_MIN_MINUTES: f64 = 100.0;

pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Noise-free BPM at `age`.
    pub fn expected_bpm(&self, age: f64) -> f64 {
        self.config.peak_bpm - self.config.curvature * (age - self.config.peak_age).powi(2)
    }
}

impl SeasonSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_season(&self, season: Season) -> Result<RawTable, AppError> {
        let mut rng = StdRng::seed_from_u64(season_seed(self.config.seed, season));
        let noise = Normal::new(0.0, self.config.noise_sd)
            .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

        let mut rows = Vec::with_capacity(self.config.players_per_season + 16);
        for i in 0..self.config.players_per_season {
            let age = rng.gen_range(MIN_AGE..=MAX_AGE);
            let minutes = rng.gen_range(50.0f64..3000.0).round();
            let bpm = self.expected_bpm(age as f64) + noise.sample(&mut rng);
            let position = POSITIONS[rng.gen_range(0..POSITIONS.len())];

            let player = Player {
                name: format!("Player {season}-{i:04}"),
                id: format!("syn{season}{i:04}"),
                age,
                birth_year: season - age,
                position,
            };

            if rng.gen_bool(TRADE_RATE) {
                let first = rng.gen_range(0..TEAMS);
                let second = (first + rng.gen_range(1..TEAMS)) % TEAMS;
                let share = rng.gen_range(0.2..0.8);
                let split = (minutes * share).round();

                rows.push(player.row(rows.len() + 1, "TOT".to_string(), minutes, bpm));
                rows.push(player.row(rows.len() + 1, team_code(first), split, bpm));
                rows.push(player.row(rows.len() + 1, team_code(second), minutes - split, bpm));
            } else {
                let team = team_code(rng.gen_range(0..TEAMS));
                rows.push(player.row(rows.len() + 1, team, minutes, bpm));
            }
        }

        Ok(RawTable {
            season,
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        })
    }
}

struct Player {
    name: String,
    id: String,
    age: i32,
    birth_year: i32,
    position: &'static str,
}

impl Player {
    fn row(&self, rank: usize, team: String, minutes: f64, bpm: f64) -> Vec<String> {
        let games = (minutes / 30.0).ceil().clamp(1.0, 82.0);
        let bpm = if minutes < BPM_MIN_MINUTES {
            String::new()
        } else {
            format!("{bpm:.1}")
        };
        vec![
            rank.to_string(),
            self.name.clone(),
            self.id.clone(),
            self.age.to_string(),
            self.birth_year.to_string(),
            team,
            self.position.to_string(),
            format!("{games}"),
            format!("{minutes}"),
            bpm,
        ]
    }
}

fn team_code(i: usize) -> String {
    format!("T{:02}", i + 1)
}

/// Mix the base seed with the season (splitmix64 finalizer).
fn season_seed(seed: u64, season: Season) -> u64 {
    let mut z = seed ^ (season as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SyntheticSource {
        SyntheticSource::new(SyntheticConfig::default())
    }

    #[test]
    fn same_seed_same_table() {
        let a = source().fetch_season(2010).unwrap();
        let b = source().fetch_season(2010).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.rows, source().fetch_season(2011).unwrap().rows);
    }

    #[test]
    fn birth_year_matches_age() {
        let table = source().fetch_season(2005).unwrap();
        assert_eq!(table.headers, HEADERS);
        assert!(table.len() >= 450);
        for row in &table.rows {
            let age: i32 = row[3].parse().unwrap();
            let birth: i32 = row[4].parse().unwrap();
            assert_eq!(2005 - birth, age);
        }
    }

    #[test]
    fn traded_players_list_total_first() {
        let table = source().fetch_season(2015).unwrap();
        let tot = table.rows.iter().position(|r| r[5] == "TOT").unwrap();
        let id = &table.rows[tot][2];
        assert_eq!(&table.rows[tot + 1][2], id);
        assert_eq!(&table.rows[tot + 2][2], id);
        let total: f64 = table.rows[tot][8].parse().unwrap();
        let parts: f64 = table.rows[tot + 1][8].parse::<f64>().unwrap()
            + table.rows[tot + 2][8].parse::<f64>().unwrap();
        assert_eq!(total, parts);
    }

    #[test]
    fn expected_curve_peaks_at_configured_age() {
        let s = source();
        assert_eq!(s.expected_bpm(27.0), 1.5);
        assert!(s.expected_bpm(22.0) < s.expected_bpm(27.0));
        assert!(s.expected_bpm(34.0) < s.expected_bpm(27.0));
        assert_eq!(s.request_delay(), std::time::Duration::ZERO);
    }
}
