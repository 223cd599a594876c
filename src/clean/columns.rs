//! Header normalization for raw season files.
//!
//! Different exports label the same data differently (`Tm` vs `Team`, a BOM
//! on the first header, extra birth columns). Headers are mapped onto a small
//! canonical set and resolved to column indices once per file.

use std::collections::HashMap;

use csv::StringRecord;

pub const PLAYER: &str = "Player";
pub const PLAYER_ID: &str = "PlayerId";
pub const AGE: &str = "Age";
pub const BIRTH_DATE: &str = "BirthDate";
pub const BIRTH_YEAR: &str = "BirthYear";
pub const TEAM: &str = "Team";
pub const POSITION: &str = "Position";
pub const MINUTES: &str = "Minutes";
pub const BPM: &str = "BPM";

/// Canonical name for a raw header.
pub fn canonical_header(raw: &str) -> String {
    let name = raw.trim().trim_start_matches('\u{feff}').trim();
    let canonical = match name {
        "Tm" | "Team" => TEAM,
        "Pos" | "Position" => POSITION,
        "MP" | "Minutes" => MINUTES,
        "Birth Date" | "birth_date" | "BirthDate" => BIRTH_DATE,
        "Birth Year" | "birth_year" | "BirthYear" => BIRTH_YEAR,
        "player_id" | "PlayerId" | "Player-additional" | "player-additional" => PLAYER_ID,
        other => other,
    };
    canonical.to_string()
}

/// Column indices for one raw file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub player: usize,
    pub player_id: Option<usize>,
    pub age: Option<usize>,
    pub birth_date: Option<usize>,
    pub birth_year: Option<usize>,
    pub team: usize,
    pub position: usize,
    pub minutes: usize,
    pub bpm: usize,
}

impl ColumnMap {
    /// Resolve required and optional columns.
    ///
    /// On failure returns the canonical names of the missing columns.
    pub fn resolve(headers: &StringRecord) -> Result<Self, Vec<String>> {
        let mut index: HashMap<String, usize> = HashMap::new();
        for (idx, raw) in headers.iter().enumerate() {
            // First occurrence wins.
            index.entry(canonical_header(raw)).or_insert(idx);
        }

        let mut missing = Vec::new();
        let mut required = |name: &str| match index.get(name) {
            Some(&i) => i,
            None => {
                missing.push(name.to_string());
                usize::MAX
            }
        };

        let player = required(PLAYER);
        let team = required(TEAM);
        let position = required(POSITION);
        let minutes = required(MINUTES);
        let bpm = required(BPM);

        let age = index.get(AGE).copied();
        let birth_date = index.get(BIRTH_DATE).copied();
        let birth_year = index.get(BIRTH_YEAR).copied();
        if age.is_none() && birth_date.is_none() && birth_year.is_none() {
            missing.push(format!("{AGE} (or {BIRTH_DATE}/{BIRTH_YEAR})"));
        }

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(Self {
            player,
            player_id: index.get(PLAYER_ID).copied(),
            age,
            birth_date,
            birth_year,
            team,
            position,
            minutes,
            bpm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_header_variants() {
        assert_eq!(canonical_header(" Tm "), "Team");
        assert_eq!(canonical_header("\u{feff}Player"), "Player");
        assert_eq!(canonical_header("MP"), "Minutes");
        assert_eq!(canonical_header("Birth Year"), "BirthYear");
        assert_eq!(canonical_header("player-additional"), "PlayerId");
        assert_eq!(canonical_header("WS/48"), "WS/48");
    }

    #[test]
    fn resolves_scraped_layout() {
        let headers = StringRecord::from(vec![
            "Rk", "Player", "Age", "Tm", "Pos", "G", "MP", "BPM", "player_id",
        ]);
        let map = ColumnMap::resolve(&headers).unwrap();
        assert_eq!(map.player, 1);
        assert_eq!(map.age, Some(2));
        assert_eq!(map.team, 3);
        assert_eq!(map.minutes, 6);
        assert_eq!(map.player_id, Some(8));
        assert_eq!(map.birth_year, None);
    }

    #[test]
    fn birth_year_can_stand_in_for_age() {
        let headers = StringRecord::from(vec!["Player", "Birth Year", "Team", "Pos", "MP", "BPM"]);
        let map = ColumnMap::resolve(&headers).unwrap();
        assert_eq!(map.age, None);
        assert_eq!(map.birth_year, Some(1));
    }

    #[test]
    fn reports_every_missing_column() {
        let headers = StringRecord::from(vec!["Player", "Tm", "MP"]);
        let missing = ColumnMap::resolve(&headers).unwrap_err();
        assert_eq!(missing.len(), 3);
        assert!(missing.contains(&"Position".to_string()));
        assert!(missing.contains(&"BPM".to_string()));
        assert!(missing[2].starts_with("Age"));
    }
}
