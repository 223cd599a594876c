//! Per-row coercion of raw season records.

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;

use crate::clean::columns::ColumnMap;
use crate::domain::{PlayerSeason, Season};

const BIRTH_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%B %d, %Y", "%m/%d/%Y"];

/// Plausible ages for an NBA season; anything outside is a malformed row.
pub const MIN_AGE: f64 = 15.0;
pub const MAX_AGE: f64 = 50.0;

/// Parse one record.
///
/// - `Ok(Some(_))`: usable row
/// - `Ok(None)`: a required value is blank (missing, not malformed)
/// - `Err(_)`: malformed row
pub fn parse_row(
    record: &StringRecord,
    map: &ColumnMap,
    season: Season,
    era: &str,
) -> Result<Option<PlayerSeason>, String> {
    let player = cell(record, map.player).trim_end_matches('*').trim();
    if player.is_empty() {
        return Err("empty player name".to_string());
    }

    let minutes = parse_number(record, map.minutes, "Minutes")?;
    let bpm = parse_number(record, map.bpm, "BPM")?;
    let age = age_for(record, map, season)?;

    let team = cell(record, map.team);
    let position = cell(record, map.position);

    let (Some(minutes), Some(bpm), Some(age)) = (minutes, bpm, age) else {
        return Ok(None);
    };
    if team.is_empty() || position.is_empty() {
        return Ok(None);
    }

    let player_id = map
        .player_id
        .map(|i| cell(record, i))
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Ok(Some(PlayerSeason {
        player: player.to_string(),
        player_id,
        age,
        team: team.to_string(),
        position: position.to_string(),
        minutes,
        bpm,
        season,
        era: era.to_string(),
    }))
}

/// Age at the season: derived from birth data when the row has it,
/// otherwise the `Age` column.
fn age_for(record: &StringRecord, map: &ColumnMap, season: Season) -> Result<Option<f64>, String> {
    if let Some((column, raw, year)) = birth_year(record, map)? {
        let age = f64::from(season) - year;
        if !plausible_age(age) {
            return Err(format!("invalid {column} '{raw}' (age {age} in {season})"));
        }
        return Ok(Some(age));
    }
    let Some(i) = map.age else {
        return Ok(None);
    };
    match parse_number(record, i, "Age")? {
        Some(age) if !plausible_age(age) => Err(format!("invalid Age '{}'", cell(record, i))),
        age => Ok(age),
    }
}

fn plausible_age(age: f64) -> bool {
    (MIN_AGE..=MAX_AGE).contains(&age)
}

/// Birth year from whichever birth column is filled, with the column name
/// and raw text for error messages.
fn birth_year<'r>(
    record: &'r StringRecord,
    map: &ColumnMap,
) -> Result<Option<(&'static str, &'r str, f64)>, String> {
    if let Some(i) = map.birth_year {
        let raw = cell(record, i);
        if !raw.is_empty() {
            let year = raw
                .parse::<f64>()
                .ok()
                .filter(|y| y.is_finite() && y.fract() == 0.0)
                .ok_or_else(|| format!("invalid BirthYear '{raw}'"))?;
            return Ok(Some(("BirthYear", raw, year)));
        }
    }
    if let Some(i) = map.birth_date {
        let raw = cell(record, i);
        if !raw.is_empty() {
            let date = parse_birth_date(raw).ok_or_else(|| format!("invalid BirthDate '{raw}'"))?;
            return Ok(Some(("BirthDate", raw, f64::from(date.year()))));
        }
    }
    Ok(None)
}

pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    BIRTH_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

fn parse_number(record: &StringRecord, idx: usize, name: &str) -> Result<Option<f64>, String> {
    let raw = cell(record, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("invalid {name} '{raw}'")),
    }
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(headers: &[&str]) -> ColumnMap {
        ColumnMap::resolve(&StringRecord::from(headers.to_vec())).unwrap()
    }

    #[test]
    fn parses_scraped_row() {
        let m = map(&["Player", "Age", "Tm", "Pos", "MP", "BPM", "player_id"]);
        let rec = StringRecord::from(vec!["Reggie Miller*", "25", "IND", "SG", "2800", "4.1", "millere01"]);
        let row = parse_row(&rec, &m, 1990, "Pre-2015").unwrap().unwrap();
        assert_eq!(row.player, "Reggie Miller");
        assert_eq!(row.player_id.as_deref(), Some("millere01"));
        assert_eq!(row.age, 25.0);
        assert_eq!(row.era, "Pre-2015");
    }

    #[test]
    fn birth_data_overrides_age_column() {
        let m = map(&["Player", "Age", "Birth Year", "Tm", "Pos", "MP", "BPM"]);
        let rec = StringRecord::from(vec!["A", "30", "1980", "BOS", "C", "1000", "0.5"]);
        let row = parse_row(&rec, &m, 2005, "x").unwrap().unwrap();
        assert_eq!(row.age, 25.0);

        let m = map(&["Player", "Birth Date", "Tm", "Pos", "MP", "BPM"]);
        let rec = StringRecord::from(vec!["B", "June 5, 1990", "BOS", "C", "1000", "0.5"]);
        assert_eq!(parse_row(&rec, &m, 2015, "x").unwrap().unwrap().age, 25.0);
    }

    #[test]
    fn blank_birth_falls_back_to_age() {
        let m = map(&["Player", "Age", "Birth Year", "Tm", "Pos", "MP", "BPM"]);
        let rec = StringRecord::from(vec!["A", "31", "", "BOS", "C", "1000", "0.5"]);
        assert_eq!(parse_row(&rec, &m, 2005, "x").unwrap().unwrap().age, 31.0);
    }

    #[test]
    fn blanks_are_missing_and_garbage_is_an_error() {
        let m = map(&["Player", "Age", "Tm", "Pos", "MP", "BPM"]);
        let blank_bpm = StringRecord::from(vec!["A", "22", "BOS", "C", "40", ""]);
        assert_eq!(parse_row(&blank_bpm, &m, 2000, "x").unwrap(), None);

        let bad = StringRecord::from(vec!["A", "22", "BOS", "C", "lots", "1.0"]);
        assert_eq!(parse_row(&bad, &m, 2000, "x").unwrap_err(), "invalid Minutes 'lots'");

        let unnamed = StringRecord::from(vec!["", "22", "BOS", "C", "100", "1.0"]);
        assert!(parse_row(&unnamed, &m, 2000, "x").is_err());
    }

    #[test]
    fn out_of_range_birth_year_is_a_row_error() {
        let m = map(&["Player", "Birth Year", "Tm", "Pos", "MP", "BPM"]);
        for year in ["-1e10", "1e300", "2990", "1900"] {
            let rec = StringRecord::from(vec!["A", year, "BOS", "C", "1000", "0.5"]);
            let err = parse_row(&rec, &m, 2005, "x").unwrap_err();
            assert!(err.starts_with("invalid BirthYear"), "{year}: {err}");
        }

        let m = map(&["Player", "Birth Date", "Tm", "Pos", "MP", "BPM"]);
        let rec = StringRecord::from(vec!["B", "2010-01-01", "BOS", "C", "1000", "0.5"]);
        assert!(parse_row(&rec, &m, 2005, "x").unwrap_err().starts_with("invalid BirthDate"));
    }

    #[test]
    fn implausible_age_column_is_a_row_error() {
        let m = map(&["Player", "Age", "Tm", "Pos", "MP", "BPM"]);
        for age in ["-7", "0", "99"] {
            let rec = StringRecord::from(vec!["A", age, "BOS", "C", "1000", "0.5"]);
            assert_eq!(parse_row(&rec, &m, 2005, "x").unwrap_err(), format!("invalid Age '{age}'"));
        }
        let edge = StringRecord::from(vec!["A", "19", "BOS", "C", "1000", "0.5"]);
        assert_eq!(parse_row(&edge, &m, 2005, "x").unwrap().unwrap().age, 19.0);
    }

    #[test]
    fn birth_date_formats() {
        let d = NaiveDate::from_ymd_opt(1984, 12, 30).unwrap();
        assert_eq!(parse_birth_date("1984-12-30"), Some(d));
        assert_eq!(parse_birth_date("December 30, 1984"), Some(d));
        assert_eq!(parse_birth_date("12/30/1984"), Some(d));
        assert_eq!(parse_birth_date("30.12.1984"), None);
    }
}
