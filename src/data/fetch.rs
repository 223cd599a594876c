//! Fetch stage: one raw CSV per configured season.

use std::path::PathBuf;

use crate::data::SeasonSource;
use crate::domain::{Season, season_label};
use crate::error::AppError;
use crate::io::{DataLayout, ensure_dir, write_raw_table};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Written { rows: usize, path: PathBuf },
    SkippedExisting { path: PathBuf },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonFetch {
    pub season: Season,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub source: String,
    pub seasons: Vec<SeasonFetch>,
}

impl FetchReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::SkippedExisting { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.seasons.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Fetch every season in order, recording exactly one outcome per season.
///
/// Source failures and write failures for a single season are recorded and
/// the loop moves on; only an unusable output directory aborts the stage.
pub fn fetch_all(
    seasons: &[Season],
    source: &dyn SeasonSource,
    layout: &DataLayout,
    force: bool,
) -> Result<FetchReport, AppError> {
    ensure_dir(&layout.raw_dir())?;

    let mut out = Vec::with_capacity(seasons.len());
    let mut requested = false;

    for &season in seasons {
        let path = layout.raw_path(season);
        if path.exists() && !force {
            log::info!("[skip] {} already present", path.display());
            out.push(SeasonFetch {
                season,
                outcome: FetchOutcome::SkippedExisting { path },
            });
            continue;
        }

        let delay = source.request_delay();
        if requested && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        requested = true;

        let outcome = match source
            .fetch_season(season)
            .and_then(|table| write_raw_table(&path, &table).map(|_| table.len()))
        {
            Ok(rows) => {
                log::info!("[ok] {} rows={rows}", path.display());
                FetchOutcome::Written { rows, path }
            }
            Err(e) => {
                log::warn!("[err] {}: {}", season_label(season), e);
                FetchOutcome::Failed(e.message().to_string())
            }
        };
        out.push(SeasonFetch { season, outcome });
    }

    Ok(FetchReport {
        source: source.name().to_string(),
        seasons: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawTable;

    /// Fails on odd seasons.
    struct FlakySource;

    impl SeasonSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch_season(&self, season: Season) -> Result<RawTable, AppError> {
            if season % 2 == 1 {
                return Err(AppError::new(4, format!("HTTP 429 for {season}")));
            }
            Ok(RawTable {
                season,
                headers: vec!["Player".into(), "BPM".into()],
                rows: vec![vec!["A".into(), "1.0".into()]],
            })
        }
    }

    #[test]
    fn every_season_gets_exactly_one_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let seasons = vec![2000, 2001, 2002, 2003];

        let report = fetch_all(&seasons, &FlakySource, &layout, false).unwrap();
        assert_eq!(report.seasons.len(), 4);
        assert_eq!(report.written(), 2);
        assert_eq!(report.failed(), 2);
        assert!(layout.raw_path(2000).exists());
        assert!(!layout.raw_path(2001).exists());
        assert_eq!(
            report.seasons[1].outcome,
            FetchOutcome::Failed("HTTP 429 for 2001".to_string())
        );
    }

    #[test]
    fn existing_files_are_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());

        fetch_all(&[2000], &FlakySource, &layout, false).unwrap();
        let again = fetch_all(&[2000], &FlakySource, &layout, false).unwrap();
        assert_eq!(again.skipped(), 1);

        let forced = fetch_all(&[2000], &FlakySource, &layout, true).unwrap();
        assert_eq!(forced.written(), 1);
    }
}
