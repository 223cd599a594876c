//! Pipeline configuration.
//!
//! Settings come from a YAML file (`config/config.yaml` under the data root by
//! default) with every key optional. A few values can be overridden from the
//! environment, which `app::run` populates from `.env` via `dotenvy`:
//!
//! - `BPM_CONFIG`: config file path
//! - `BPM_DATA_ROOT`: root of the `data/` and `reports/` tree
//! - `BPM_USER_AGENT`: user agent sent by the fetch stage

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{EraSpec, Season, SourceKind};
use crate::error::AppError;

pub const CONFIG_ENV: &str = "BPM_CONFIG";
pub const DATA_ROOT_ENV: &str = "BPM_DATA_ROOT";
pub const USER_AGENT_ENV: &str = "BPM_USER_AGENT";

/// Longest pause allowed between remote requests.
pub const MAX_REQUEST_DELAY_SECS: f64 = 3600.0;

/// Config file location relative to the data root.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub seasons: SeasonRange,
    pub eras: Vec<EraSpec>,
    pub source: SourceKind,
    pub fetch: FetchConfig,
    pub synthetic: SyntheticConfig,
    pub clean: CleanConfig,
    pub model: ModelConfig,
    pub plot: PlotConfig,
}

/// `start` is the first season's start year, `end` the last season's end year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRange {
    pub start: Season,
    pub end: Season,
}

impl SeasonRange {
    /// Start years of every configured season.
    pub fn seasons(&self) -> Vec<Season> {
        (self.start..self.end).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Pause between remote requests (seconds).
    pub request_delay_secs: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub players_per_season: usize,
    /// Age at which the generated BPM curve peaks.
    pub peak_age: f64,
    pub peak_bpm: f64,
    /// Quadratic decline per squared year away from the peak.
    pub curvature: f64,
    pub noise_sd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanConfig {
    /// Rows with fewer minutes played are filtered out.
    pub min_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Fit one curve per era (true) or a single pooled curve.
    pub segment_by_era: bool,
    /// Eras with fewer rows are skipped.
    pub min_rows: usize,
    pub n_splines: usize,
    pub spline_degree: usize,
    pub penalty_order: usize,
    /// Fixed smoothing parameter; when absent, chosen by GCV over the grid below.
    pub lambda: Option<f64>,
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub lambda_steps: usize,
    pub weight_by_minutes: bool,
    pub grid_points: usize,
    pub band_z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub ascii_width: usize,
    pub ascii_height: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seasons: SeasonRange {
                start: 1990,
                end: 2025,
            },
            eras: vec![
                EraSpec::new("Pre-2015", 1990, 2014),
                EraSpec::new("2015-2025", 2015, 2025),
            ],
            source: SourceKind::Bbr,
            fetch: FetchConfig::default(),
            synthetic: SyntheticConfig::default(),
            clean: CleanConfig::default(),
            model: ModelConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.basketball-reference.com".to_string(),
            user_agent: concat!("bpm-aging/", env!("CARGO_PKG_VERSION")).to_string(),
            request_delay_secs: 3.0,
            timeout_secs: 30,
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            players_per_season: 450,
            peak_age: 27.0,
            peak_bpm: 1.5,
            curvature: 0.06,
            noise_sd: 2.0,
        }
    }
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self { min_minutes: 500.0 }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            segment_by_era: true,
            min_rows: 200,
            n_splines: 20,
            spline_degree: 3,
            penalty_order: 2,
            lambda: None,
            lambda_min: 1e-3,
            lambda_max: 1e4,
            lambda_steps: 29,
            weight_by_minutes: false,
            grid_points: 200,
            band_z: 1.96,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 650,
            ascii_width: 80,
            ascii_height: 20,
        }
    }
}

impl PipelineConfig {
    /// Load configuration.
    ///
    /// Resolution order: explicit `path`, then `$BPM_CONFIG`, then
    /// `<root>/config/config.yaml`. Only the implicit default path may be
    /// absent, in which case built-in defaults are used.
    pub fn load(path: Option<&Path>, root: &Path) -> Result<Self, AppError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(p) => Self::from_file(&p)?,
            None => {
                let default_path = root.join(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    log::info!(
                        "no config at {}, using built-in defaults",
                        default_path.display()
                    );
                    Self::default()
                }
            }
        };

        if let Ok(agent) = std::env::var(USER_AGENT_ENV) {
            if !agent.trim().is_empty() {
                config.fetch.user_agent = agent;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new(2, format!("Failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_yaml(&text)
            .map_err(|e| AppError::new(2, format!("Invalid config '{}': {e}", path.display())))
    }

    pub fn from_yaml(text: &str) -> Result<Self, AppError> {
        // An empty document means "all defaults".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut doc: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| AppError::new(2, e.to_string()))?;
        lift_legacy_keys(&mut doc)?;
        serde_yaml::from_value(doc).map_err(|e| AppError::new(2, e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.seasons.end <= self.seasons.start {
            return Err(AppError::new(
                2,
                format!(
                    "Invalid season range: start={} end={} (end is the last season's end year).",
                    self.seasons.start, self.seasons.end
                ),
            ));
        }
        for era in &self.eras {
            if era.name.trim().is_empty() {
                return Err(AppError::new(2, "Era names must not be empty."));
            }
            if era.end < era.start {
                return Err(AppError::new(
                    2,
                    format!("Era '{}' ends before it starts.", era.name),
                ));
            }
        }
        if !(0.0..=MAX_REQUEST_DELAY_SECS).contains(&self.fetch.request_delay_secs) {
            return Err(AppError::new(
                2,
                format!("fetch.request_delay_secs must be between 0 and {MAX_REQUEST_DELAY_SECS}."),
            ));
        }
        if self.synthetic.players_per_season == 0 {
            return Err(AppError::new(2, "synthetic.players_per_season must be > 0."));
        }
        if !(self.synthetic.noise_sd.is_finite() && self.synthetic.noise_sd >= 0.0) {
            return Err(AppError::new(2, "synthetic.noise_sd must be >= 0."));
        }
        if !self.clean.min_minutes.is_finite() {
            return Err(AppError::new(2, "clean.min_minutes must be finite."));
        }
        self.model.validate()
    }
}

/// Older config files keep `min_minutes` at the top level; move it under
/// `clean:`.
fn lift_legacy_keys(doc: &mut serde_yaml::Value) -> Result<(), AppError> {
    let Some(root) = doc.as_mapping_mut() else {
        return Ok(());
    };
    let Some(min_minutes) = root.remove(LEGACY_MIN_MINUTES) else {
        return Ok(());
    };

    let clean = root
        .entry(serde_yaml::Value::from("clean"))
        .or_insert(serde_yaml::Value::Null);
    if clean.is_null() {
        *clean = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
    }
    let Some(clean) = clean.as_mapping_mut() else {
        return Err(AppError::new(2, "clean must be a mapping."));
    };
    if clean.contains_key(LEGACY_MIN_MINUTES) {
        return Err(AppError::new(
            2,
            "min_minutes is set both at the top level and under clean; keep only clean.min_minutes.",
        ));
    }
    log::warn!("top-level min_minutes is deprecated; move it under clean:");
    clean.insert(serde_yaml::Value::from(LEGACY_MIN_MINUTES), min_minutes);
    Ok(())
}

const LEGACY_MIN_MINUTES: &str = "min_minutes";

impl ModelConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.spline_degree == 0 {
            return Err(AppError::new(2, "model.spline_degree must be >= 1."));
        }
        if self.n_splines < self.spline_degree + 2 {
            return Err(AppError::new(
                2,
                format!(
                    "model.n_splines must be >= spline_degree + 2 (got {} for degree {}).",
                    self.n_splines, self.spline_degree
                ),
            ));
        }
        if self.penalty_order >= self.n_splines {
            return Err(AppError::new(2, "model.penalty_order must be < n_splines."));
        }
        if let Some(lambda) = self.lambda {
            if !(lambda.is_finite() && lambda > 0.0) {
                return Err(AppError::new(2, "model.lambda must be finite and > 0."));
            }
        }
        if self.grid_points < 2 {
            return Err(AppError::new(2, "model.grid_points must be >= 2."));
        }
        if !(self.band_z.is_finite() && self.band_z > 0.0) {
            return Err(AppError::new(2, "model.band_z must be finite and > 0."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_style_config() {
        let yaml = r#"
seasons:
  start: 1990
  end: 2025
clean:
  min_minutes: 500
eras:
  - name: Pre-2015
    start: 1990
    end: 2014
  - name: "2015-2025"
    start: 2015
    end: 2025
"#;
        let cfg = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.seasons.seasons().len(), 35);
        assert_eq!(cfg.eras[1].name, "2015-2025");
        assert_eq!(cfg.model.n_splines, 20);
        cfg.validate().unwrap();
    }

    #[test]
    fn top_level_min_minutes_is_moved_under_clean() {
        let cfg = PipelineConfig::from_yaml("min_minutes: 0\nseasons: {start: 2000, end: 2004}\n").unwrap();
        assert_eq!(cfg.clean.min_minutes, 0.0);
        assert_eq!(cfg.seasons.start, 2000);

        let both = "min_minutes: 0\nclean:\n  min_minutes: 300\n";
        assert_eq!(PipelineConfig::from_yaml(both).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn empty_document_is_defaults() {
        let cfg = PipelineConfig::from_yaml("  \n").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineConfig::from_yaml("seasonz: {start: 1, end: 2}\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn validate_rejects_inverted_season_range() {
        let mut cfg = PipelineConfig::default();
        cfg.seasons = SeasonRange {
            start: 2020,
            end: 2020,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_bounds_request_delay() {
        let mut cfg = PipelineConfig::default();
        for bad in [-1.0, 1e30, f64::NAN, f64::INFINITY] {
            cfg.fetch.request_delay_secs = bad;
            assert_eq!(cfg.validate().unwrap_err().exit_code(), 2, "{bad}");
        }
        cfg.fetch.request_delay_secs = 0.0;
        cfg.validate().unwrap();
    }

    #[test]
    fn validate_rejects_too_few_splines() {
        let mut cfg = PipelineConfig::default();
        cfg.model.n_splines = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig::load(Some(&dir.path().join("nope.yaml")), dir.path());
        assert_eq!(cfg.unwrap_err().exit_code(), 2);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = PipelineConfig::from_yaml(include_str!("../config/config.yaml")).unwrap();
        cfg.validate().unwrap();
        let defaults = PipelineConfig::default();
        assert_eq!(cfg.eras, defaults.eras);
        assert_eq!(cfg.model, defaults.model);
        assert_eq!(cfg.clean, defaults.clean);
    }
}
