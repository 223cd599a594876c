//! Per-era aging curve fits.
//!
//! Rows are grouped by their era label (configured eras first, in config
//! order, then any other labels alphabetically), or pooled into a single
//! `All` group when segmentation is off. Each group is fitted independently;
//! a group that is too small or fails numerically is skipped and reported,
//! never fatal.

use std::collections::BTreeMap;

use crate::config::ModelConfig;
use crate::domain::{EraCurve, EraSpec, ModelRow, POOLED_ERA};
use crate::error::AppError;
use crate::fit::fitter::{GamFit, GamProblem, Observation, SmootherSpec};
use crate::fit::lambda_grid::lambda_candidates;
use crate::fit::selection::select_lambda;

/// Minimum number of extra observations beyond the basis size.
const MIN_N_BUFFER: usize = 5;

#[derive(Debug, Clone)]
pub struct EraFit {
    pub fit: GamFit,
    pub curve: EraCurve,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEra {
    pub era: String,
    pub n: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct EraFitReport {
    pub fits: Vec<EraFit>,
    pub skipped: Vec<SkippedEra>,
}

impl EraFitReport {
    pub fn curves(&self) -> Vec<EraCurve> {
        self.fits.iter().map(|f| f.curve.clone()).collect()
    }
}

pub fn fit_by_era(rows: &[ModelRow], eras: &[EraSpec], config: &ModelConfig) -> Result<EraFitReport, AppError> {
    config.validate()?;
    let lambdas = lambda_candidates(config)?;
    let spec = SmootherSpec {
        n_splines: config.n_splines,
        degree: config.spline_degree,
        penalty_order: config.penalty_order,
    };
    let min_n = config.min_rows.max(config.n_splines + MIN_N_BUFFER);

    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for (era, group) in group_rows(rows, eras, config.segment_by_era) {
        let observations = observations_for(&group, config.weight_by_minutes);
        let dropped = group.len() - observations.len();
        if dropped > 0 {
            log::info!("era '{era}': ignoring {dropped} rows with non-positive minutes");
        }

        let n = observations.len();
        if n < min_n {
            let reason = format!("insufficient data: n={n} < {min_n}");
            log::warn!("skipping era '{era}': {reason}");
            skipped.push(SkippedEra { era, n, reason });
            continue;
        }

        match fit_group(&observations, &spec, &lambdas, config) {
            Ok((fit, curve)) => {
                let mut curve = curve;
                curve.era = era.clone();
                log::info!(
                    "era '{era}': n={n} lambda={:.4} edf={:.2} peak_age={:.2}",
                    fit.lambda,
                    fit.edf,
                    curve.peak_age
                );
                fits.push(EraFit { fit, curve });
            }
            Err(e) => {
                let reason = e.to_string();
                log::warn!("skipping era '{era}': {reason}");
                skipped.push(SkippedEra { era, n, reason });
            }
        }
    }

    Ok(EraFitReport { fits, skipped })
}

/// Rows with zero weight contribute nothing to a minutes-weighted fit, so
/// they are left out instead of failing the whole group.
fn observations_for(group: &[&ModelRow], weight_by_minutes: bool) -> Vec<Observation> {
    group
        .iter()
        .filter(|r| !weight_by_minutes || r.minutes > 0.0)
        .map(|r| Observation {
            x: r.age,
            y: r.bpm,
            weight: if weight_by_minutes { r.minutes } else { 1.0 },
        })
        .collect()
}

fn fit_group(
    observations: &[Observation],
    spec: &SmootherSpec,
    lambdas: &[f64],
    config: &ModelConfig,
) -> Result<(GamFit, EraCurve), AppError> {
    let problem = GamProblem::new(observations, spec)?;
    let search = select_lambda(&problem, lambdas)?;
    if search.failed > 0 {
        log::debug!("{} of {} lambda candidates failed", search.failed, lambdas.len());
    }

    let fit = search.best;
    let grid = fit.evaluate(config.grid_points, config.band_z);
    let (peak_age, peak_bpm) = grid
        .peak()
        .ok_or_else(|| AppError::new(4, "Fitted curve has no finite predictions."))?;

    let curve = EraCurve {
        era: String::new(),
        peak_age,
        peak_bpm,
        quality: fit.quality(),
        grid,
    };
    Ok((fit, curve))
}

fn group_rows<'a>(
    rows: &'a [ModelRow],
    eras: &[EraSpec],
    segment: bool,
) -> Vec<(String, Vec<&'a ModelRow>)> {
    if !segment {
        return vec![(POOLED_ERA.to_string(), rows.iter().collect())];
    }

    let mut by_label: BTreeMap<&str, Vec<&ModelRow>> = BTreeMap::new();
    for r in rows {
        by_label.entry(r.era.as_str()).or_default().push(r);
    }

    let mut out = Vec::with_capacity(by_label.len());
    for era in eras {
        if let Some(group) = by_label.remove(era.name.as_str()) {
            out.push((era.name.clone(), group));
        }
    }
    for (label, group) in by_label {
        out.push((label.to_string(), group));
    }
    out
}
