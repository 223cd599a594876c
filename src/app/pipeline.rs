//! Stage orchestration shared by the individual subcommands and `run`.
//!
//! Each stage reads the previous stage's files and writes its own:
//! fetch -> `data/raw` -> clean -> `data/clean`, `data/processed` -> model ->
//! `data/processed` -> plot -> `reports/figures`.
//!
//! The CLI layer only chooses a source and prints the returned reports.

use std::path::PathBuf;

use crate::clean::{CleanReport, clean_and_merge};
use crate::config::PipelineConfig;
use crate::data::{FetchReport, SeasonSource, fetch_all};
use crate::error::AppError;
use crate::fit::{EraFitReport, fit_by_era};
use crate::io::{
    DataLayout, curve_file, ensure_dir, read_curve_json, read_model_rows, remove_stale,
    write_curve_json, write_era_curve_csv, write_peak_ages_csv,
};
use crate::plot::{render_ascii_curves, render_curves_svg};

/// Resolved configuration plus where files live.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: PipelineConfig,
    pub layout: DataLayout,
}

impl Context {
    pub fn new(config: PipelineConfig, layout: DataLayout) -> Self {
        Self { config, layout }
    }
}

#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub report: EraFitReport,
    pub curves_path: PathBuf,
    /// Absent when no era could be fitted.
    pub peak_ages_path: Option<PathBuf>,
    pub era_curve_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PlotOutput {
    pub figure: Option<PathBuf>,
    pub ascii: Option<String>,
}

/// All outputs of `bpm run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub fetch: FetchReport,
    pub clean: CleanReport,
    pub model: ModelOutput,
    pub plot: PlotOutput,
}

pub fn run_fetch(ctx: &Context, source: &dyn SeasonSource, force: bool) -> Result<FetchReport, AppError> {
    let seasons = ctx.config.seasons.seasons();
    log::info!(
        "fetching {} seasons from {} into {}",
        seasons.len(),
        source.name(),
        ctx.layout.raw_dir().display()
    );
    fetch_all(&seasons, source, &ctx.layout, force)
}

pub fn run_clean(ctx: &Context) -> Result<CleanReport, AppError> {
    clean_and_merge(&ctx.layout, &ctx.config)
}

pub fn run_model(ctx: &Context) -> Result<ModelOutput, AppError> {
    let input = ctx.layout.for_model_path();
    if !input.exists() {
        return Err(AppError::new(
            2,
            format!("Missing '{}'; run `bpm clean` first.", input.display()),
        ));
    }
    let rows = read_model_rows(&input)?;
    log::info!("modeling {} rows from {}", rows.len(), input.display());

    let report = fit_by_era(&rows, &ctx.config.eras, &ctx.config.model)?;
    let curves = report.curves();

    ensure_dir(&ctx.layout.processed_dir())?;
    // Exports from an earlier run would otherwise outlive eras that no longer fit.
    remove_stale(&ctx.layout.peak_ages_path())?;
    for path in ctx.layout.era_curve_files()? {
        remove_stale(&path)?;
    }

    let curves_path = ctx.layout.curves_path();
    write_curve_json(&curves_path, &curve_file(curves.clone(), ctx.config.model.band_z))?;

    let mut peak_ages_path = None;
    let mut era_curve_paths = Vec::with_capacity(curves.len());
    if curves.is_empty() {
        log::warn!("no era had enough data to fit a curve");
    } else {
        let path = ctx.layout.peak_ages_path();
        write_peak_ages_csv(&path, &curves)?;
        peak_ages_path = Some(path);

        for curve in &curves {
            let path = ctx.layout.era_curve_path(&curve.era);
            write_era_curve_csv(&path, curve)?;
            era_curve_paths.push(path);
        }
    }

    Ok(ModelOutput {
        report,
        curves_path,
        peak_ages_path,
        era_curve_paths,
    })
}

pub fn run_plot(ctx: &Context, ascii: bool) -> Result<PlotOutput, AppError> {
    let input = ctx.layout.curves_path();
    if !input.exists() {
        return Err(AppError::new(
            2,
            format!("Missing '{}'; run `bpm model` first.", input.display()),
        ));
    }
    let curves = read_curve_json(&input)?;
    let plot = &ctx.config.plot;

    let figure_path = ctx.layout.figure_path();
    let figure = render_curves_svg(&curves, &figure_path, plot.width, plot.height)?;
    if figure.is_none() {
        remove_stale(&figure_path)?;
    }
    let ascii = ascii.then(|| render_ascii_curves(&curves, plot.ascii_width, plot.ascii_height));

    Ok(PlotOutput { figure, ascii })
}

/// Run all four stages in order with the given source.
pub fn run_all(
    ctx: &Context,
    source: &dyn SeasonSource,
    force: bool,
    ascii: bool,
) -> Result<RunOutput, AppError> {
    let fetch = run_fetch(ctx, source, force)?;
    let clean = run_clean(ctx)?;
    let model = run_model(ctx)?;
    let plot = run_plot(ctx, ascii)?;

    Ok(RunOutput {
        fetch,
        clean,
        model,
        plot,
    })
}
