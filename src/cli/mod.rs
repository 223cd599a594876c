//! Command-line parsing for the BPM aging-curve pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the stage code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SourceKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bpm", version, about = "NBA BPM aging curves by era (P-spline GAM)")]
pub struct Cli {
    /// Config file (default: `$BPM_CONFIG`, then `<root>/config/config.yaml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root of the `data/` and `reports/` tree (default: `$BPM_DATA_ROOT`, then `.`).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per stage plus `run`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download one raw advanced-stats table per configured season.
    Fetch(FetchArgs),
    /// Merge raw tables into the cleaned player-season and modeling tables.
    Clean,
    /// Fit one aging curve per era and write curves, peaks and per-era grids.
    Model,
    /// Render the saved curves to an SVG figure.
    Plot(PlotArgs),
    /// Run fetch, clean, model and plot in order.
    Run(RunArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Data source (overrides `source` in the config).
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Re-fetch seasons whose raw file already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Also print an ASCII preview of the curves.
    #[arg(long)]
    pub ascii: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    #[command(flatten)]
    pub plot: PlotArgs,
}
