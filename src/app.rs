//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - resolves the data root and configuration
//! - runs the requested stage(s) and prints their reports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Cli, Command, FetchArgs};
use crate::config::{DATA_ROOT_ENV, PipelineConfig};
use crate::data::source_from_config;
use crate::error::AppError;
use crate::io::DataLayout;
use crate::report::{format_clean_report, format_fetch_report, format_model_report};

pub mod pipeline;

use pipeline::{Context, ModelOutput, PlotOutput};

/// Entry point for the `bpm` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    // A logger may already be installed when embedded; keep it.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();

    let cli = Cli::parse();
    let ctx = context(&cli)?;

    match cli.command {
        Command::Fetch(args) => handle_fetch(&ctx, &args),
        Command::Clean => handle_clean(&ctx),
        Command::Model => handle_model(&ctx),
        Command::Plot(args) => handle_plot(&ctx, args.ascii),
        Command::Run(args) => {
            handle_fetch(&ctx, &args.fetch)?;
            handle_clean(&ctx)?;
            handle_model(&ctx)?;
            handle_plot(&ctx, args.plot.ascii)
        }
    }
}

fn context(cli: &Cli) -> Result<Context, AppError> {
    let root = cli
        .root
        .clone()
        .or_else(|| std::env::var_os(DATA_ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let config = PipelineConfig::load(cli.config.as_deref(), &root)?;
    Ok(Context::new(config, DataLayout::new(root)))
}

fn handle_fetch(ctx: &Context, args: &FetchArgs) -> Result<(), AppError> {
    let kind = args.source.unwrap_or(ctx.config.source);
    let source = source_from_config(kind, &ctx.config)?;
    let report = pipeline::run_fetch(ctx, source.as_ref(), args.force)?;
    print!("{}", format_fetch_report(&report));
    Ok(())
}

fn handle_clean(ctx: &Context) -> Result<(), AppError> {
    let report = pipeline::run_clean(ctx)?;
    print!("{}", format_clean_report(&report));
    Ok(())
}

fn handle_model(ctx: &Context) -> Result<(), AppError> {
    let ModelOutput {
        report,
        curves_path,
        peak_ages_path,
        era_curve_paths,
    } = pipeline::run_model(ctx)?;

    print!("{}", format_model_report(&report));
    println!("[out] {}", curves_path.display());
    for path in peak_ages_path.iter().chain(era_curve_paths.iter()) {
        println!("[out] {}", path.display());
    }
    Ok(())
}

fn handle_plot(ctx: &Context, ascii: bool) -> Result<(), AppError> {
    let PlotOutput { figure, ascii } = pipeline::run_plot(ctx, ascii)?;

    match figure {
        Some(path) => println!("[out] {}", path.display()),
        None => println!("No curves to plot; figure not written."),
    }
    if let Some(text) = ascii {
        print!("{text}");
    }
    Ok(())
}
