//! Formatted terminal output for stage summaries.
//!
//! We keep formatting code in one place so:
//! - the stage code stays clean and testable
//! - output changes are localized

use crate::clean::CleanReport;
use crate::data::{FetchOutcome, FetchReport};
use crate::domain::season_label;
use crate::fit::EraFitReport;

/// Maximum number of row errors listed individually.
const MAX_ROW_ERRORS: usize = 10;

pub fn format_fetch_report(report: &FetchReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== bpm - fetch ({}) ===\n", report.source));
    for s in &report.seasons {
        let label = season_label(s.season);
        let line = match &s.outcome {
            FetchOutcome::Written { rows, path } => {
                format!("[ok]   {label}  rows={rows}  {}", path.display())
            }
            FetchOutcome::SkippedExisting { path } => format!("[skip] {label}  {}", path.display()),
            FetchOutcome::Failed(msg) => format!("[err]  {label}  {msg}"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!(
        "written={} skipped={} failed={}\n",
        report.written(),
        report.skipped(),
        report.failed()
    ));

    out
}

pub fn format_clean_report(report: &CleanReport) -> String {
    let mut out = String::new();

    out.push_str("=== bpm - clean & merge ===\n");
    out.push_str(&format!(
        "Files: read={} skipped={}\n",
        report.files_read,
        report.files_skipped.len()
    ));
    for f in &report.files_skipped {
        out.push_str(&format!("  (skipped {}) {}\n", f.file, f.reason));
    }
    out.push_str(&format!(
        "Rows: read={} errors={} missing={} low_minutes={} duplicates={} written={}\n",
        report.rows_read,
        report.row_errors.len(),
        report.missing_metric,
        report.filtered_minutes,
        report.duplicates,
        report.rows_written
    ));
    for e in report.row_errors.iter().take(MAX_ROW_ERRORS) {
        out.push_str(&format!("  {}:{} {}\n", e.file, e.line, e.message));
    }
    if report.row_errors.len() > MAX_ROW_ERRORS {
        out.push_str(&format!(
            "  ... {} more\n",
            report.row_errors.len() - MAX_ROW_ERRORS
        ));
    }
    out.push_str(&format!("[out] {}\n", report.player_seasons_path.display()));
    out.push_str(&format!("[out] {}\n", report.for_model_path.display()));

    out
}

pub fn format_model_report(report: &EraFitReport) -> String {
    let mut out = String::new();

    out.push_str("=== bpm - aging curves (P-spline GAM) ===\n");
    out.push_str(
        format!(
            "{:<16} {:>6} {:>10} {:>7} {:>9} {:>7} {:>9} {:>9}\n",
            "era", "n", "lambda", "edf", "gcv", "rmse", "peak_age", "peak_bpm"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<6} {:-<10} {:-<7} {:-<9} {:-<7} {:-<9} {:-<9}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for f in &report.fits {
        let c = &f.curve;
        out.push_str(
            format!(
                "{:<16} {:>6} {:>10.4} {:>7.2} {:>9.3} {:>7.3} {:>9.2} {:>9.2}\n",
                truncate(&c.era, 16),
                c.quality.n,
                c.quality.lambda,
                c.quality.edf,
                c.quality.gcv,
                c.quality.rmse,
                c.peak_age,
                c.peak_bpm
            )
            .trim_end(),
        );
        out.push('\n');
    }
    for s in &report.skipped {
        out.push_str(&format!("  (skipped {}) n={} {}\n", s.era, s.n, s.reason));
    }
    if report.fits.is_empty() {
        out.push_str("No curves fitted.\n");
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
