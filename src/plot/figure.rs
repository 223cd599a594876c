//! SVG figure of the fitted aging curves.
//!
//! Layers, per era (drawn in curve-file order):
//! 1. confidence band as a translucent polygon
//! 2. fitted curve line (legend entry)
//! 3. peak marker

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::{CurveFile, EraCurve};
use crate::error::AppError;
use crate::io::ensure_dir;

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// Write the figure to `path`.
///
/// Returns `Ok(None)` without touching the filesystem when there is nothing
/// to draw.
pub fn render_curves_svg(
    curves: &CurveFile,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<Option<PathBuf>, AppError> {
    if curves.curves.is_empty() {
        log::warn!("no fitted curves; figure not written");
        return Ok(None);
    }
    let bounds = Bounds::of(&curves.curves)
        .ok_or_else(|| AppError::new(3, "Fitted curves contain no finite points to plot."))?;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    draw(curves, path, (width, height), &bounds)
        .map_err(|e| AppError::new(4, format!("Failed to render figure '{}': {e}", path.display())))?;

    log::info!("[out] {}", path.display());
    Ok(Some(path.to_path_buf()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl Bounds {
    fn of(curves: &[EraCurve]) -> Option<Self> {
        let mut b = Bounds {
            x0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y0: f64::INFINITY,
            y1: f64::NEG_INFINITY,
        };
        for c in curves {
            let g = &c.grid;
            for i in 0..g.len() {
                let (a, lo, hi) = (g.age[i], g.lower[i], g.upper[i]);
                if !(a.is_finite() && lo.is_finite() && hi.is_finite()) {
                    continue;
                }
                b.x0 = b.x0.min(a);
                b.x1 = b.x1.max(a);
                b.y0 = b.y0.min(lo);
                b.y1 = b.y1.max(hi);
            }
        }
        if !(b.x0.is_finite() && b.x1 > b.x0 && b.y0.is_finite() && b.y1.is_finite()) {
            return None;
        }
        let pad = ((b.y1 - b.y0) * 0.05).max(0.5);
        b.y0 -= pad;
        b.y1 += pad;
        Some(b)
    }
}

fn draw(curves: &CurveFile, path: &Path, size: (u32, u32), b: &Bounds) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} aging curves by era", curves.metric),
            ("sans-serif", 22),
        )
        .margin(16)
        .set_label_area_size(LabelAreaPosition::Left, 56)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(b.x0..b.x1, b.y0..b.y1)?;

    chart
        .configure_mesh()
        .x_desc("Age")
        .y_desc(format!("Predicted {}", curves.metric))
        .x_labels(10)
        .y_labels(8)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;

    for (i, curve) in curves.curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let g = &curve.grid;

        let mut band: Vec<(f64, f64)> = g.age.iter().copied().zip(g.upper.iter().copied()).collect();
        band.extend(g.age.iter().copied().zip(g.lower.iter().copied()).rev());
        chart.draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))?;

        chart
            .draw_series(LineSeries::new(
                g.age.iter().copied().zip(g.fit.iter().copied()),
                color.stroke_width(2),
            ))?
            .label(format!("{} (peak {:.1})", curve.era, curve.peak_age))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart.draw_series(std::iter::once(Circle::new(
            (curve.peak_age, curve.peak_bpm),
            4,
            color.filled(),
        )))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveGrid, FitQuality};

    fn curve_file(curves: Vec<EraCurve>) -> CurveFile {
        CurveFile {
            tool: "bpm".to_string(),
            metric: "BPM".to_string(),
            band_z: 1.96,
            curves,
        }
    }

    fn parabola(era: &str, peak: f64) -> EraCurve {
        let age: Vec<f64> = (0..50).map(|i| 19.0 + 19.0 * i as f64 / 49.0).collect();
        let fit: Vec<f64> = age.iter().map(|a| 1.0 - 0.05 * (a - peak).powi(2)).collect();
        EraCurve {
            era: era.to_string(),
            peak_age: peak,
            peak_bpm: 1.0,
            quality: FitQuality {
                n: 500,
                lambda: 1.0,
                edf: 5.0,
                gcv: 4.0,
                rmse: 2.0,
            },
            grid: CurveGrid {
                lower: fit.iter().map(|y| y - 0.5).collect(),
                upper: fit.iter().map(|y| y + 0.5).collect(),
                age,
                fit,
            },
        }
    }

    #[test]
    fn empty_curve_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures").join("out.svg");
        let written = render_curves_svg(&curve_file(Vec::new()), &path, 800, 500).unwrap();
        assert_eq!(written, None);
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn writes_svg_with_one_band_per_era() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures").join("out.svg");
        let curves = curve_file(vec![parabola("Pre-2015", 27.0), parabola("2015-2025", 26.0)]);

        let written = render_curves_svg(&curves, &path, 800, 500).unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.matches("<polygon").count() >= 2);
        assert!(svg.contains("Pre-2015 (peak 27.0)"));
    }

    #[test]
    fn bounds_cover_bands() {
        let b = Bounds::of(&[parabola("x", 27.0)]).unwrap();
        assert_eq!((b.x0, b.x1), (19.0, 38.0));
        assert!(b.y1 > 1.5);
        assert!(b.y0 < 1.0 - 0.05 * 121.0 - 0.5);
    }
}
