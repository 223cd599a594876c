//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each era's fitted curve is drawn with its own character; earlier curves
//! keep their cells where lines cross. Bands are not drawn.

use crate::domain::{CurveFile, EraCurve};

const CURVE_CHARS: [char; 6] = ['*', '+', 'o', 'x', '#', '@'];

/// Render every curve of a saved curve file.
pub fn render_ascii_curves(curves: &CurveFile, width: usize, height: usize) -> String {
    let Some((a_min, a_max, y_min, y_max)) = ranges(&curves.curves) else {
        return "No curves to plot.\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (i, curve) in curves.curves.iter().enumerate() {
        let ch = CURVE_CHARS[i % CURVE_CHARS.len()];
        let points: Vec<(f64, f64)> = curve
            .grid
            .age
            .iter()
            .zip(curve.grid.fit.iter())
            .map(|(&a, &y)| (a, y))
            .collect();
        draw_curve(&mut grid, &points, a_min, a_max, y_min, y_max, ch);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: age=[{a_min:.1}, {a_max:.1}] | {}=[{y_min:.2}, {y_max:.2}]\n",
        curves.metric
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (i, curve) in curves.curves.iter().enumerate() {
        out.push_str(&format!(
            "  {} {}  peak_age={:.1}\n",
            CURVE_CHARS[i % CURVE_CHARS.len()],
            curve.era,
            curve.peak_age
        ));
    }

    out
}

fn ranges(curves: &[EraCurve]) -> Option<(f64, f64, f64, f64)> {
    let mut a_min = f64::INFINITY;
    let mut a_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for c in curves {
        for (&a, &y) in c.grid.age.iter().zip(c.grid.fit.iter()) {
            if !(a.is_finite() && y.is_finite()) {
                continue;
            }
            a_min = a_min.min(a);
            a_max = a_max.max(a);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if a_min.is_finite() && a_max > a_min && y_min.is_finite() && y_max.is_finite() {
        if y_max > y_min {
            Some((a_min, a_max, y_min, y_max))
        } else {
            Some((a_min, a_max, y_min - 0.5, y_max + 0.5))
        }
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !y.is_finite() {
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurveGrid, FitQuality};

    fn curve(era: &str, age: Vec<f64>, fit: Vec<f64>) -> EraCurve {
        let n = age.len();
        EraCurve {
            era: era.to_string(),
            peak_age: age[n - 1],
            peak_bpm: fit[n - 1],
            quality: FitQuality {
                n: 10,
                lambda: 1.0,
                edf: 3.0,
                gcv: 1.0,
                rmse: 1.0,
            },
            grid: CurveGrid {
                age,
                lower: fit.clone(),
                upper: fit.clone(),
                fit,
            },
        }
    }

    fn file(curves: Vec<EraCurve>) -> CurveFile {
        CurveFile {
            tool: "bpm".to_string(),
            metric: "BPM".to_string(),
            band_z: 1.96,
            curves,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii_curves(&file(vec![curve("Pre", vec![20.0, 30.0], vec![0.0, 1.0])]), 10, 5);
        let expected = concat!(
            "Plot: age=[20.0, 30.0] | BPM=[-0.05, 1.05]\n",
            "        **\n",
            "      **  \n",
            "    **    \n",
            "  **      \n",
            "**        \n",
            "  * Pre  peak_age=30.0\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn second_curve_uses_its_own_char() {
        let txt = render_ascii_curves(
            &file(vec![
                curve("A", vec![20.0, 30.0], vec![1.0, 1.0]),
                curve("B", vec![20.0, 30.0], vec![0.0, 0.0]),
            ]),
            10,
            5,
        );
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[1], "**********");
        assert_eq!(lines[5], "++++++++++");
        assert_eq!(lines[7], "  + B  peak_age=30.0");
    }

    #[test]
    fn empty_file_renders_a_note() {
        assert_eq!(render_ascii_curves(&file(Vec::new()), 10, 5), "No curves to plot.\n");
    }
}
