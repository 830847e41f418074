//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - recorded elevation: `.`
//! - reference elevation: `r`
//! - corrected elevation: `-` line (drawn last, on top)

use crate::domain::ElevationUnit;

/// Profiles to overlay, all sharing one x series.
#[derive(Debug, Clone, Copy)]
pub struct PlotSeries<'a> {
    pub x: &'a [f64],
    pub recorded: &'a [f64],
    pub reference: Option<&'a [f64]>,
    pub corrected: &'a [f64],
}

/// Render the three profiles onto a `width` x `height` grid.
pub fn render_ascii_plot(series: &PlotSeries<'_>, unit: ElevationUnit, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = finite_range(series.x.iter().copied()).unwrap_or((0.0, 1.0));
    let all_y = series
        .recorded
        .iter()
        .chain(series.reference.unwrap_or(&[]).iter())
        .chain(series.corrected.iter())
        .copied();
    let (y_min, y_max) = finite_range(all_y).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let map = |x: f64, y: f64| {
        (
            map_x(x, x_min, x_max, width),
            map_y(y, y_min, y_max, height),
        )
    };

    for (&x, &y) in series.x.iter().zip(series.recorded) {
        if x.is_finite() && y.is_finite() {
            let (c, r) = map(x, y);
            grid[r][c] = '.';
        }
    }
    if let Some(reference) = series.reference {
        for (&x, &y) in series.x.iter().zip(reference) {
            if x.is_finite() && y.is_finite() {
                let (c, r) = map(x, y);
                grid[r][c] = 'r';
            }
        }
    }

    let mut prev = None;
    for (&x, &y) in series.x.iter().zip(series.corrected) {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let (c, r) = map(x, y);
        match prev {
            Some((c0, r0)) => draw_line(&mut grid, c0, r0, c, r, '-'),
            None => grid[r][c] = '-',
        }
        prev = Some((c, r));
    }

    let f = unit.factor();
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.1}, {x_max:.1}] | elevation=[{:.1}, {:.1}]{}\n",
        y_min * f,
        y_max * f,
        unit.label()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() && hi > lo {
        Some((lo, hi))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Overwrites markers underneath.
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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
