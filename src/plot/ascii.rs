//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed monthly totals: `o`
//! - projected monthly totals: `x`
//! - connecting line: `-`

use crate::domain::{ForecastPoint, MonthlyTotal, PointSource};
use crate::report::month_label;

/// Render the monthly sales trend (observed only).
pub fn render_trend_plot(series: &[MonthlyTotal], width: usize, height: usize) -> String {
    let points: Vec<ForecastPoint> = series
        .iter()
        .map(|m| ForecastPoint {
            month: m.month,
            amount: m.total,
            source: PointSource::Observed,
        })
        .collect();
    render_series_plot(&points, width, height)
}

/// Render a month-indexed series with observed and projected markers.
pub fn render_series_plot(points: &[ForecastPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if points.is_empty() {
        return "Plot: (no data)\n".to_string();
    }

    let x_max = (points.len() - 1).max(1) as f64;
    let (y_min, y_max) = amount_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the connecting line first (so markers can overlay).
    let line: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.amount))
        .collect();
    draw_polyline(&mut grid, &line, x_max, y_min, y_max);

    for (i, p) in points.iter().enumerate() {
        let x = map_x(i as f64, x_max, width);
        let y = map_y(p.amount, y_min, y_max, height);
        grid[y][x] = match p.source {
            PointSource::Observed => 'o',
            PointSource::Projected => 'x',
        };
    }

    // Build final string. We include a small header with ranges.
    let first = month_label(points[0].month);
    let last = month_label(points[points.len() - 1].month);
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{first}, {last}] | sales=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        let mut line: String = row.into_iter().collect();
        while line.ends_with(' ') {
            line.pop();
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn amount_range(points: &[ForecastPoint]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_y = min_y.min(p.amount);
        max_y = max_y.max(p.amount);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: synthesize a band around the constant value.
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (i / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    if points.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(i, y) in points {
        let x = map_x(i, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
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
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let points = vec![
            ForecastPoint { month: jan, amount: 100.0, source: PointSource::Observed },
            ForecastPoint { month: feb, amount: 110.0, source: PointSource::Projected },
        ];

        let txt = render_series_plot(&points, 10, 5);
        let expected = concat!(
            "Plot: months=[Jan-2024, Feb-2024] | sales=[99.50, 110.50]\n",
            "        -x\n",
            "      --\n",
            "    --\n",
            "  --\n",
            "o-\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let points = vec![
            ForecastPoint { month: jan, amount: 100.0, source: PointSource::Observed },
            ForecastPoint { month: feb, amount: 100.0, source: PointSource::Observed },
        ];
        let txt = render_series_plot(&points, 20, 5);
        assert!(txt.contains('o'));
    }

    #[test]
    fn empty_series_renders_a_placeholder() {
        assert_eq!(render_series_plot(&[], 20, 5), "Plot: (no data)\n");
    }

    #[test]
    fn trend_plot_marks_all_points_observed() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let series = vec![
            MonthlyTotal { month: jan, total: 10.0 },
            MonthlyTotal { month: feb, total: 20.0 },
        ];
        let txt = render_trend_plot(&series, 20, 5);
        assert!(txt.contains('o'));
        assert!(!txt.contains('x'));
    }
}
