//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a log
//! - deterministic output (helpful for golden tests)
//!
//! The series is drawn as a `-` line; the latest observation is marked `*`.

use chrono::NaiveDate;

use crate::domain::DerivedSeries;

/// Render `series` as a line chart; dates map linearly onto the x axis.
pub fn render_series_plot(title: &str, series: &DerivedSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(d_min), Some(d_max)) = (series.first_date(), series.last_date()) else {
        return format!("{title}: no data\n");
    };

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let mut prev = None;
    for p in &series.points {
        let x = map_x(p.date, d_min, d_max, width);
        let y = map_y(p.value, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, x, y, '-');
        } else {
            grid[y][x] = '-';
        }
        prev = Some((x, y));
    }
    if let Some((x, y)) = prev {
        grid[y][x] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!("{title}: {d_min} .. {d_max} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn y_range(series: &DerivedSeries) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in series.values() {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        // Flat series: center it.
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(d: NaiveDate, d_min: NaiveDate, d_max: NaiveDate, width: usize) -> usize {
    let width = width.max(2);
    let span = (d_max - d_min).num_days();
    if span <= 0 {
        return 0;
    }
    let u = ((d - d_min).num_days() as f64 / span as f64).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
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
    use crate::domain::ObservationPoint;

    #[test]
    fn plot_golden_snapshot_small() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let series = DerivedSeries::new(
            vec![ObservationPoint::new(d0, 100.0), ObservationPoint::new(d1, 110.0)],
            None,
        );

        let txt = render_series_plot("CPI", &series, 10, 5);
        let expected = concat!(
            "CPI: 2024-01-01 .. 2024-01-10 | y=[99.50, 110.50]\n",
            "        -*\n",
            "      --\n",
            "    --\n",
            "  --\n",
            "--\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_has_no_grid() {
        assert_eq!(render_series_plot("X", &DerivedSeries::default(), 10, 5), "X: no data\n");
    }

    #[test]
    fn single_point_is_marked() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = DerivedSeries::new(vec![ObservationPoint::new(d0, 5.0)], None);
        let txt = render_series_plot("X", &series, 10, 5);
        assert!(txt.contains('*'));
    }
}
