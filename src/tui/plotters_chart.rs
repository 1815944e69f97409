//! Plotters-powered time-series chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::DerivedSeries;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call
/// (see `ChartData::from_series`).
pub struct SeriesChart<'a> {
    /// Line series: (day number since CE, value).
    pub line: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
}

/// Chart-ready points and bounds for a derived series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub line: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    /// `None` for an empty series.
    pub fn from_series(series: &DerivedSeries) -> Option<Self> {
        let line: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|p| (p.date.num_days_from_ce() as f64, p.value))
            .collect();

        let (x0, x1) = (line.first()?.0, line.last()?.0);
        let x_bounds = if x1 > x0 { [x0, x1] } else { [x0 - 1.0, x0 + 1.0] };

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in &line {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }
        if y_max <= y_min {
            y_min -= 1.0;
            y_max += 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

        Some(Self {
            line,
            x_bounds,
            y_bounds: [y_min - pad, y_max + pad],
        })
    }
}

/// Axis label for a day number (`YYYY-MM`).
pub fn fmt_day(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_value(v: f64) -> String {
    format!("{v:.1}")
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day(*v))
                .y_label_formatter(&|v| fmt_value(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;

            // Latest print, highlighted.
            if let Some(&last) = self.line.last() {
                chart.draw_series(std::iter::once(Pixel::new(last, RGBColor(255, 255, 0))))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
