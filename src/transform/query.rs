//! Read-only queries over a derived series (cards and charts).

use chrono::{Datelike, NaiveDate};

use crate::domain::{DerivedSeries, ObservationPoint};

/// Last point's `(value, date)`, or `None` when the series is empty.
pub fn latest_value(series: &DerivedSeries) -> Option<(f64, NaiveDate)> {
    series.points.last().map(|p| (p.value, p.date))
}

/// `(v[last] / v[last - periods] - 1) * 100`.
///
/// Needs at least `periods + 1` points. Positional, like the year-over-year
/// transform, and independent of whatever transform produced `series`.
pub fn pct_change_latest(series: &DerivedSeries, periods: usize) -> Option<f64> {
    let n = series.len();
    if periods == 0 || n <= periods {
        return None;
    }
    let last = series.points[n - 1].value;
    let prior = series.points[n - 1 - periods].value;
    let change = (last / prior - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

/// Points dated on or after `today` minus `lookback_years` calendar years.
pub fn window(series: &DerivedSeries, lookback_years: u32, today: NaiveDate) -> DerivedSeries {
    let cutoff = years_before(today, lookback_years);
    let points: Vec<ObservationPoint> = series
        .points
        .iter()
        .filter(|p| p.date >= cutoff)
        .copied()
        .collect();
    DerivedSeries::new(points, series.last_updated.clone())
}

/// Same month/day `years` earlier; Feb 29 falls back to Feb 28.
pub fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    let year = date.year() - years as i32;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(NaiveDate::MIN)
}
