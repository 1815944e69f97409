//! Transform engine: raw series -> derived series.
//!
//! Every transform works on a sorted copy of its input, so the cached raw
//! series is never touched. Points whose transformed value is undefined
//! (insufficient lookback, non-finite division) are omitted rather than
//! emitted as sentinels.

use crate::domain::{DerivedSeries, Frequency, ObservationPoint, RawSeries, TransformKind};

pub mod query;

pub use query::{latest_value, pct_change_latest, window};

/// Positional lookback used by the year-over-year transform.
pub const YOY_LAG: usize = 12;

/// Divisor for the thousands-based transforms.
const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;

/// Apply `kind` to `raw`.
///
/// `None` or an empty input yields `None`. A non-empty input may still yield
/// an empty derived series (e.g. fewer than 13 points for year-over-year).
pub fn transform(raw: Option<&RawSeries>, kind: TransformKind) -> Option<DerivedSeries> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    let mut sorted = raw.points.clone();
    sorted.sort_by_key(|p| p.date);

    let points = match kind {
        TransformKind::Level => sorted,
        TransformKind::YearOverYear => lagged(&sorted, YOY_LAG, |cur, prev| (cur / prev - 1.0) * 100.0),
        TransformKind::MonthOverMonthThousands => lagged(&sorted, 1, |cur, prev| (cur - prev) / THOUSAND),
        TransformKind::Thousands => scaled(&sorted, THOUSAND),
        TransformKind::Millions => scaled(&sorted, MILLION),
    };

    Some(DerivedSeries::new(
        points.into_iter().filter(|p| p.value.is_finite()).collect(),
        raw.last_updated.clone(),
    ))
}

fn lagged(points: &[ObservationPoint], lag: usize, f: impl Fn(f64, f64) -> f64) -> Vec<ObservationPoint> {
    if points.len() <= lag {
        return Vec::new();
    }
    points
        .iter()
        .zip(points[lag..].iter())
        .map(|(prev, cur)| ObservationPoint::new(cur.date, f(cur.value, prev.value)))
        .collect()
}

fn scaled(points: &[ObservationPoint], divisor: f64) -> Vec<ObservationPoint> {
    points
        .iter()
        .map(|p| ObservationPoint::new(p.date, p.value / divisor))
        .collect()
}

/// Count consecutive-sample gaps that exceed one period of `frequency`.
///
/// The year-over-year transform looks back by sample count, so any such gap
/// means "12 samples back" is not "one year back".
pub fn irregular_spacing(series: &RawSeries, frequency: Frequency) -> usize {
    let max_gap = frequency.max_gap_days();
    series
        .points
        .windows(2)
        .filter(|w| (w[1].date - w[0].date).num_days() > max_gap)
        .count()
}

#[cfg(test)]
mod tests {
    use chrono::{Months, NaiveDate};

    use super::*;

    fn monthly(values: &[f64]) -> RawSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ObservationPoint::new(start + Months::new(i as u32), v))
            .collect();
        RawSeries::new(points, Some("2025-01-15".to_string()))
    }

    #[test]
    fn level_is_identity_and_idempotent() {
        let raw = monthly(&[1.0, 2.0, 3.0]);
        let once = transform(Some(&raw), TransformKind::Level).unwrap();
        let twice = transform(Some(&once), TransformKind::Level).unwrap();
        assert_eq!(once, raw);
        assert_eq!(twice, once);
    }

    #[test]
    fn yoy_uses_twelve_sample_lookback() {
        let values: Vec<f64> = (0..13).map(|i| 100.0 + (i as f64) * 10.0 / 12.0).collect();
        let raw = monthly(&values);
        let out = transform(Some(&raw), TransformKind::YearOverYear).unwrap();

        assert_eq!(out.len(), 1);
        assert!((out.points[0].value - 10.0).abs() < 1e-9);
        assert_eq!(out.points[0].date, raw.points[12].date);
    }

    #[test]
    fn yoy_drops_first_twelve_points() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let raw = monthly(&values);
        let out = transform(Some(&raw), TransformKind::YearOverYear).unwrap();
        assert_eq!(out.len(), 18);
        assert_eq!(out.first_date(), Some(raw.points[12].date));
    }

    #[test]
    fn yoy_with_short_history_is_empty() {
        let raw = monthly(&[100.0; 12]);
        let out = transform(Some(&raw), TransformKind::YearOverYear).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn yoy_drops_points_with_zero_reference() {
        let mut values = vec![100.0; 14];
        values[0] = 0.0;
        let raw = monthly(&values);
        let out = transform(Some(&raw), TransformKind::YearOverYear).unwrap();
        // Point 12 divides by zero and is dropped; point 13 survives.
        assert_eq!(out.len(), 1);
        assert_eq!(out.points[0].date, raw.points[13].date);
        assert_eq!(out.points[0].value, 0.0);
    }

    #[test]
    fn mom_thousands_differences() {
        let raw = monthly(&[150_000.0, 150_250.0, 150_100.0]);
        let out = transform(Some(&raw), TransformKind::MonthOverMonthThousands).unwrap();
        let values: Vec<f64> = out.values().collect();
        assert_eq!(values.len(), 2);
        assert!((values[0] - 0.25).abs() < 1e-12);
        assert!((values[1] + 0.15).abs() < 1e-12);
    }

    #[test]
    fn scaling_transforms() {
        let raw = monthly(&[1_500_000.0]);
        let millions = transform(Some(&raw), TransformKind::Millions).unwrap();
        assert!((millions.points[0].value - 1.5).abs() < 1e-12);
        let thousands = transform(Some(&raw), TransformKind::Thousands).unwrap();
        assert!((thousands.points[0].value - 1500.0).abs() < 1e-12);
    }

    #[test]
    fn no_data_propagates_for_every_kind() {
        let empty = RawSeries::default();
        for kind in TransformKind::ALL {
            assert!(transform(None, kind).is_none());
            assert!(transform(Some(&empty), kind).is_none());
        }
    }

    #[test]
    fn unsorted_input_is_sorted_without_mutation() {
        let mut raw = monthly(&[1.0, 2.0, 3.0]);
        raw.points.reverse();
        let before = raw.clone();
        let out = transform(Some(&raw), TransformKind::MonthOverMonthThousands).unwrap();
        assert_eq!(raw, before);
        assert!(out.points.windows(2).all(|w| w[0].date < w[1].date));
        assert!(out.values().all(|v| (v - 0.001).abs() < 1e-12));
    }

    #[test]
    fn metadata_is_carried_through() {
        let raw = monthly(&[1.0, 2.0]);
        let out = transform(Some(&raw), TransformKind::Thousands).unwrap();
        assert_eq!(out.last_updated.as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn irregular_spacing_counts_skipped_months() {
        let mut raw = monthly(&[1.0; 6]);
        assert_eq!(irregular_spacing(&raw, Frequency::Monthly), 0);
        raw.points.remove(3);
        assert_eq!(irregular_spacing(&raw, Frequency::Monthly), 1);
    }
}
