//! Shared domain types.
//!
//! Plain data, cheap to clone and `Send`, so series can sit in the fetch cache
//! and cross worker threads during parallel loads.

use std::fmt;

use chrono::NaiveDate;

/// Sampling frequency requested from the observation API.
///
/// The remote source does the downsampling; we only pass the code through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Single-letter code used on the wire (`d`, `w`, `m`, `q`).
    pub fn code(self) -> &'static str {
        match self {
            Frequency::Daily => "d",
            Frequency::Weekly => "w",
            Frequency::Monthly => "m",
            Frequency::Quarterly => "q",
        }
    }

    /// Largest gap (in days) between consecutive samples that still counts as
    /// "one period". Used to flag irregular spacing.
    pub fn max_gap_days(self) -> i64 {
        match self {
            // Weekends and market holidays.
            Frequency::Daily => 5,
            Frequency::Weekly => 8,
            Frequency::Monthly => 31,
            Frequency::Quarterly => 92,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        }
    }
}

/// Transform applied to a raw series before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Values unchanged.
    Level,
    /// `(v[t] / v[t-12] - 1) * 100`, positional lookback.
    YearOverYear,
    /// `(v[t] - v[t-1]) / 1000`.
    MonthOverMonthThousands,
    /// `v / 1000`.
    Thousands,
    /// `v / 1_000_000`.
    Millions,
}

impl TransformKind {
    pub const ALL: [TransformKind; 5] = [
        TransformKind::Level,
        TransformKind::YearOverYear,
        TransformKind::MonthOverMonthThousands,
        TransformKind::Thousands,
        TransformKind::Millions,
    ];

    /// Short label used in exports and listings.
    pub fn label(self) -> &'static str {
        match self {
            TransformKind::Level => "level",
            TransformKind::YearOverYear => "yoy",
            TransformKind::MonthOverMonthThousands => "mom_level_k",
            TransformKind::Thousands => "level_thous",
            TransformKind::Millions => "level_millions",
        }
    }
}

/// Registry grouping, used for section headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Prices,
    Labor,
    Activity,
}

impl Category {
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Prices => "Prices",
            Category::Labor => "Labor",
            Category::Activity => "Activity",
        }
    }
}

/// One dated observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ObservationPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A dated series: ascending by date, unique dates, finite values.
///
/// Both the raw (fetched) series and the derived (transformed) series share
/// this shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub points: Vec<ObservationPoint>,
    /// Source-provided "last updated" marker (FRED `realtime_end`).
    pub last_updated: Option<String>,
}

/// Series as returned by the fetcher (owned by the cache).
pub type RawSeries = Series;

/// Series produced by the transform engine (owned by the caller).
pub type DerivedSeries = Series;

impl Series {
    pub fn new(points: Vec<ObservationPoint>, last_updated: Option<String>) -> Self {
        Self {
            points,
            last_updated,
        }
    }

    /// Build a series from unordered points: sorts ascending and keeps the last
    /// point for any repeated date.
    pub fn from_unsorted(mut points: Vec<ObservationPoint>, last_updated: Option<String>) -> Self {
        // Stable sort keeps input order among equal dates, so "last wins" below.
        points.sort_by_key(|p| p.date);
        let mut out: Vec<ObservationPoint> = Vec::with_capacity(points.len());
        for p in points {
            match out.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => out.push(p),
            }
        }
        Self::new(out, last_updated)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

/// Cache key: one entry per (source id, frequency).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub source_id: String,
    pub frequency: Frequency,
}

impl SeriesKey {
    pub fn new(source_id: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            source_id: source_id.into(),
            frequency,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.source_id, self.frequency.code())
    }
}

/// Static description of one dashboard indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorDefinition {
    /// Unique human-readable key.
    pub name: &'static str,
    /// FRED series id.
    pub source_id: &'static str,
    pub frequency: Frequency,
    pub transform: TransformKind,
    pub category: Category,
}

impl IndicatorDefinition {
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.source_id, self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn from_unsorted_sorts_and_keeps_last_duplicate() {
        let series = Series::from_unsorted(
            vec![
                ObservationPoint::new(d(2024, 3, 1), 3.0),
                ObservationPoint::new(d(2024, 1, 1), 1.0),
                ObservationPoint::new(d(2024, 3, 1), 4.0),
                ObservationPoint::new(d(2024, 2, 1), 2.0),
            ],
            None,
        );
        let dates: Vec<_> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 2, 1), d(2024, 3, 1)]);
        assert_eq!(series.points[2].value, 4.0);
    }

    #[test]
    fn series_key_display_uses_frequency_code() {
        let key = SeriesKey::new("UNRATE", Frequency::Monthly);
        assert_eq!(key.to_string(), "UNRATE@m");

        let def = crate::registry::find("Unemployment Rate (%)").unwrap();
        assert_eq!(def.key(), key);
    }
}
