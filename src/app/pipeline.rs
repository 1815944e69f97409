//! Shared "indicator pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! registry definition -> cached fetch -> transform -> card / chart queries
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::warn;

use crate::config::Settings;
use crate::data::{CachedSeries, FredClient, ObservationSource, SeriesFetcher};
use crate::domain::{DerivedSeries, IndicatorDefinition, TransformKind};
use crate::error::{AppError, FetchError};
use crate::transform::{self, irregular_spacing, latest_value, pct_change_latest, window};

/// Outcome of loading one indicator.
///
/// The raw and derived series are always produced together by one `load`
/// call, so a view never mixes data from different refreshes.
#[derive(Debug, Clone)]
pub struct IndicatorView {
    pub definition: &'static IndicatorDefinition,
    pub raw: CachedSeries,
    pub derived: Option<DerivedSeries>,
    /// Set only when the request made during this load failed.
    pub error: Option<FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Ready,
    NoData,
    Failed,
}

/// "Latest print" summary for a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Card {
    pub value: f64,
    pub as_of: NaiveDate,
    /// Percent change vs the prior sample; only for level indicators.
    pub delta_pct: Option<f64>,
}

impl IndicatorView {
    pub fn status(&self) -> ViewStatus {
        if self.error.is_some() {
            ViewStatus::Failed
        } else if self.derived.as_ref().is_some_and(|s| !s.is_empty()) {
            ViewStatus::Ready
        } else {
            ViewStatus::NoData
        }
    }

    pub fn card(&self) -> Option<Card> {
        let series = self.derived.as_ref()?;
        let (value, as_of) = latest_value(series)?;
        let delta_pct = match self.definition.transform {
            TransformKind::Level => pct_change_latest(series, 1),
            _ => None,
        };
        Some(Card {
            value,
            as_of,
            delta_pct,
        })
    }

    /// Derived series cut to the chart lookback window; `None` if empty.
    pub fn chart(&self, lookback_years: u32, today: NaiveDate) -> Option<DerivedSeries> {
        let series = self.derived.as_ref()?;
        let cut = window(series, lookback_years, today);
        (!cut.is_empty()).then_some(cut)
    }
}

pub struct Pipeline<S> {
    fetcher: SeriesFetcher<S>,
}

impl Pipeline<FredClient> {
    /// Pipeline backed by the live FRED API.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let client = FredClient::from_settings(settings)?;
        Ok(Self::new(SeriesFetcher::new(client, settings)))
    }
}

impl<S: ObservationSource> Pipeline<S> {
    pub fn new(fetcher: SeriesFetcher<S>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &SeriesFetcher<S> {
        &self.fetcher
    }

    /// Fetch + transform one indicator. Never fails: errors are carried in the view.
    pub fn load(&self, definition: &'static IndicatorDefinition) -> IndicatorView {
        let raw = match self.fetcher.fetch(definition.source_id, definition.frequency) {
            Ok(raw) => raw,
            Err(error) => {
                return IndicatorView {
                    definition,
                    raw: None,
                    derived: None,
                    error: Some(error),
                };
            }
        };

        if definition.transform == TransformKind::YearOverYear {
            if let Some(series) = raw.as_deref() {
                let gaps = irregular_spacing(series, definition.frequency);
                if gaps > 0 {
                    warn!(
                        indicator = definition.name,
                        gaps, "irregular sample spacing; 12-sample lookback is not a calendar year"
                    );
                }
            }
        }

        let derived = transform::transform(raw.as_deref(), definition.transform);
        IndicatorView {
            definition,
            raw,
            derived,
            error: None,
        }
    }

    /// Load several indicators in parallel. Output order matches `definitions`.
    pub fn load_all(&self, definitions: &[&'static IndicatorDefinition]) -> Vec<IndicatorView> {
        definitions.par_iter().map(|def| self.load(*def)).collect()
    }

    /// Invalidate every cached series.
    pub fn clear_cache(&self) {
        self.fetcher.clear();
    }
}
