//! Cached series fetcher.
//!
//! `fetch` is read-through: a fresh cache entry answers without touching the
//! network; otherwise one request is issued and its outcome (series, "no
//! data", or failure-as-no-data) is cached for the TTL window.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::data::cache::TtlCache;
use crate::data::fred::{ObservationRequest, ObservationSource, ObservationsResponse};
use crate::domain::{Frequency, ObservationPoint, RawSeries, SeriesKey};
use crate::error::FetchError;

/// Shared handle to a cached raw series. `None` means "no data available".
pub type CachedSeries = Option<Arc<RawSeries>>;

pub struct SeriesFetcher<S> {
    source: S,
    observation_start: NaiveDate,
    cache: TtlCache<SeriesKey, CachedSeries>,
}

impl<S: ObservationSource> SeriesFetcher<S> {
    pub fn new(source: S, settings: &Settings) -> Self {
        Self {
            source,
            observation_start: settings.observation_start,
            cache: TtlCache::new(settings.cache_ttl),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one series.
    ///
    /// - `Ok(Some(_))`: at least one valid point.
    /// - `Ok(None)`: no data (empty response, or a failure already reported
    ///   within the current TTL window).
    /// - `Err(_)`: the request issued by this call failed. The failure is
    ///   cached as "no data" so it is reported once per window.
    pub fn fetch(&self, source_id: &str, frequency: Frequency) -> Result<CachedSeries, FetchError> {
        self.fetch_at(source_id, frequency, Instant::now())
    }

    pub fn fetch_at(&self, source_id: &str, frequency: Frequency, now: Instant) -> Result<CachedSeries, FetchError> {
        let source_id = source_id.trim();
        if source_id.is_empty() {
            return Err(FetchError::InvalidRequest("empty series id".to_string()));
        }

        let key = SeriesKey::new(source_id, frequency);
        if let Some(hit) = self.cache.get(&key, now) {
            debug!(series = %key, cached = hit.is_some(), "cache hit");
            return Ok(hit);
        }

        let request = ObservationRequest {
            series_id: source_id,
            frequency,
            start: self.observation_start,
        };
        debug!(series = %key, start = %request.start, "fetching observations");

        match self.source.observations(&request) {
            Ok(resp) => {
                let series = normalize(resp).map(Arc::new);
                match &series {
                    Some(s) => info!(series = %key, points = s.len(), "fetched series"),
                    None => info!(series = %key, "no observations returned"),
                }
                self.cache.insert(key, series.clone(), now);
                Ok(series)
            }
            Err(err) => {
                warn!(series = %key, error = %err, "series fetch failed");
                self.cache.insert(key, None, now);
                Err(err)
            }
        }
    }

    /// Invalidate every cached series.
    pub fn clear(&self) {
        info!(entries = self.cache.len(), "clearing series cache");
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

/// Turn a decoded body into a canonical raw series.
///
/// Records with an unparseable date or value are dropped individually.
/// Returns `None` when no valid point remains.
pub fn normalize(resp: ObservationsResponse) -> Option<RawSeries> {
    let total = resp.observations.len();
    let points: Vec<ObservationPoint> = resp
        .observations
        .iter()
        .filter_map(|obs| Some(ObservationPoint::new(obs.date()?, obs.value()?)))
        .collect();

    let dropped = total - points.len();
    if dropped > 0 {
        debug!(dropped, total, "dropped unparseable observations");
    }

    if points.is_empty() {
        return None;
    }
    Some(RawSeries::from_unsorted(points, resp.realtime_end))
}
