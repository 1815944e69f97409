//! Remote data sources: FRED observations (cached) and the optional
//! Trading Economics calendar.

pub mod cache;
pub mod calendar;
pub mod fetcher;
pub mod fred;

pub use calendar::{CalendarClient, CalendarEvent};
pub use fetcher::{CachedSeries, SeriesFetcher};
pub use fred::{FredClient, ObservationRequest, ObservationSource, ObservationsResponse};
