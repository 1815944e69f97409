//! Trading Economics economic calendar (optional).
//!
//! Only active when `TE_API_KEY` is configured; otherwise every call returns
//! `FetchError::MissingConfiguration` and the UI shows a notice instead.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{Settings, TE_KEY_VAR, eastern};
use crate::data::cache::TtlCache;
use crate::error::FetchError;

const BASE_URL: &str = "https://api.tradingeconomics.com/calendar/country/united%20states";

/// Events within this many minutes in the past still count as "next up".
const UPCOMING_GRACE_MINUTES: i64 = 5;
pub const UPCOMING_LIMIT: usize = 15;

/// Display format for event times (ET).
pub const EVENT_TIME_FORMAT: &str = "%a %b %d, %I:%M %p";

/// One calendar record, with its time converted to US Eastern.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub date: DateTime<FixedOffset>,
    pub country: String,
    pub category: String,
    pub event: String,
    pub reference: String,
    pub actual: String,
    pub previous: String,
    pub forecast: String,
    pub importance: Option<i64>,
}

impl CalendarEvent {
    pub fn display_time(&self) -> String {
        self.date.format(EVENT_TIME_FORMAT).to_string()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEvent {
    date: Option<String>,
    #[serde(default)]
    country: serde_json::Value,
    #[serde(default)]
    category: serde_json::Value,
    #[serde(default)]
    event: serde_json::Value,
    #[serde(default)]
    reference: serde_json::Value,
    #[serde(default)]
    actual: serde_json::Value,
    #[serde(default)]
    previous: serde_json::Value,
    #[serde(default)]
    forecast: serde_json::Value,
    #[serde(default)]
    importance: serde_json::Value,
}

pub struct CalendarClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    cache: TtlCache<(NaiveDate, NaiveDate), Arc<Vec<CalendarEvent>>>,
}

impl CalendarClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: settings.te_api_key.clone(),
            base_url: BASE_URL.to_string(),
            cache: TtlCache::new(settings.calendar_ttl),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Events between `start` and `end` (inclusive), sorted by time.
    ///
    /// Successful results are cached for the calendar TTL; failures are not.
    pub fn events(&self, start: NaiveDate, end: NaiveDate) -> Result<Arc<Vec<CalendarEvent>>, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingConfiguration(TE_KEY_VAR))?;

        let now = Instant::now();
        if let Some(hit) = self.cache.get(&(start, end), now) {
            debug!(%start, %end, "calendar cache hit");
            return Ok(hit);
        }

        let d1 = start.to_string();
        let d2 = end.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("d1", d1.as_str()), ("d2", d2.as_str()), ("c", api_key), ("format", "json")])
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| FetchError::Transport(format!("failed to read body: {e}")))?;
        if !status.is_success() {
            let err = FetchError::remote(status.as_u16(), &body);
            warn!(error = %err, "calendar fetch failed");
            return Err(err);
        }

        let events = Arc::new(parse_events(&body)?);
        self.cache.insert((start, end), events.clone(), now);
        Ok(events)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Largest `days_back` / `days_ahead` accepted for a calendar range.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Date range shown by the dashboard: yesterday through a week ahead.
///
/// Offsets are clamped to `0..=MAX_RANGE_DAYS`.
pub fn default_range(today: NaiveDate, days_back: i64, days_ahead: i64) -> (NaiveDate, NaiveDate) {
    let offset = |days: i64| Duration::try_days(days.clamp(0, MAX_RANGE_DAYS)).unwrap_or(Duration::zero());
    let start = today.checked_sub_signed(offset(days_back)).unwrap_or(today);
    let end = today.checked_add_signed(offset(days_ahead)).unwrap_or(today);
    (start, end)
}

/// Decode a calendar body into events sorted by time.
///
/// Records without a parseable date are skipped.
pub fn parse_events(body: &str) -> Result<Vec<CalendarEvent>, FetchError> {
    let raw: Option<Vec<RawEvent>> = serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let et = eastern();
    let mut events: Vec<CalendarEvent> = raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            let date = parse_event_time(r.date.as_deref()?)?.with_timezone(&et);
            Some(CalendarEvent {
                date,
                country: text(&r.country),
                category: text(&r.category),
                event: text(&r.event),
                reference: text(&r.reference),
                actual: text(&r.actual),
                previous: text(&r.previous),
                forecast: text(&r.forecast),
                importance: r.importance.as_i64(),
            })
        })
        .collect();
    events.sort_by_key(|e| e.date);
    Ok(events)
}

/// Events at or after `now` minus the grace window, at most `limit`.
pub fn upcoming<'a>(events: &'a [CalendarEvent], now: DateTime<Utc>, limit: usize) -> Vec<&'a CalendarEvent> {
    let cutoff = now - Duration::minutes(UPCOMING_GRACE_MINUTES);
    events.iter().filter(|e| e.date >= cutoff).take(limit).collect()
}

/// Parse an event timestamp. Naive timestamps are taken as UTC.
fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"Date": "2025-01-15T13:30:00", "Country": "United States", "Category": "Inflation Rate",
         "Event": "Inflation Rate YoY", "Reference": "Dec", "Actual": "2.9%", "Previous": "2.7%",
         "Forecast": "2.9%", "Importance": 3},
        {"Date": "2025-01-14T13:30:00", "Country": "United States", "Category": "Producer Prices",
         "Event": "PPI MoM", "Reference": "Dec", "Actual": null, "Previous": 0.4,
         "Forecast": "0.3%", "Importance": 2},
        {"Date": null, "Event": "Undated"}
    ]"#;

    #[test]
    fn parses_sorts_and_converts_to_eastern() {
        let events = parse_events(BODY).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "PPI MoM");
        assert_eq!(events[0].previous, "0.4");
        assert_eq!(events[0].actual, "");
        assert_eq!(events[1].importance, Some(3));
        // 13:30 UTC is 09:30 at UTC-4.
        assert_eq!(events[1].display_time(), "Wed Jan 15, 09:30 AM");
    }

    #[test]
    fn null_body_is_empty() {
        assert!(parse_events("null").unwrap().is_empty());
        assert!(parse_events("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_decode_error() {
        assert!(matches!(parse_events("{\"Message\": 1}"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn upcoming_keeps_recent_and_future_events() {
        let events = parse_events(BODY).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 13, 33, 0).unwrap();
        let next = upcoming(&events, now, UPCOMING_LIMIT);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].event, "Inflation Rate YoY");

        let later = Utc.with_ymd_and_hms(2025, 1, 15, 13, 36, 0).unwrap();
        assert!(upcoming(&events, later, UPCOMING_LIMIT).is_empty());
    }

    #[test]
    fn default_range_spans_yesterday_to_next_week() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (d1, d2) = default_range(today, 1, 7);
        assert_eq!(d1.to_string(), "2025-01-14");
        assert_eq!(d2.to_string(), "2025-01-22");
    }

    #[test]
    fn range_offsets_are_clamped() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (d1, d2) = default_range(today, i64::MAX, i64::MIN);
        assert_eq!(d1, today - Duration::days(MAX_RANGE_DAYS));
        assert_eq!(d2, today);
    }

    #[test]
    fn disabled_without_key() {
        let client = CalendarClient::from_settings(&Settings::default()).unwrap();
        assert!(!client.is_enabled());
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let err = client.events(today, today).unwrap_err();
        assert_eq!(err, FetchError::MissingConfiguration(TE_KEY_VAR));
    }
}
