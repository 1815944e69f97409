//! Runtime settings: API keys from the environment (`.env` supported) plus
//! fetch/caching knobs.

use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

pub const FRED_KEY_VAR: &str = "FRED_API_KEY";
pub const TE_KEY_VAR: &str = "TE_API_KEY";

pub const MIN_LOOKBACK_YEARS: u32 = 2;
pub const MAX_LOOKBACK_YEARS: u32 = 25;
pub const DEFAULT_LOOKBACK_YEARS: u32 = 5;

/// US Eastern as a fixed UTC-4 offset (daylight time; no DST switching).
pub const EASTERN_OFFSET_HOURS: i32 = -4;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
const DEFAULT_CALENDAR_TTL: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` disables FRED fetches; each card then reports the missing key.
    pub fred_api_key: Option<String>,
    /// `None` disables the calendar.
    pub te_api_key: Option<String>,
    /// First observation date requested from FRED.
    pub observation_start: NaiveDate,
    pub cache_ttl: Duration,
    pub calendar_ttl: Duration,
    pub request_timeout: Duration,
    /// Chart window, always within `MIN_LOOKBACK_YEARS..=MAX_LOOKBACK_YEARS`.
    pub lookback_years: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            te_api_key: None,
            observation_start: default_observation_start(),
            cache_ttl: DEFAULT_CACHE_TTL,
            calendar_ttl: DEFAULT_CALENDAR_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            lookback_years: DEFAULT_LOOKBACK_YEARS,
        }
    }
}

impl Settings {
    /// Load keys from `.env` / the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            fred_api_key: non_empty_var(FRED_KEY_VAR),
            te_api_key: non_empty_var(TE_KEY_VAR),
            ..Self::default()
        }
    }

    pub fn with_lookback_years(mut self, years: u32) -> Self {
        self.lookback_years = clamp_lookback(years);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn has_fred_key(&self) -> bool {
        self.fred_api_key.is_some()
    }

    pub fn has_calendar_key(&self) -> bool {
        self.te_api_key.is_some()
    }
}

pub fn clamp_lookback(years: u32) -> u32 {
    years.clamp(MIN_LOOKBACK_YEARS, MAX_LOOKBACK_YEARS)
}

/// The fixed US Eastern offset used for market hours and calendar display.
pub fn eastern() -> FixedOffset {
    FixedOffset::east_opt(EASTERN_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

fn default_observation_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_is_clamped() {
        assert_eq!(Settings::default().with_lookback_years(1).lookback_years, 2);
        assert_eq!(Settings::default().with_lookback_years(40).lookback_years, 25);
        assert_eq!(Settings::default().with_lookback_years(10).lookback_years, 10);
    }

    #[test]
    fn defaults_match_dashboard() {
        let s = Settings::default();
        assert_eq!(s.cache_ttl, Duration::from_secs(60));
        assert_eq!(s.request_timeout, Duration::from_secs(15));
        assert_eq!(s.observation_start.to_string(), "2000-01-01");
        assert_eq!(s.lookback_years, 5);
    }
}
