//! Auto-refresh gate: refresh every minute during US market hours.

use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

use crate::config::eastern;

pub const MARKET_HOURS_INTERVAL: Duration = Duration::from_secs(60);

/// Refresh interval at `now` (any timezone), or `None` outside market hours.
///
/// Market hours are weekdays, 08:00 through 17:30 Eastern.
pub fn auto_refresh_interval(now: DateTime<FixedOffset>) -> Option<Duration> {
    let et = now.with_timezone(&eastern());
    let weekday = !matches!(et.weekday(), Weekday::Sat | Weekday::Sun);
    let (hour, minute) = (et.hour(), et.minute());
    let in_hours = hour > 7 && (hour < 17 || (hour == 17 && minute <= 30));
    (weekday && in_hours).then_some(MARKET_HOURS_INTERVAL)
}

pub fn auto_refresh_interval_now() -> Option<Duration> {
    auto_refresh_interval(Utc::now().fixed_offset())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn et(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        eastern().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn active_during_weekday_market_hours() {
        // 2025-01-15 is a Wednesday.
        assert_eq!(auto_refresh_interval(et(2025, 1, 15, 8, 0)), Some(MARKET_HOURS_INTERVAL));
        assert_eq!(auto_refresh_interval(et(2025, 1, 15, 17, 30)), Some(MARKET_HOURS_INTERVAL));
    }

    #[test]
    fn inactive_outside_hours_and_weekends() {
        assert_eq!(auto_refresh_interval(et(2025, 1, 15, 7, 59)), None);
        assert_eq!(auto_refresh_interval(et(2025, 1, 15, 17, 31)), None);
        assert_eq!(auto_refresh_interval(et(2025, 1, 18, 12, 0)), None);
    }

    #[test]
    fn converts_from_other_offsets() {
        // 13:00 UTC is 09:00 Eastern.
        let utc = Utc.with_ymd_and_hms(2025, 1, 15, 13, 0, 0).unwrap().fixed_offset();
        assert!(auto_refresh_interval(utc).is_some());
        // 03:00 UTC is 23:00 Eastern the previous day.
        let utc = Utc.with_ymd_and_hms(2025, 1, 15, 3, 0, 0).unwrap().fixed_offset();
        assert!(auto_refresh_interval(utc).is_none());
    }
}
