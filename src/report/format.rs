//! Formatted terminal output: cards, chart captions, calendar tables,
//! diagnostics.
//!
//! We keep formatting code in one place so:
//! - the fetch/transform code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use chrono::{DateTime, Utc};

use crate::app::pipeline::{IndicatorView, ViewStatus};
use crate::config::Settings;
use crate::data::calendar::{CalendarEvent, UPCOMING_LIMIT, upcoming};
use crate::data::fred::ObservationsResponse;
use crate::domain::{Category, DerivedSeries};
use crate::error::FetchError;
use crate::registry::INDICATORS;
use crate::transform::latest_value;

/// Placeholder for a missing number.
pub const MISSING: &str = "—";

pub const NO_DATA_MESSAGE: &str = "No data or API key missing.";
pub const CALENDAR_DISABLED_MESSAGE: &str =
    "Add a Trading Economics API key (TE_API_KEY) to show the real-time calendar.";

pub fn format_val(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => MISSING.to_string(),
    }
}

/// One-line summary body for a card (without the title).
pub fn card_line(view: &IndicatorView) -> String {
    match (view.status(), view.card()) {
        (ViewStatus::Failed, _) => match &view.error {
            Some(err) => format!("Error: {err}"),
            None => NO_DATA_MESSAGE.to_string(),
        },
        (_, Some(card)) => {
            let mut line = format!("{} (as of {})", format_val(Some(card.value), 2), card.as_of);
            if let Some(delta) = card.delta_pct {
                line.push_str(&format!("  {}% vs prior", format_val(Some(delta), 2)));
            }
            line
        }
        (_, None) => NO_DATA_MESSAGE.to_string(),
    }
}

/// All cards, grouped by category in registry order.
pub fn format_cards(views: &[IndicatorView]) -> String {
    let mut out = String::new();
    out.push_str("=== U.S. Macro Dashboard ===\n");

    for category in [Category::Prices, Category::Labor, Category::Activity] {
        let in_cat: Vec<&IndicatorView> = views
            .iter()
            .filter(|v| v.definition.category == category)
            .collect();
        if in_cat.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}:\n", category.display_name()));
        for view in in_cat {
            out.push_str(&format!("  {:<32} {}\n", view.definition.name, card_line(view)));
        }
    }

    out
}

pub fn chart_caption(name: &str, series: &DerivedSeries) -> String {
    match latest_value(series) {
        Some((value, date)) => format!("Latest {name}: {} (as of {date})", format_val(Some(value), 2)),
        None => format!("No data for {name}."),
    }
}

/// "Next up" and full-range tables.
pub fn format_calendar(events: &[CalendarEvent], now: DateTime<Utc>) -> String {
    if events.is_empty() {
        return "No events returned.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("Next Up (ET):\n");
    let next: Vec<&CalendarEvent> = upcoming(events, now, UPCOMING_LIMIT);
    if next.is_empty() {
        out.push_str("  (none)\n");
    } else {
        out.push_str(&calendar_table(next.into_iter()));
    }

    out.push_str("\nThis Week — Details:\n");
    out.push_str(&calendar_table(events.iter()));
    out
}

fn calendar_table<'a>(events: impl Iterator<Item = &'a CalendarEvent>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<22} {:<28} {:<8} {:>10} {:>10} {:>10} {:>3}\n",
        "Date", "Event", "Ref", "Actual", "Previous", "Forecast", "Imp"
    ));
    for e in events {
        out.push_str(&format!(
            "{:<22} {:<28} {:<8} {:>10} {:>10} {:>10} {:>3}\n",
            e.display_time(),
            truncate(&e.event, 28),
            truncate(&e.reference, 8),
            or_missing(&e.actual),
            or_missing(&e.previous),
            or_missing(&e.forecast),
            e.importance.map(|i| i.to_string()).unwrap_or_else(|| MISSING.to_string()),
        ));
    }
    out
}

/// Key presence plus the outcome of a connectivity probe.
pub fn format_diagnostics(settings: &Settings, probe: &Result<ObservationsResponse, FetchError>) -> String {
    let mut out = String::new();
    out.push_str(&format!("FRED key present: {}\n", settings.has_fred_key()));
    out.push_str(&format!("TradingEconomics key present: {}\n", settings.has_calendar_key()));

    match probe {
        Ok(resp) => {
            out.push_str("FRED request OK.\n");
            out.push_str(&format!(
                "  realtime_start: {}\n  realtime_end: {}\n  observations: {}\n",
                resp.realtime_start.as_deref().unwrap_or(MISSING),
                resp.realtime_end.as_deref().unwrap_or(MISSING),
                resp.observations.len()
            ));
            if let Some(last) = resp.observations.last() {
                out.push_str(&format!(
                    "  last: {} = {}\n",
                    last.date().map(|d| d.to_string()).unwrap_or_else(|| MISSING.to_string()),
                    format_val(last.value(), 2)
                ));
            }
        }
        Err(FetchError::Remote { status, excerpt }) => {
            out.push_str(&format!("HTTP status: {status}\n"));
            out.push_str(&format!("FRED error: {excerpt}\n"));
        }
        Err(err) => out.push_str(&format!("FRED request failed: {err}\n")),
    }
    out
}

/// Table of every registered indicator.
pub fn format_registry() -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<32} {:<16} {:<10} {:<15} {}\n",
        "Indicator", "Series", "Freq", "Transform", "Category"
    ));
    for def in INDICATORS {
        out.push_str(&format!(
            "{:<32} {:<16} {:<10} {:<15} {}\n",
            def.name,
            def.source_id,
            def.frequency.display_name(),
            def.transform.label(),
            def.category.display_name()
        ));
    }
    out
}

fn or_missing(s: &str) -> &str {
    if s.is_empty() { MISSING } else { s }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::ObservationPoint;
    use crate::registry;

    fn view(name: &str, values: &[f64], error: Option<FetchError>) -> IndicatorView {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| ObservationPoint::new(NaiveDate::from_ymd_opt(2024, i as u32 + 1, 1).unwrap(), v))
            .collect();
        IndicatorView {
            definition: registry::find(name).unwrap(),
            raw: None,
            derived: Some(DerivedSeries::new(points, None)),
            error,
        }
    }

    #[test]
    fn format_val_uses_placeholder() {
        assert_eq!(format_val(None, 2), MISSING);
        assert_eq!(format_val(Some(f64::NAN), 2), MISSING);
        assert_eq!(format_val(Some(3.14159), 2), "3.14");
        assert_eq!(format_val(Some(2.0), 1), "2.0");
    }

    #[test]
    fn level_card_line_includes_delta() {
        let v = view("Unemployment Rate (%)", &[4.0, 4.2], None);
        assert_eq!(card_line(&v), "4.20 (as of 2024-02-01)  5.00% vs prior");
    }

    #[test]
    fn yoy_card_line_has_no_delta() {
        let v = view("CPI (YoY, %)", &[3.0, 2.9], None);
        assert_eq!(card_line(&v), "2.90 (as of 2024-02-01)");
    }

    #[test]
    fn failed_card_shows_error() {
        let v = view("CPI (YoY, %)", &[], Some(FetchError::remote(500, "boom")));
        assert!(card_line(&v).starts_with("Error: request failed: 500"));
    }

    #[test]
    fn empty_card_shows_no_data() {
        let v = view("CPI (YoY, %)", &[], None);
        assert_eq!(card_line(&v), NO_DATA_MESSAGE);
    }

    #[test]
    fn cards_are_grouped() {
        let views = vec![
            view("CPI (YoY, %)", &[2.9], None),
            view("Unemployment Rate (%)", &[4.1], None),
        ];
        let out = format_cards(&views);
        assert!(out.contains("\nPrices:\n"));
        assert!(out.contains("\nLabor:\n"));
        assert!(!out.contains("Activity:"));
    }

    #[test]
    fn chart_caption_for_empty_series() {
        assert_eq!(chart_caption("CPI", &DerivedSeries::default()), "No data for CPI.");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
