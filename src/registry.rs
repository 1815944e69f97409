//! Static indicator registry (FRED series ids).
//!
//! Adding an indicator is a one-line change here; nothing else in the crate
//! enumerates indicators by hand.

use crate::domain::{Category, Frequency, IndicatorDefinition, TransformKind};

const fn ind(
    name: &'static str,
    source_id: &'static str,
    frequency: Frequency,
    transform: TransformKind,
    category: Category,
) -> IndicatorDefinition {
    IndicatorDefinition {
        name,
        source_id,
        frequency,
        transform,
        category,
    }
}

use Category::{Activity, Labor, Prices};
use Frequency::{Monthly, Quarterly, Weekly};
use TransformKind::{Level, Millions, MonthOverMonthThousands, Thousands, YearOverYear};

/// All dashboard indicators, in display order.
pub const INDICATORS: &[IndicatorDefinition] = &[
    ind("CPI (YoY, %)", "CPIAUCSL", Monthly, YearOverYear, Prices),
    ind("Core CPI (YoY, %)", "CPILFESL", Monthly, YearOverYear, Prices),
    ind("PCE (YoY, %)", "PCEPI", Monthly, YearOverYear, Prices),
    ind("Core PCE (YoY, %)", "PCEPILFE", Monthly, YearOverYear, Prices),
    ind("PPI All Commodities (YoY, %)", "PPIACO", Monthly, YearOverYear, Prices),
    ind("Nonfarm Payrolls (k, m/m)", "PAYEMS", Monthly, MonthOverMonthThousands, Labor),
    ind("Unemployment Rate (%)", "UNRATE", Monthly, Level, Labor),
    ind("Avg Hourly Earnings (YoY, %)", "CES0500000003", Monthly, YearOverYear, Labor),
    ind("Initial Jobless Claims (thous)", "ICSA", Weekly, Thousands, Labor),
    ind("Job Openings, JOLTS (millions)", "JTSJOL", Monthly, Millions, Labor),
    ind("Retail Sales (YoY, %)", "RSAFS", Monthly, YearOverYear, Activity),
    ind("ISM Manufacturing PMI", "NAPM", Monthly, Level, Activity),
    // Non-manufacturing business activity.
    ind("ISM Services PMI", "NMFBS", Monthly, Level, Activity),
    ind("Real GDP (QoQ SAAR, %)", "A191RL1Q225SBEA", Quarterly, Level, Activity),
];

/// Indicators charted when the user has not picked any.
pub const DEFAULT_CHARTS: [&str; 3] = ["CPI (YoY, %)", "Core PCE (YoY, %)", "Unemployment Rate (%)"];

/// Look up an indicator by display name (exact, then case-insensitive).
pub fn find(name: &str) -> Option<&'static IndicatorDefinition> {
    INDICATORS
        .iter()
        .find(|i| i.name == name)
        .or_else(|| INDICATORS.iter().find(|i| i.name.eq_ignore_ascii_case(name)))
}

/// Look up an indicator by FRED series id (case-insensitive).
pub fn find_by_source(source_id: &str) -> Option<&'static IndicatorDefinition> {
    INDICATORS
        .iter()
        .find(|i| i.source_id.eq_ignore_ascii_case(source_id))
}

/// Resolve a user-supplied name or series id.
pub fn resolve(query: &str) -> Option<&'static IndicatorDefinition> {
    find(query).or_else(|| find_by_source(query))
}

pub fn default_charts() -> Vec<&'static IndicatorDefinition> {
    DEFAULT_CHARTS.iter().filter_map(|name| find(name)).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = INDICATORS.iter().map(|i| i.name).collect();
        assert_eq!(names.len(), INDICATORS.len());
    }

    #[test]
    fn defaults_resolve() {
        assert_eq!(default_charts().len(), DEFAULT_CHARTS.len());
    }

    #[test]
    fn resolve_accepts_series_id() {
        let def = resolve("unrate").unwrap();
        assert_eq!(def.name, "Unemployment Rate (%)");
        assert_eq!(def.transform, TransformKind::Level);
    }

    #[test]
    fn claims_are_weekly_thousands() {
        let def = find("Initial Jobless Claims (thous)").unwrap();
        assert_eq!(def.frequency, Frequency::Weekly);
        assert_eq!(def.transform, TransformKind::Thousands);
    }
}
