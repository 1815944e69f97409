//! Command-line parsing for the macro dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/transform code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_LOOKBACK_YEARS;
use crate::data::calendar::MAX_RANGE_DAYS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "macro", version, about = "U.S. Macro Dashboard (FRED-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (cards, chart, calendar).
    Tui(DashArgs),
    /// Print the latest value card for every indicator.
    Cards(DashArgs),
    /// Print ASCII charts for the given indicators (names or FRED ids).
    Chart(ChartArgs),
    /// Print the upcoming U.S. releases calendar.
    Calendar(CalendarArgs),
    /// Check API keys and FRED connectivity.
    Diagnose,
    /// Export an indicator's derived series to CSV.
    Export(ExportArgs),
    /// List registered indicators.
    List,
}

/// Options shared by the dashboard views.
#[derive(Debug, Args, Clone)]
pub struct DashArgs {
    /// Chart lookback in years (clamped to 2..=25).
    #[arg(short = 'y', long, default_value_t = DEFAULT_LOOKBACK_YEARS)]
    pub lookback_years: u32,

    /// Series cache time-to-live in seconds.
    #[arg(long, default_value_t = 60)]
    pub ttl_secs: u64,
}

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Indicators to chart (display names or FRED series ids). Defaults to
    /// CPI, Core PCE and the unemployment rate.
    pub names: Vec<String>,

    #[command(flatten)]
    pub dash: DashArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CalendarArgs {
    /// Days before today to include.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(0..=MAX_RANGE_DAYS))]
    pub days_back: i64,

    /// Days after today to include.
    #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(i64).range(0..=MAX_RANGE_DAYS))]
    pub days_ahead: i64,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Indicator (display name or FRED series id).
    pub name: String,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Restrict the export to the chart lookback window.
    #[arg(short = 'y', long)]
    pub lookback_years: Option<u32>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chart_accepts_multiple_names() {
        let cli = Cli::parse_from(["macro", "chart", "UNRATE", "CPI (YoY, %)", "-y", "10"]);
        let Command::Chart(args) = cli.command else {
            panic!("expected chart");
        };
        assert_eq!(args.names, vec!["UNRATE", "CPI (YoY, %)"]);
        assert_eq!(args.dash.lookback_years, 10);
    }

    #[test]
    fn calendar_rejects_out_of_range_days() {
        assert!(Cli::try_parse_from(["macro", "calendar", "--days-ahead", "9999999999999"]).is_err());
        assert!(Cli::try_parse_from(["macro", "calendar", "--days-back", "-1"]).is_err());
        let cli = Cli::parse_from(["macro", "calendar", "--days-ahead", "30"]);
        let Command::Calendar(args) = cli.command else {
            panic!("expected calendar");
        };
        assert_eq!((args.days_back, args.days_ahead), (1, 30));
    }

    #[test]
    fn export_requires_out() {
        assert!(Cli::try_parse_from(["macro", "export", "UNRATE"]).is_err());
    }
}
