//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads settings and initializes logging
//! - builds the fetch pipeline
//! - prints cards/charts/calendar or launches the TUI

use std::time::Duration;

use chrono::{Local, Utc};
use clap::Parser;
use tracing::info;

use crate::cli::{CalendarArgs, ChartArgs, Command, DashArgs, ExportArgs};
use crate::config::Settings;
use crate::data::calendar::{self, CalendarClient};
use crate::data::FredClient;
use crate::domain::IndicatorDefinition;
use crate::error::{AppError, FetchError};
use crate::registry;

pub mod pipeline;
pub mod refresh;

/// Entry point for the `macro` binary.
pub fn run() -> Result<(), AppError> {
    // We want `macro` and `macro -y 10` to behave like `macro tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Cards(args) => handle_cards(args),
        Command::Chart(args) => handle_chart(args),
        Command::Calendar(args) => handle_calendar(args),
        Command::Diagnose => handle_diagnose(),
        Command::Export(args) => handle_export(args),
        Command::List => {
            print!("{}", crate::report::format_registry());
            Ok(())
        }
    }
}

pub fn settings_from_args(args: &DashArgs) -> Settings {
    Settings::from_env()
        .with_lookback_years(args.lookback_years)
        .with_cache_ttl(Duration::from_secs(args.ttl_secs))
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    crate::logging::init_file(std::path::Path::new(crate::logging::TUI_LOG_FILE))?;
    let settings = settings_from_args(&args);
    info!(lookback_years = settings.lookback_years, "starting dashboard");
    crate::tui::run(settings)
}

fn handle_cards(args: DashArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let settings = settings_from_args(&args);
    let pipeline = pipeline::Pipeline::from_settings(&settings)?;

    let defs: Vec<&'static IndicatorDefinition> = registry::INDICATORS.iter().collect();
    let views = pipeline.load_all(&defs);
    print!("{}", crate::report::format_cards(&views));
    Ok(())
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let settings = settings_from_args(&args.dash);
    let defs = resolve_names(&args.names)?;
    let pipeline = pipeline::Pipeline::from_settings(&settings)?;
    let today = Local::now().date_naive();

    for view in pipeline.load_all(&defs) {
        let name = view.definition.name;
        if let Some(err) = &view.error {
            println!("{name}: {err}\n");
            continue;
        }
        match view.chart(settings.lookback_years, today) {
            Some(series) => {
                print!("{}", crate::plot::render_series_plot(name, &series, args.width, args.height));
                println!("{}\n", crate::report::chart_caption(name, &series));
            }
            None => println!("No data for {name}.\n"),
        }
    }
    Ok(())
}

fn handle_calendar(args: CalendarArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let settings = Settings::from_env();
    let client = CalendarClient::from_settings(&settings)?;
    if !client.is_enabled() {
        println!("{}", crate::report::CALENDAR_DISABLED_MESSAGE);
        return Ok(());
    }

    let (d1, d2) = calendar::default_range(Local::now().date_naive(), args.days_back, args.days_ahead);
    println!("=== Upcoming U.S. Releases ({d1} .. {d2}) ===");
    let events = client.events(d1, d2)?;
    print!("{}", crate::report::format_calendar(&events, Utc::now()));
    Ok(())
}

fn handle_diagnose() -> Result<(), AppError> {
    crate::logging::init_stderr();
    let settings = Settings::from_env();
    let client = FredClient::from_settings(&settings)?;
    let probe = client.probe();
    print!("{}", crate::report::format_diagnostics(&settings, &probe));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    crate::logging::init_stderr();
    let def = registry::resolve(&args.name)
        .ok_or_else(|| AppError::new(2, format!("Unknown indicator '{}'. Try `macro list`.", args.name)))?;

    let settings = Settings::from_env();
    let pipeline = pipeline::Pipeline::from_settings(&settings)?;
    let view = pipeline.load(def);
    if let Some(err) = &view.error {
        return Err(err.clone().into());
    }

    let series = match args.lookback_years {
        Some(years) => view.chart(crate::config::clamp_lookback(years), Local::now().date_naive()),
        None => view.derived.filter(|s| !s.is_empty()),
    }
    .ok_or_else(|| AppError::new(4, format!("No data for {}.", def.name)))?;

    crate::io::export::write_series_csv(&args.out, def, &series)?;
    println!("Wrote {} rows to {}", series.len(), args.out.display());
    Ok(())
}

/// Map user-supplied names to registry entries (defaults when empty).
fn resolve_names(names: &[String]) -> Result<Vec<&'static IndicatorDefinition>, AppError> {
    if names.is_empty() {
        return Ok(registry::default_charts());
    }
    names
        .iter()
        .map(|n| {
            registry::resolve(n)
                .ok_or_else(|| FetchError::InvalidRequest(format!("unknown indicator '{n}'")).into())
        })
        .collect()
}

/// Rewrite argv so `macro` defaults to `macro tui`.
///
/// Rules:
/// - `macro`                      -> `macro tui`
/// - `macro -y 10 ...`            -> `macro tui -y 10 ...`
/// - `macro --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["macro"])), args(&["macro", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(args(&["macro", "-y", "10"])),
            args(&["macro", "tui", "-y", "10"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["macro", "cards"])), args(&["macro", "cards"]));
        assert_eq!(rewrite_args(args(&["macro", "--help"])), args(&["macro", "--help"]));
    }

    #[test]
    fn resolve_names_defaults_and_rejects_unknown() {
        assert_eq!(resolve_names(&[]).unwrap().len(), registry::DEFAULT_CHARTS.len());
        let err = resolve_names(&["NOPE".to_string()]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
