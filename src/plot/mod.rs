//! Terminal plotting for the non-interactive subcommands.

pub mod ascii;

pub use ascii::render_series_plot;
