//! `us-macro-dash` library crate.
//!
//! The binary (`macro`) is a thin wrapper around this library so that the
//! fetch/transform pipeline is testable without a terminal or network.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod registry;
pub mod report;
pub mod transform;
pub mod tui;
