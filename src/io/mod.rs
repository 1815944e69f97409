//! Input/output helpers.
//!
//! - derived-series CSV exports (`export`)

pub mod export;

pub use export::*;
