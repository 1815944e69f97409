//! Reporting utilities: text renderings of cards, charts, and the calendar.

pub mod format;

pub use format::*;
