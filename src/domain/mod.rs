//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request enums (`Frequency`, `TransformKind`, `Category`)
//! - normalized observation points and series (`ObservationPoint`, `Series`)
//! - static indicator metadata (`IndicatorDefinition`)

pub mod types;

pub use types::*;
