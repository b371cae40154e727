//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`Granularity`, `TrendStrategy`, `FifteenthMode`)
//! - the run configuration (`ForecastConfig`)
//! - forecast outputs (`ForecastPoint`, `ForecastSeries`)

pub mod types;

pub use types::*;
