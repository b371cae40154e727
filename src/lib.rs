//! `salescast` library crate.
//!
//! The binary (`salescast`) is a thin wrapper around this library so that:
//!
//! - the forecasting pipeline is testable without spawning processes
//! - the core never touches files; adapters in `io` do
//! - code stays easy to navigate as the project grows

pub mod adjust;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
