//! Reporting utilities: run summary and forecast tables for the terminal.

pub mod format;

pub use format::*;
