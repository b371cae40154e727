//! Command-line parsing for the sales forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting code. Every option can also be supplied through a
//! `SALESCAST_*` environment variable (a `.env` file is loaded before parsing).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{FifteenthMode, Granularity, TrendStrategy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salescast", version, about = "Daily retail sales forecaster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast a full year from a historical sales CSV, print a summary, and optionally export.
    Forecast(ForecastArgs),
    /// Write a synthetic daily sales history CSV.
    Sample(SampleArgs),
}

/// Options for `salescast forecast`.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Historical sales CSV (date, checks, average check, total sales).
    #[arg(long, value_name = "CSV", env = "SALESCAST_INPUT")]
    pub input: PathBuf,

    /// Model daily records or month aggregates.
    #[arg(long, value_enum, default_value_t = Granularity::Daily, env = "SALESCAST_GRANULARITY")]
    pub granularity: Granularity,

    /// Trend model family.
    #[arg(long, value_enum, default_value_t = TrendStrategy::Polynomial, env = "SALESCAST_MODEL")]
    pub model: TrendStrategy,

    /// Year to forecast (defaults to the year after the last observation).
    #[arg(long, env = "SALESCAST_YEAR")]
    pub year: Option<i32>,

    /// Anchor year for month numbering (defaults to the first observed year).
    #[arg(long, env = "SALESCAST_BASE_YEAR")]
    pub base_year: Option<i32>,

    /// Fifteenth-of-month corrections to apply.
    #[arg(long, value_enum, default_value_t = FifteenthMode::Both, env = "SALESCAST_FIFTEENTH")]
    pub fifteenth: FifteenthMode,

    /// IQR multiplier for the average-check outlier band.
    #[arg(long = "iqr-k", default_value_t = 1.5, env = "SALESCAST_IQR_K")]
    pub iqr_k: f64,

    /// Smallest plausible average check; lower values are dropped before fitting.
    #[arg(long, env = "SALESCAST_AVG_CHECK_MIN")]
    pub avg_check_min: Option<f64>,

    /// Largest plausible average check; higher values are dropped before fitting.
    #[arg(long, env = "SALESCAST_AVG_CHECK_MAX")]
    pub avg_check_max: Option<f64>,

    /// Floor multiplier applied to the historical best for the same calendar position.
    #[arg(long, default_value_t = 1.05, env = "SALESCAST_FLOOR")]
    pub floor: f64,

    /// Export the forecast to CSV.
    #[arg(long, value_name = "CSV", env = "SALESCAST_EXPORT")]
    pub export: Option<PathBuf>,

    /// Export the forecast (with labels and context) to JSON.
    #[arg(long = "export-json", value_name = "JSON", env = "SALESCAST_EXPORT_JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `salescast sample`.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// First day of the generated history (YYYY-MM-DD).
    #[arg(long, default_value = "2022-01-01")]
    pub start: NaiveDate,

    /// Last day of the generated history (YYYY-MM-DD).
    #[arg(long, default_value = "2024-12-31")]
    pub end: NaiveDate,

    /// Random seed.
    #[arg(long, default_value_t = 42, env = "SALESCAST_SEED")]
    pub seed: u64,

    /// Mean daily checks at the start of the range.
    #[arg(long, default_value_t = 100.0)]
    pub checks: f64,

    /// Mean average check at the start of the range.
    #[arg(long, default_value_t = 3000.0)]
    pub avg_check: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_defaults() {
        let cli = Cli::parse_from(["salescast", "forecast", "--input", "history.csv"]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.input, PathBuf::from("history.csv"));
        assert_eq!(args.granularity, Granularity::Daily);
        assert_eq!(args.model, TrendStrategy::Polynomial);
        assert_eq!(args.fifteenth, FifteenthMode::Both);
        assert_eq!(args.floor, 1.05);
        assert!(args.year.is_none());
    }

    #[test]
    fn forecast_flags_parse() {
        let cli = Cli::parse_from([
            "salescast",
            "forecast",
            "--input",
            "h.csv",
            "--granularity",
            "monthly",
            "--model",
            "seasonal",
            "--year",
            "2026",
            "--fifteenth",
            "replace",
            "--iqr-k",
            "3",
            "--export-json",
            "out.json",
        ]);
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.granularity, Granularity::Monthly);
        assert_eq!(args.model, TrendStrategy::Seasonal);
        assert_eq!(args.year, Some(2026));
        assert_eq!(args.fifteenth, FifteenthMode::Replace);
        assert_eq!(args.iqr_k, 3.0);
        assert_eq!(args.export_json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn sample_dates_parse() {
        let cli = Cli::parse_from(["salescast", "sample", "--out", "s.csv", "--start", "2023-02-01"]);
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        assert_eq!(args.seed, 42);
    }
}
