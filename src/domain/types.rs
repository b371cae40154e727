//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and correction
//! - exported to JSON/CSV
//! - selected from the command line (`ValueEnum`)

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the three sales metrics carried by every observation and forecast point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Checks,
    AvgCheck,
    TotalSales,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Checks, Metric::AvgCheck, Metric::TotalSales];

    /// Human-readable column label (count, average value, total value).
    pub fn label(self) -> &'static str {
        match self {
            Metric::Checks => "Number of checks",
            Metric::AvgCheck => "Average check",
            Metric::TotalSales => "Total sales",
        }
    }

    /// Machine-friendly key used in logs and JSON.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Checks => "checks",
            Metric::AvgCheck => "avg_check",
            Metric::TotalSales => "total_sales",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether the pipeline models daily records or month aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
}

impl Granularity {
    /// Metrics that get their own trend model.
    ///
    /// At daily granularity total sales is derived from checks × average check.
    pub fn fitted_metrics(self) -> &'static [Metric] {
        match self {
            Granularity::Daily => &[Metric::Checks, Metric::AvgCheck],
            Granularity::Monthly => &Metric::ALL,
        }
    }

    /// Calendar position used to compare a date against history.
    ///
    /// Daily: day-of-year (1–366). Monthly: month-of-year (1–12).
    pub fn calendar_key(self, date: NaiveDate) -> u32 {
        match self {
            Granularity::Daily => date.ordinal(),
            Granularity::Monthly => date.month(),
        }
    }

    /// Every date the forecast covers for `year`, in order.
    pub fn horizon(self, year: i32) -> Result<Vec<NaiveDate>, AppError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AppError::config(format!("Forecast year {year} is out of range.")))?;
        let dates = match self {
            Granularity::Daily => start
                .iter_days()
                .take_while(|d| d.year() == year)
                .collect(),
            Granularity::Monthly => (1..=12)
                .filter_map(|m| NaiveDate::from_ymd_opt(year, m, 1))
                .collect(),
        };
        Ok(dates)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
        }
    }
}

/// Which trend model family to fit. Never combined within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrendStrategy {
    /// Degree-2 polynomial regression over the day/month index.
    Polynomial,
    /// SARIMA(1,1,1)(0,1,1,12) fit by conditional sum of squares.
    Seasonal,
}

/// Which fifteenth-of-month corrections to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FifteenthMode {
    None,
    /// Add twice the prior year's 15th-day total sales.
    Additive,
    /// Replace checks/average check with the prior year's 15th-day means (daily only).
    Replace,
    /// Replacement first, then additive doubling on top.
    Both,
}

impl FifteenthMode {
    pub fn additive(self) -> bool {
        matches!(self, FifteenthMode::Additive | FifteenthMode::Both)
    }

    pub fn replacement(self) -> bool {
        matches!(self, FifteenthMode::Replace | FifteenthMode::Both)
    }
}

/// A full run's configuration as understood by the core pipeline.
///
/// This is derived from CLI flags (plus defaults). File paths stay in the
/// CLI layer; the core never touches the file system.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub granularity: Granularity,
    pub strategy: TrendStrategy,
    /// Year to forecast. `None` means the year after the last observation.
    pub forecast_year: Option<i32>,
    /// Anchor for `month_number`. `None` means the first observed year.
    pub base_year: Option<i32>,
    pub fifteenth: FifteenthMode,
    /// IQR multiplier for the average-check outlier band.
    pub iqr_multiplier: f64,
    /// Optional absolute lower bound for a plausible average check.
    pub avg_check_min: Option<f64>,
    /// Optional absolute upper bound for a plausible average check.
    pub avg_check_max: Option<f64>,
    /// Multiplier applied to the historical best when enforcing the floor.
    pub floor_multiplier: f64,
    /// Seasonal period of the SARIMA strategy.
    pub seasonal_period: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Daily,
            strategy: TrendStrategy::Polynomial,
            forecast_year: None,
            base_year: None,
            fifteenth: FifteenthMode::Both,
            iqr_multiplier: 1.5,
            avg_check_min: None,
            avg_check_max: None,
            floor_multiplier: 1.05,
            seasonal_period: 12,
        }
    }
}

impl ForecastConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier >= 0.0) {
            return Err(AppError::config(format!(
                "IQR multiplier must be finite and >= 0, got {}.",
                self.iqr_multiplier
            )));
        }
        if !(self.floor_multiplier.is_finite() && self.floor_multiplier >= 0.0) {
            return Err(AppError::config(format!(
                "Floor multiplier must be finite and >= 0, got {}.",
                self.floor_multiplier
            )));
        }
        for (name, bound) in [("minimum", self.avg_check_min), ("maximum", self.avg_check_max)] {
            if let Some(v) = bound {
                if !v.is_finite() {
                    return Err(AppError::config(format!("Average-check {name} must be finite.")));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (self.avg_check_min, self.avg_check_max) {
            if lo > hi {
                return Err(AppError::config(format!(
                    "Average-check bounds are inverted: min={lo} > max={hi}."
                )));
            }
        }
        if self.seasonal_period < 2 {
            return Err(AppError::config("Seasonal period must be >= 2."));
        }
        Ok(())
    }
}

/// One forecast day (or month start) in the finished series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub checks: u64,
    pub avg_check: f64,
    pub total_sales: f64,
}

impl ForecastPoint {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Checks => self.checks as f64,
            Metric::AvgCheck => self.avg_check,
            Metric::TotalSales => self.total_sales,
        }
    }
}

/// The terminal artifact of a run: ordered forecast points plus their context.
///
/// Fields are private so the series cannot change after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    granularity: Granularity,
    base_year: i32,
    forecast_year: i32,
    points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Build a series; points are sorted by date.
    pub(crate) fn new(
        granularity: Granularity,
        base_year: i32,
        forecast_year: i32,
        mut points: Vec<ForecastPoint>,
    ) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            granularity,
            base_year,
            forecast_year,
            points,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    pub fn forecast_year(&self) -> i32 {
        self.forecast_year
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ForecastPoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Sum of a metric over the whole horizon.
    pub fn total(&self, metric: Metric) -> f64 {
        self.points.iter().map(|p| p.value(metric)).sum()
    }

    /// Labels for the export columns: date first, then each metric.
    pub fn column_labels() -> [&'static str; 4] {
        [
            "Date",
            Metric::Checks.label(),
            Metric::AvgCheck.label(),
            Metric::TotalSales.label(),
        ]
    }
}
