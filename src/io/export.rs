//! Export forecasts (CSV/JSON) and write history CSVs.
//!
//! The CSV export is meant to be easy to consume in spreadsheets: one row per
//! forecast date, human-readable column labels, ISO dates, whole checks and
//! currency with two decimals.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::RawObservation;
use crate::domain::{ForecastSeries, Metric};
use crate::error::AppError;

/// Portable JSON representation of a finished forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    /// Column label per metric key.
    pub labels: Vec<(Metric, String)>,
    pub series: ForecastSeries,
}

impl ForecastFile {
    pub fn new(series: &ForecastSeries) -> Self {
        Self {
            tool: "salescast".to_string(),
            labels: Metric::ALL.iter().map(|m| (*m, m.label().to_string())).collect(),
            series: series.clone(),
        }
    }
}

/// Write the forecast series to a CSV file.
pub fn write_forecast_csv(path: &Path, series: &ForecastSeries) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_forecast_csv_to(&mut file, series)
        .map_err(|e| AppError::io(format!("Failed to write export CSV '{}': {e}", path.display())))?;
    log::info!("Wrote {} forecast rows to {}", series.len(), path.display());
    Ok(())
}

fn write_forecast_csv_to<W: Write>(out: &mut W, series: &ForecastSeries) -> std::io::Result<()> {
    writeln!(out, "{}", ForecastSeries::column_labels().join(","))?;
    for p in series.points() {
        writeln!(
            out,
            "{},{},{:.2},{:.2}",
            p.date.format("%Y-%m-%d"),
            p.checks,
            p.avg_check,
            p.total_sales
        )?;
    }
    out.flush()
}

/// Write the forecast series (with labels and context) as pretty JSON.
pub fn write_forecast_json(path: &Path, series: &ForecastSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create forecast JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &ForecastFile::new(series))
        .map_err(|e| AppError::io(format!("Failed to write forecast JSON: {e}")))?;
    Ok(())
}

/// Read a forecast JSON file written by `write_forecast_json`.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open forecast JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::validation(format!("Invalid forecast JSON: {e}")))
}

/// Write history rows in the layout `io::ingest` reads back.
///
/// Rows without a date are written with an empty date cell.
pub fn write_history_csv(path: &Path, rows: &[RawObservation]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create history CSV '{}': {e}", path.display())))?;

    writeln!(file, "date,checks,avg_check,total_sales")
        .map_err(|e| AppError::io(format!("Failed to write history CSV header: {e}")))?;
    for r in rows {
        let date = r.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        writeln!(
            file,
            "{date},{},{:.2},{:.2}",
            r.checks, r.avg_check, r.total_sales
        )
        .map_err(|e| AppError::io(format!("Failed to write history CSV row: {e}")))?;
    }

    log::info!("Wrote {} history rows to {}", rows.len(), path.display());
    Ok(())
}
