//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::app::pipeline::RunOutput;
use crate::domain::{ForecastConfig, ForecastSeries, Metric};

/// Per-month totals of a forecast series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthSummary {
    pub month: u32,
    pub checks: u64,
    /// Mean of the points' average check.
    pub avg_check: f64,
    pub total_sales: f64,
}

/// Collapse a series into one summary per calendar month.
pub fn summarize_by_month(series: &ForecastSeries) -> Vec<MonthSummary> {
    let mut months: BTreeMap<u32, (u64, f64, usize, f64)> = BTreeMap::new();
    for p in series.points() {
        let entry = months.entry(p.date.month()).or_insert((0, 0.0, 0, 0.0));
        entry.0 += p.checks;
        entry.1 += p.avg_check;
        entry.2 += 1;
        entry.3 += p.total_sales;
    }
    months
        .into_iter()
        .map(|(month, (checks, avg_sum, n, total_sales))| MonthSummary {
            month,
            checks,
            avg_check: avg_sum / n as f64,
            total_sales,
        })
        .collect()
}

/// Format the full run summary (dataset stats + filter + fit diagnostics + corrections).
pub fn format_run_summary(run: &RunOutput, config: &ForecastConfig) -> String {
    let mut out = String::new();

    out.push_str("=== salescast - Sales Forecast ===\n");
    out.push_str(&format!(
        "Granularity: {} | Forecast year: {} | Base year: {}\n",
        run.series.granularity().display_name(),
        run.series.forecast_year(),
        run.series.base_year()
    ));
    out.push_str(&format!(
        "History: n={} ({} rows read, {} merged) | {}..{}\n",
        run.dataset.n_observations,
        run.dataset.rows_in,
        run.dataset.duplicates_merged,
        run.dataset.first_date,
        run.dataset.last_date
    ));
    out.push_str(&format!(
        "Outliers: kept {} of {} | avg check band [{:.2}, {:.2}] (k={})\n",
        run.outliers.kept(),
        run.outliers.n_in,
        run.outliers.lower,
        run.outliers.upper,
        config.iqr_multiplier
    ));

    out.push_str("\nModel diagnostics:\n");
    for fit in &run.fits {
        out.push_str(&format!(
            "  {:<12} {:<22} n={:<5} RMSE={:.3}\n",
            fit.metric.key(),
            fit.model,
            fit.n_points,
            fit.rmse
        ));
    }

    out.push_str("\nCorrections:\n");
    out.push_str(&format!(
        "- floor x{}: {} values raised ({} points without history)\n",
        config.floor_multiplier,
        run.floor.raised_total(),
        run.floor.missing_keys
    ));
    out.push_str(&format!(
        "- 15th ({:?}, reference {}): {} replaced, {} doubled\n",
        config.fifteenth, run.fifteenth.reference_year, run.fifteenth.replaced, run.fifteenth.doubled
    ));
    out.push('\n');

    out
}

/// Format the month-by-month forecast table with a yearly total row.
pub fn format_month_table(series: &ForecastSeries) -> String {
    let labels = [Metric::Checks.label(), Metric::AvgCheck.label(), Metric::TotalSales.label()];
    let mut out = String::new();

    out.push_str(
        format!("{:<8} {:>16} {:>14} {:>18}", "month", labels[0], labels[1], labels[2]).trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<8} {:-<16} {:-<14} {:-<18}", "", "", "", "").trim_end());
    out.push('\n');

    let months = summarize_by_month(series);
    for m in &months {
        out.push_str(
            format!(
                "{:<8} {:>16} {:>14.2} {:>18.2}",
                format!("{}-{:02}", series.forecast_year(), m.month),
                m.checks,
                m.avg_check,
                m.total_sales
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let checks: u64 = months.iter().map(|m| m.checks).sum();
    out.push_str(
        format!(
            "{:<8} {:>16} {:>14} {:>18.2}",
            "total",
            checks,
            "",
            series.total(Metric::TotalSales)
        )
        .trim_end(),
    );
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastPoint, Granularity};
    use chrono::NaiveDate;

    fn series() -> ForecastSeries {
        let point = |m, day, checks, avg| ForecastPoint {
            date: NaiveDate::from_ymd_opt(2025, m, day).unwrap(),
            checks,
            avg_check: avg,
            total_sales: checks as f64 * avg,
        };
        ForecastSeries::new(
            Granularity::Daily,
            2022,
            2025,
            vec![point(1, 1, 10, 100.0), point(1, 2, 20, 200.0), point(2, 1, 5, 50.0)],
        )
    }

    #[test]
    fn months_are_summed_and_averaged() {
        let months = summarize_by_month(&series());
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].checks, 30);
        assert!((months[0].avg_check - 150.0).abs() < 1e-12);
        assert!((months[0].total_sales - 5000.0).abs() < 1e-9);
        assert_eq!(months[1].month, 2);
    }

    #[test]
    fn month_table_ends_with_total() {
        let table = format_month_table(&series());
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("Number of checks"));
        assert!(lines[2].starts_with("2025-01"));
        assert!(lines.last().unwrap().starts_with("total"));
        assert!(lines.last().unwrap().ends_with("5250.00"));
    }
}
