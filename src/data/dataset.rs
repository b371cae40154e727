//! Historical dataset: validation, de-duplication and derived calendar fields.
//!
//! This is the boundary where untrusted rows become typed observations. After
//! `HistoricalDataset::from_raw` succeeds, every observation has a date, finite
//! non-negative metrics and an integral check count, dates are unique and
//! sorted, and the derived fields (`day_number`, `month_number`, ...) are
//! computed once.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Granularity, Metric};
use crate::error::AppError;

/// Tolerance for treating a parsed check count as integral.
const CHECKS_INTEGRAL_EPS: f64 = 1e-6;

/// An input row as handed over by the loading collaborator.
///
/// Numbers are already parsed; the date may still be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: Option<NaiveDate>,
    pub checks: f64,
    pub avg_check: f64,
    pub total_sales: f64,
}

/// One validated daily sales record with its derived calendar fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub checks: u64,
    pub avg_check: f64,
    pub total_sales: f64,
    /// 1-based offset from the dataset's minimum date.
    pub day_number: i64,
    /// 1..=366
    pub day_of_year: u32,
    /// `(year - base_year) * 12 + month`
    pub month_number: i32,
    pub year: i32,
    pub month: u32,
}

impl Observation {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Checks => self.checks as f64,
            Metric::AvgCheck => self.avg_check,
            Metric::TotalSales => self.total_sales,
        }
    }
}

/// The unit a trend model is fit on: one day, or one month aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub date: NaiveDate,
    /// Regression index: `day_number` (daily) or `month_number` (monthly).
    pub index: f64,
    pub checks: f64,
    pub avg_check: f64,
    pub total_sales: f64,
}

impl TrainingRow {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Checks => self.checks,
            Metric::AvgCheck => self.avg_check,
            Metric::TotalSales => self.total_sales,
        }
    }
}

/// Summary stats about the cleaned dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub rows_in: usize,
    pub n_observations: usize,
    pub duplicates_merged: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub base_year: i32,
}

#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    observations: Vec<Observation>,
    stats: DatasetStats,
}

impl HistoricalDataset {
    /// Validate raw rows and build the dataset.
    ///
    /// Fails with an input-validation error on an empty input, a missing date,
    /// a non-finite or negative metric, or a fractional check count.
    /// Rows sharing a date are merged (checks and total summed, average check
    /// averaged).
    pub fn from_raw(rows: &[RawObservation], base_year: Option<i32>) -> Result<Self, AppError> {
        if rows.is_empty() {
            return Err(AppError::validation("Dataset is empty."));
        }

        // date -> (checks sum, avg_check values, total sum)
        let mut by_date: BTreeMap<NaiveDate, (u64, Vec<f64>, f64)> = BTreeMap::new();

        for (i, row) in rows.iter().enumerate() {
            let Some(date) = row.date else {
                return Err(AppError::validation(format!("Row {}: missing date.", i + 1)));
            };
            let checks = validate_checks(row.checks).map_err(|m| {
                AppError::validation(format!("Row {} ({date}): {m}", i + 1))
            })?;
            for (metric, v) in [
                (Metric::AvgCheck, row.avg_check),
                (Metric::TotalSales, row.total_sales),
            ] {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::validation(format!(
                        "Row {} ({date}): {} must be a finite non-negative number, got {v}.",
                        i + 1,
                        metric.key()
                    )));
                }
            }

            let entry = by_date.entry(date).or_insert((0, Vec::new(), 0.0));
            entry.0 += checks;
            entry.1.push(row.avg_check);
            entry.2 += row.total_sales;
        }

        let duplicates_merged = rows.len() - by_date.len();
        if duplicates_merged > 0 {
            log::warn!("Merged {duplicates_merged} rows that repeated an existing date.");
        }

        let (Some(&first_date), Some(&last_date)) = (by_date.keys().next(), by_date.keys().next_back())
        else {
            return Err(AppError::validation("Dataset is empty."));
        };
        let base_year = base_year.unwrap_or(first_date.year());

        let observations: Vec<Observation> = by_date
            .into_iter()
            .map(|(date, (checks, avgs, total_sales))| {
                let avg_check = avgs.iter().sum::<f64>() / avgs.len() as f64;
                Observation {
                    date,
                    checks,
                    avg_check,
                    total_sales,
                    day_number: (date - first_date).num_days() + 1,
                    day_of_year: date.ordinal(),
                    month_number: month_number(date, base_year),
                    year: date.year(),
                    month: date.month(),
                }
            })
            .collect();

        let stats = DatasetStats {
            rows_in: rows.len(),
            n_observations: observations.len(),
            duplicates_merged,
            first_date,
            last_date,
            base_year,
        };

        log::info!(
            "Dataset: {} observations {}..{} (base year {base_year})",
            stats.n_observations,
            stats.first_date,
            stats.last_date
        );

        Ok(Self { observations, stats })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }

    pub fn first_date(&self) -> NaiveDate {
        self.stats.first_date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.stats.last_date
    }

    pub fn base_year(&self) -> i32 {
        self.stats.base_year
    }

    /// Regression index of an arbitrary date under this dataset's anchors.
    pub fn index_of(&self, date: NaiveDate, granularity: Granularity) -> f64 {
        match granularity {
            Granularity::Daily => ((date - self.stats.first_date).num_days() + 1) as f64,
            Granularity::Monthly => month_number(date, self.stats.base_year) as f64,
        }
    }

    /// Observations dated on `day` of any month in `year`.
    pub fn day_of_month_in_year(&self, year: i32, day: u32) -> impl Iterator<Item = &Observation> {
        self.observations
            .iter()
            .filter(move |o| o.year == year && o.date.day() == day)
    }

    /// Rows the trend models are fit on, ordered by date.
    ///
    /// Monthly rows aggregate a month's observations: checks summed, average
    /// check averaged, total sales summed.
    pub fn training_rows(&self, granularity: Granularity) -> Vec<TrainingRow> {
        match granularity {
            Granularity::Daily => self
                .observations
                .iter()
                .map(|o| TrainingRow {
                    date: o.date,
                    index: o.day_number as f64,
                    checks: o.checks as f64,
                    avg_check: o.avg_check,
                    total_sales: o.total_sales,
                })
                .collect(),
            Granularity::Monthly => {
                let mut months: BTreeMap<i32, (NaiveDate, f64, f64, usize, f64)> = BTreeMap::new();
                for o in &self.observations {
                    let start = NaiveDate::from_ymd_opt(o.year, o.month, 1).unwrap_or(o.date);
                    let entry = months.entry(o.month_number).or_insert((start, 0.0, 0.0, 0, 0.0));
                    entry.1 += o.checks as f64;
                    entry.2 += o.avg_check;
                    entry.3 += 1;
                    entry.4 += o.total_sales;
                }
                months
                    .into_iter()
                    .map(|(mn, (date, checks, avg_sum, n, total_sales))| TrainingRow {
                        date,
                        index: mn as f64,
                        checks,
                        avg_check: avg_sum / n as f64,
                        total_sales,
                    })
                    .collect()
            }
        }
    }
}

/// Consecutive month index anchored at `base_year` (January of `base_year` is 1).
pub fn month_number(date: NaiveDate, base_year: i32) -> i32 {
    (date.year() - base_year) * 12 + date.month() as i32
}

fn validate_checks(v: f64) -> Result<u64, String> {
    if !v.is_finite() || v < 0.0 {
        return Err(format!("checks must be a finite non-negative number, got {v}."));
    }
    let rounded = v.round();
    if (v - rounded).abs() > CHECKS_INTEGRAL_EPS {
        return Err(format!("checks must be a whole number, got {v}."));
    }
    Ok(rounded as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn raw(date: NaiveDate, checks: f64, avg: f64) -> RawObservation {
        RawObservation {
            date: Some(date),
            checks,
            avg_check: avg,
            total_sales: checks * avg,
        }
    }

    #[test]
    fn derived_fields_are_anchored() {
        let rows = vec![raw(d(2023, 12, 31), 10.0, 5.0), raw(d(2022, 1, 1), 20.0, 4.0)];
        let ds = HistoricalDataset::from_raw(&rows, None).unwrap();
        let obs = ds.observations();

        assert_eq!(obs[0].date, d(2022, 1, 1));
        assert_eq!(obs[0].day_number, 1);
        assert_eq!(obs[0].month_number, 1);
        assert_eq!(obs[1].day_number, 730);
        assert_eq!(obs[1].day_of_year, 365);
        assert_eq!(obs[1].month_number, 24);
        assert_eq!(ds.base_year(), 2022);
    }

    #[test]
    fn configured_base_year_shifts_month_number() {
        let rows = vec![raw(d(2023, 3, 1), 1.0, 1.0)];
        let ds = HistoricalDataset::from_raw(&rows, Some(2022)).unwrap();
        assert_eq!(ds.observations()[0].month_number, 15);
    }

    #[test]
    fn missing_date_is_a_validation_error() {
        let rows = vec![
            raw(d(2024, 1, 1), 1.0, 1.0),
            RawObservation {
                date: None,
                checks: 1.0,
                avg_check: 1.0,
                total_sales: 1.0,
            },
        ];
        let err = HistoricalDataset::from_raw(&rows, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(err.message().contains("Row 2"));
    }

    #[test]
    fn non_finite_and_fractional_values_are_rejected() {
        let nan = vec![raw(d(2024, 1, 1), 1.0, f64::NAN)];
        assert_eq!(
            HistoricalDataset::from_raw(&nan, None).unwrap_err().kind(),
            ErrorKind::InputValidation
        );

        let fractional = vec![raw(d(2024, 1, 1), 1.5, 1.0)];
        assert_eq!(
            HistoricalDataset::from_raw(&fractional, None).unwrap_err().kind(),
            ErrorKind::InputValidation
        );

        assert_eq!(
            HistoricalDataset::from_raw(&[], None).unwrap_err().kind(),
            ErrorKind::InputValidation
        );
    }

    #[test]
    fn duplicate_dates_are_merged() {
        let rows = vec![raw(d(2024, 1, 1), 10.0, 100.0), raw(d(2024, 1, 1), 30.0, 200.0)];
        let ds = HistoricalDataset::from_raw(&rows, None).unwrap();
        assert_eq!(ds.observations().len(), 1);
        assert_eq!(ds.stats().duplicates_merged, 1);

        let o = ds.observations()[0];
        assert_eq!(o.checks, 40);
        assert!((o.avg_check - 150.0).abs() < 1e-12);
        assert!((o.total_sales - 7000.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_rows_aggregate_sum_mean_sum() {
        let rows = vec![
            raw(d(2024, 1, 1), 10.0, 100.0),
            raw(d(2024, 1, 2), 20.0, 300.0),
            raw(d(2024, 2, 1), 5.0, 50.0),
        ];
        let ds = HistoricalDataset::from_raw(&rows, None).unwrap();
        let monthly = ds.training_rows(Granularity::Monthly);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].date, d(2024, 1, 1));
        assert_eq!(monthly[0].index, 1.0);
        assert_eq!(monthly[0].checks, 30.0);
        assert!((monthly[0].avg_check - 200.0).abs() < 1e-12);
        assert!((monthly[0].total_sales - 7000.0).abs() < 1e-9);
        assert_eq!(monthly[1].index, 2.0);
    }

    #[test]
    fn index_of_future_dates_extends_history() {
        let rows = vec![raw(d(2024, 1, 1), 1.0, 1.0)];
        let ds = HistoricalDataset::from_raw(&rows, Some(2022)).unwrap();
        assert_eq!(ds.index_of(d(2024, 1, 2), Granularity::Daily), 2.0);
        assert_eq!(ds.index_of(d(2025, 1, 1), Granularity::Monthly), 37.0);
    }
}
