//! Corrections for the 15th of each forecast month.
//!
//! Both policies look at the 15th-of-month observations of the year right
//! before the forecast year (the reference year):
//!
//! - additive doubling: `total_sales += 2 * Σ reference day-15 total_sales`
//! - replacement (daily only): checks and average check are overwritten with the
//!   reference day-15 means
//!
//! Months with no reference observation are left untouched.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::adjust::DraftPoint;
use crate::data::HistoricalDataset;
use crate::domain::Granularity;

/// Day of month both policies target.
pub const TARGET_DAY: u32 = 15;

/// Reference-year statistics of one month's 15th.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FifteenthStats {
    pub total_sales_sum: f64,
    pub checks_mean: f64,
    pub avg_check_mean: f64,
    pub n: usize,
}

/// Reference statistics keyed by month (1..=12).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FifteenthReference {
    pub year: i32,
    by_month: BTreeMap<u32, FifteenthStats>,
}

impl FifteenthReference {
    pub fn from_dataset(dataset: &HistoricalDataset, year: i32) -> Self {
        // month -> (total sum, checks sum, avg sum, n)
        let mut acc: BTreeMap<u32, (f64, f64, f64, usize)> = BTreeMap::new();
        for o in dataset.day_of_month_in_year(year, TARGET_DAY) {
            let entry = acc.entry(o.month).or_insert((0.0, 0.0, 0.0, 0));
            entry.0 += o.total_sales;
            entry.1 += o.checks as f64;
            entry.2 += o.avg_check;
            entry.3 += 1;
        }

        let by_month = acc
            .into_iter()
            .map(|(month, (total, checks, avg, n))| {
                (
                    month,
                    FifteenthStats {
                        total_sales_sum: total,
                        checks_mean: checks / n as f64,
                        avg_check_mean: avg / n as f64,
                        n,
                    },
                )
            })
            .collect();

        Self { year, by_month }
    }

    pub fn month(&self, month: u32) -> Option<&FifteenthStats> {
        self.by_month.get(&month)
    }

    pub fn months_covered(&self) -> usize {
        self.by_month.len()
    }
}

/// How many points each policy touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FifteenthReport {
    pub reference_year: i32,
    pub replaced: usize,
    pub doubled: usize,
}

/// Overwrite checks (rounded) and average check on each forecast 15th.
///
/// Only meaningful at daily granularity; the caller decides.
pub fn apply_replacement(points: &mut [DraftPoint], reference: &FifteenthReference) -> usize {
    let mut touched = 0;
    for point in points.iter_mut().filter(|p| p.date.day() == TARGET_DAY) {
        let Some(stats) = reference.month(point.date.month()) else {
            log::debug!(
                "No {} reference for {}; keeping the model value.",
                reference.year,
                point.date
            );
            continue;
        };
        if !(stats.checks_mean.is_finite() && stats.avg_check_mean.is_finite()) {
            continue;
        }
        point.checks = stats.checks_mean.round();
        point.avg_check = stats.avg_check_mean;
        touched += 1;
    }
    touched
}

/// Add twice the reference-year 15th-day total sales to each month's 15th.
///
/// At monthly granularity the month-start point carries the whole month,
/// its 15th included.
///
/// Returns the touched dates so the caller can report them.
pub fn apply_additive_doubling(
    points: &mut [DraftPoint],
    reference: &FifteenthReference,
    granularity: Granularity,
) -> Vec<chrono::NaiveDate> {
    let mut touched = Vec::new();
    for point in points.iter_mut() {
        let carries_fifteenth = match granularity {
            Granularity::Daily => point.date.day() == TARGET_DAY,
            Granularity::Monthly => true,
        };
        if !carries_fifteenth {
            continue;
        }
        let Some(stats) = reference.month(point.date.month()) else {
            log::debug!(
                "No {} 15th-day sales for month {}; no addition.",
                reference.year,
                point.date.month()
            );
            continue;
        };
        point.total_sales += 2.0 * stats.total_sales_sum;
        touched.push(point.date);
    }
    touched
}
