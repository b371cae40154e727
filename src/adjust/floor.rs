//! Floor enforcement against the best historical value for the same calendar position.
//!
//! For each forecast point and corrected metric:
//!
//! ```text
//! floor = multiplier * max(history[metric] where calendar_key(history.date) == calendar_key(point.date))
//! value = max(value, floor)
//! ```
//!
//! Calendar keys with no history get a floor of zero. The step can only raise
//! values.

use std::collections::BTreeMap;

use crate::adjust::DraftPoint;
use crate::data::TrainingRow;
use crate::domain::{Granularity, Metric};

/// Counts of what floor enforcement changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorReport {
    /// Number of points raised, per metric.
    pub raised: BTreeMap<Metric, usize>,
    /// Forecast points whose calendar key had no history.
    pub missing_keys: usize,
}

impl FloorReport {
    pub fn raised_total(&self) -> usize {
        self.raised.values().sum()
    }
}

/// Per-key historical maxima of each metric.
#[derive(Debug, Clone, Default)]
pub struct HistoricalBest {
    best: BTreeMap<u32, [f64; 3]>,
}

impl HistoricalBest {
    pub fn from_rows(rows: &[TrainingRow], granularity: Granularity) -> Self {
        let mut best: BTreeMap<u32, [f64; 3]> = BTreeMap::new();
        for row in rows {
            let key = granularity.calendar_key(row.date);
            let entry = best.entry(key).or_insert([f64::NEG_INFINITY; 3]);
            for (slot, metric) in entry.iter_mut().zip(Metric::ALL) {
                *slot = slot.max(row.value(metric));
            }
        }
        Self { best }
    }

    /// Best historical value for `key`, or `None` when the key was never observed.
    pub fn get(&self, key: u32, metric: Metric) -> Option<f64> {
        let slot = Metric::ALL.iter().position(|m| *m == metric)?;
        self.best.get(&key).map(|v| v[slot])
    }
}

/// Raise each point's `metrics` to at least `multiplier` × historical best.
pub fn enforce_floor(
    points: &mut [DraftPoint],
    history: &HistoricalBest,
    granularity: Granularity,
    metrics: &[Metric],
    multiplier: f64,
) -> FloorReport {
    let mut report = FloorReport::default();

    for point in points.iter_mut() {
        let key = granularity.calendar_key(point.date);
        let mut key_missing = false;
        for &metric in metrics {
            let floor = match history.get(key, metric) {
                Some(best) => best * multiplier,
                None => {
                    key_missing = true;
                    0.0
                }
            };
            let value = point.value_mut(metric);
            if *value < floor {
                *value = floor;
                *report.raised.entry(metric).or_insert(0) += 1;
            }
        }
        if key_missing {
            report.missing_keys += 1;
            log::debug!("No history for calendar key {key} ({}); floor is 0.", point.date);
        }
    }

    log::info!(
        "Floor enforcement raised {} values ({} points without history)",
        report.raised_total(),
        report.missing_keys
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: NaiveDate, checks: f64, avg: f64) -> TrainingRow {
        TrainingRow {
            date,
            index: 0.0,
            checks,
            avg_check: avg,
            total_sales: checks * avg,
        }
    }

    fn draft(date: NaiveDate, checks: f64, avg: f64) -> DraftPoint {
        DraftPoint {
            date,
            checks,
            avg_check: avg,
            total_sales: checks * avg,
        }
    }

    #[test]
    fn spike_sets_the_floor_for_its_day_of_year() {
        // 2023-03-10 had a spike of 400 checks; other years were at 100.
        let history = vec![
            row(d(2022, 3, 10), 100.0, 3000.0),
            row(d(2023, 3, 10), 400.0, 3000.0),
            row(d(2024, 3, 9), 100.0, 3000.0), // leap year: ordinal 69 == Mar 10 in 2023
            row(d(2022, 3, 11), 100.0, 3000.0),
        ];
        let best = HistoricalBest::from_rows(&history, Granularity::Daily);

        let mut points = vec![draft(d(2025, 3, 10), 120.0, 3100.0), draft(d(2025, 3, 11), 120.0, 3100.0)];
        let report = enforce_floor(
            &mut points,
            &best,
            Granularity::Daily,
            &[Metric::Checks, Metric::AvgCheck],
            1.05,
        );

        assert!((points[0].checks - 420.0).abs() < 1e-9);
        assert!((points[0].avg_check - 3150.0).abs() < 1e-9);
        assert_eq!(points[1].checks, 120.0);
        assert!((points[1].avg_check - 3150.0).abs() < 1e-9);
        assert_eq!(report.raised[&Metric::Checks], 1);
        assert_eq!(report.raised[&Metric::AvgCheck], 2);
    }

    #[test]
    fn missing_key_has_no_effect() {
        let history = vec![row(d(2024, 1, 1), 500.0, 5000.0)];
        let best = HistoricalBest::from_rows(&history, Granularity::Daily);

        let mut points = vec![draft(d(2025, 6, 1), 10.0, 20.0)];
        let report = enforce_floor(&mut points, &best, Granularity::Daily, &Metric::ALL, 1.05);

        assert_eq!(points[0], draft(d(2025, 6, 1), 10.0, 20.0));
        assert_eq!(report.missing_keys, 1);
        assert_eq!(report.raised_total(), 0);
    }

    #[test]
    fn monthly_keys_use_month_of_year() {
        let history = vec![row(d(2023, 5, 1), 3000.0, 2500.0), row(d(2024, 5, 1), 2800.0, 2600.0)];
        let best = HistoricalBest::from_rows(&history, Granularity::Monthly);

        let mut points = vec![draft(d(2025, 5, 1), 1000.0, 1000.0)];
        enforce_floor(&mut points, &best, Granularity::Monthly, &Metric::ALL, 1.05);

        assert!((points[0].checks - 3150.0).abs() < 1e-9);
        assert!((points[0].avg_check - 2730.0).abs() < 1e-9);
        assert!((points[0].total_sales - 3000.0 * 2500.0 * 1.05).abs() < 1e-6);
    }

    #[test]
    fn never_decreases_any_value() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = d(2022, 1, 1);
        let history: Vec<TrainingRow> = (0..1000)
            .map(|i| {
                row(
                    start + chrono::Duration::days(i),
                    rng.gen_range(0.0..500.0),
                    rng.gen_range(100.0..5000.0),
                )
            })
            .collect();
        let best = HistoricalBest::from_rows(&history, Granularity::Daily);

        let forecast_start = d(2025, 1, 1);
        let before: Vec<DraftPoint> = (0..365)
            .map(|i| {
                draft(
                    forecast_start + chrono::Duration::days(i),
                    rng.gen_range(-100.0..800.0),
                    rng.gen_range(0.0..8000.0),
                )
            })
            .collect();
        let mut after = before.clone();
        enforce_floor(&mut after, &best, Granularity::Daily, &Metric::ALL, 1.05);

        for (b, a) in before.iter().zip(after.iter()) {
            for m in Metric::ALL {
                assert!(a.value(m) >= b.value(m), "{m} decreased on {}", b.date);
            }
        }
    }
}
