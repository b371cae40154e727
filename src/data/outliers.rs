//! Average-check outlier filtering (IQR band, optionally clipped to absolute bounds).

use crate::data::dataset::TrainingRow;
use crate::math::quantile;

/// Band settings for the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBand {
    /// IQR multiplier `k` in `[Q1 - k·IQR, Q3 + k·IQR]`.
    pub iqr_multiplier: f64,
    pub abs_min: Option<f64>,
    pub abs_max: Option<f64>,
}

impl Default for OutlierBand {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            abs_min: None,
            abs_max: None,
        }
    }
}

/// What the filter did.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
    pub n_in: usize,
    pub removed: usize,
}

impl OutlierReport {
    pub fn kept(&self) -> usize {
        self.n_in - self.removed
    }
}

/// Drop rows whose average check is outside the inclusive band.
///
/// Never fails: an empty output is a valid result the caller must check.
pub fn filter_outliers(rows: &[TrainingRow], band: &OutlierBand) -> (Vec<TrainingRow>, OutlierReport) {
    let values: Vec<f64> = rows.iter().map(|r| r.avg_check).collect();

    let (q1, q3) = match (quantile(&values, 0.25), quantile(&values, 0.75)) {
        (Some(q1), Some(q3)) => (q1, q3),
        _ => {
            let report = OutlierReport {
                q1: f64::NAN,
                q3: f64::NAN,
                lower: f64::NAN,
                upper: f64::NAN,
                n_in: rows.len(),
                removed: rows.len(),
            };
            return (Vec::new(), report);
        }
    };

    let iqr = q3 - q1;
    let mut lower = q1 - band.iqr_multiplier * iqr;
    let mut upper = q3 + band.iqr_multiplier * iqr;
    if let Some(lo) = band.abs_min {
        lower = lower.max(lo);
    }
    if let Some(hi) = band.abs_max {
        upper = upper.min(hi);
    }

    let kept: Vec<TrainingRow> = rows
        .iter()
        .filter(|r| r.avg_check >= lower && r.avg_check <= upper)
        .copied()
        .collect();

    let report = OutlierReport {
        q1,
        q3,
        lower,
        upper,
        n_in: rows.len(),
        removed: rows.len() - kept.len(),
    };

    if report.removed > 0 {
        log::warn!(
            "Outlier filter removed {} of {} rows (avg check outside [{:.2}, {:.2}])",
            report.removed,
            report.n_in,
            lower,
            upper
        );
    }

    (kept, report)
}
