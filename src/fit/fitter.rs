//! Per-metric fitting.
//!
//! Given:
//! - the filtered training rows
//! - the configured trend strategy
//! - the forecast horizon expressed in regression index values
//!
//! we fit one model per metric and return its predictions together with the
//! diagnostics shown in the run summary.

use crate::data::TrainingRow;
use crate::domain::Metric;
use crate::error::{AppError, ErrorKind};
use crate::models::TrendModel;

/// Fit outcome for a single metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFit {
    pub metric: Metric,
    pub model: &'static str,
    pub n_points: usize,
    pub rmse: f64,
    /// Predictions aligned with the horizon index passed to `fit_metric`.
    pub predictions: Vec<f64>,
}

/// Fit `metric` on `rows` and predict it at `horizon_index`.
///
/// A data-insufficiency error names the metric that could not be fit.
pub fn fit_metric(
    model: &dyn TrendModel,
    metric: Metric,
    rows: &[TrainingRow],
    horizon_index: &[f64],
) -> Result<MetricFit, AppError> {
    if rows.len() < model.min_points() {
        return Err(AppError::insufficient(format!(
            "Cannot fit {} for `{}`: {} points after filtering, need at least {}.",
            model.display_name(),
            metric.key(),
            rows.len(),
            model.min_points()
        )));
    }

    let index: Vec<f64> = rows.iter().map(|r| r.index).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.value(metric)).collect();

    let fitted = model.fit(&index, &values).map_err(|e| {
        if e.kind() == ErrorKind::DataInsufficiency {
            AppError::insufficient(format!("`{}`: {}", metric.key(), e.message()))
        } else {
            AppError::new(e.kind(), format!("Fitting `{}` failed: {}", metric.key(), e.message()))
        }
    })?;
    let predictions = fitted.predict(horizon_index)?;

    log::info!(
        "Fitted {} for {}: n={} rmse={:.4}",
        model.display_name(),
        metric.key(),
        rows.len(),
        fitted.rmse()
    );

    Ok(MetricFit {
        metric,
        model: model.display_name(),
        n_points: rows.len(),
        rmse: fitted.rmse(),
        predictions,
    })
}

/// Fit every metric in `metrics`, in order.
pub fn fit_metrics(
    model: &dyn TrendModel,
    metrics: &[Metric],
    rows: &[TrainingRow],
    horizon_index: &[f64],
) -> Result<Vec<MetricFit>, AppError> {
    metrics
        .iter()
        .map(|&m| fit_metric(model, m, rows, horizon_index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrendStrategy;
    use crate::models::trend_model;
    use chrono::NaiveDate;

    fn rows(n: usize) -> Vec<TrainingRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| TrainingRow {
                date: start + chrono::Duration::days(i as i64),
                index: (i + 1) as f64,
                checks: 100.0 + i as f64,
                avg_check: 3000.0,
                total_sales: (100.0 + i as f64) * 3000.0,
            })
            .collect()
    }

    #[test]
    fn fits_each_metric_with_aligned_predictions() {
        let model = trend_model(TrendStrategy::Polynomial, 12);
        let fits = fit_metrics(
            model.as_ref(),
            &[Metric::Checks, Metric::AvgCheck],
            &rows(10),
            &[11.0, 12.0],
        )
        .unwrap();

        assert_eq!(fits.len(), 2);
        assert_eq!(fits[0].metric, Metric::Checks);
        assert!((fits[0].predictions[0] - 110.0).abs() < 1e-6);
        assert!((fits[0].predictions[1] - 111.0).abs() < 1e-6);
        assert!((fits[1].predictions[0] - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn insufficiency_names_the_metric() {
        let model = trend_model(TrendStrategy::Polynomial, 12);
        let err = fit_metric(model.as_ref(), Metric::AvgCheck, &rows(2), &[3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataInsufficiency);
        assert!(err.message().contains("avg_check"));
    }
}
