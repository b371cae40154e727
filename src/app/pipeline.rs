//! Forecast assembly: the fixed sequence of steps that turns a cleaned dataset
//! into a finished `ForecastSeries`.
//!
//! filter -> fit -> predict -> round checks (daily) -> floor -> replacement
//! (daily) -> total = checks × average check (daily) -> additive doubling ->
//! final rounding -> sort
//!
//! The CLI only handles I/O and presentation; everything here is pure and
//! deterministic.

use chrono::Datelike;

use crate::adjust::{
    DraftPoint, FifteenthReference, FifteenthReport, FloorReport, HistoricalBest, apply_additive_doubling,
    apply_replacement, enforce_floor,
};
use crate::data::{DatasetStats, HistoricalDataset, OutlierBand, OutlierReport, RawObservation, filter_outliers};
use crate::domain::{ForecastConfig, ForecastPoint, ForecastSeries, Granularity, Metric};
use crate::error::AppError;
use crate::fit::{MetricFit, fit_metrics};
use crate::models::trend_model;

/// All computed outputs of a single `salescast forecast` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: DatasetStats,
    pub outliers: OutlierReport,
    pub fits: Vec<MetricFit>,
    pub floor: FloorReport,
    pub fifteenth: FifteenthReport,
    pub series: ForecastSeries,
}

/// Validate raw rows and run the pipeline on them.
pub fn run_forecast_raw(rows: &[RawObservation], config: &ForecastConfig) -> Result<RunOutput, AppError> {
    config.validate()?;
    let dataset = HistoricalDataset::from_raw(rows, config.base_year)?;
    run_forecast(&dataset, config)
}

/// Run the forecasting pipeline on an already-cleaned dataset.
pub fn run_forecast(dataset: &HistoricalDataset, config: &ForecastConfig) -> Result<RunOutput, AppError> {
    config.validate()?;

    let granularity = config.granularity;
    let forecast_year = config
        .forecast_year
        .unwrap_or_else(|| dataset.last_date().year() + 1);

    // 1) Training rows and outlier filter.
    let rows = dataset.training_rows(granularity);
    let band = OutlierBand {
        iqr_multiplier: config.iqr_multiplier,
        abs_min: config.avg_check_min,
        abs_max: config.avg_check_max,
    };
    let (filtered, outliers) = filter_outliers(&rows, &band);
    if filtered.is_empty() {
        return Err(AppError::insufficient(format!(
            "No {} rows left after outlier filtering (band [{:.2}, {:.2}]).",
            granularity.display_name(),
            outliers.lower,
            outliers.upper
        )));
    }

    // 2) Fit and predict over the horizon.
    let horizon = granularity.horizon(forecast_year)?;
    let horizon_index: Vec<f64> = horizon
        .iter()
        .map(|d| dataset.index_of(*d, granularity))
        .collect();
    let model = trend_model(config.strategy, config.seasonal_period);
    let metrics = granularity.fitted_metrics();
    let fits = fit_metrics(model.as_ref(), metrics, &filtered, &horizon_index)?;

    let mut points = draft_points(&horizon, &fits, granularity);

    // 3) Corrections.
    if granularity == Granularity::Daily {
        for p in &mut points {
            p.checks = p.checks.round();
        }
    }

    let best = HistoricalBest::from_rows(&rows, granularity);
    let floor = enforce_floor(&mut points, &best, granularity, metrics, config.floor_multiplier);

    let reference = FifteenthReference::from_dataset(dataset, forecast_year - 1);
    let mut fifteenth = FifteenthReport {
        reference_year: reference.year,
        ..FifteenthReport::default()
    };

    if config.fifteenth.replacement() {
        match granularity {
            Granularity::Daily => fifteenth.replaced = apply_replacement(&mut points, &reference),
            Granularity::Monthly => {
                log::info!("Fifteenth-day replacement applies to daily forecasts only; skipped.")
            }
        }
    }

    if granularity == Granularity::Daily {
        for p in &mut points {
            p.total_sales = p.checks.max(0.0).round() * p.avg_check;
        }
    }

    if config.fifteenth.additive() {
        fifteenth.doubled = apply_additive_doubling(&mut points, &reference, granularity).len();
    }

    if config.fifteenth.additive() || config.fifteenth.replacement() {
        log::info!(
            "Fifteenth-day adjustment (reference {}): {} replaced, {} doubled",
            reference.year,
            fifteenth.replaced,
            fifteenth.doubled
        );
    }

    // 4) Finalise.
    let finished: Vec<ForecastPoint> = points
        .into_iter()
        .map(|p| ForecastPoint {
            date: p.date,
            checks: p.checks.max(0.0).round() as u64,
            avg_check: p.avg_check,
            total_sales: p.total_sales,
        })
        .collect();

    let series = ForecastSeries::new(granularity, dataset.base_year(), forecast_year, finished);
    log::info!(
        "Forecast {} {}: {} points, total sales {:.2}",
        granularity.display_name(),
        forecast_year,
        series.len(),
        series.total(Metric::TotalSales)
    );

    Ok(RunOutput {
        dataset: dataset.stats().clone(),
        outliers,
        fits,
        floor,
        fifteenth,
        series,
    })
}

/// Join per-metric predictions into one draft point per horizon date.
///
/// Daily total sales is a placeholder here; it is derived after corrections.
fn draft_points(horizon: &[chrono::NaiveDate], fits: &[MetricFit], granularity: Granularity) -> Vec<DraftPoint> {
    let predicted = |metric: Metric, i: usize| -> f64 {
        fits.iter()
            .find(|f| f.metric == metric)
            .and_then(|f| f.predictions.get(i).copied())
            .unwrap_or(0.0)
    };

    horizon
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let checks = predicted(Metric::Checks, i);
            let avg_check = predicted(Metric::AvgCheck, i);
            let total_sales = match granularity {
                Granularity::Daily => checks * avg_check,
                Granularity::Monthly => predicted(Metric::TotalSales, i),
            };
            DraftPoint {
                date,
                checks,
                avg_check,
                total_sales,
            }
        })
        .collect()
}
