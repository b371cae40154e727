//! Trend model interface shared by the regression and seasonal strategies.
//!
//! A strategy is fit once per metric on `(index, value)` pairs and then asked
//! for predictions at future index values. Both strategies are deterministic.

use std::fmt::Debug;

use crate::domain::TrendStrategy;
use crate::error::AppError;
use crate::models::polynomial::PolynomialTrend;
use crate::models::seasonal::SeasonalArima;

/// An unfitted strategy.
pub trait TrendModel: Debug {
    /// Human-readable label for terminal output.
    fn display_name(&self) -> &'static str;

    /// Smallest number of points the strategy can be fit on.
    fn min_points(&self) -> usize;

    /// Fit on index/value pairs ordered by index.
    ///
    /// Callers check `min_points` first so they can name the failing metric;
    /// implementations still reject short input with a data-insufficiency error.
    fn fit(&self, index: &[f64], values: &[f64]) -> Result<Box<dyn FittedTrend>, AppError>;
}

/// A fitted strategy, ready to predict.
pub trait FittedTrend: Debug {
    /// Predict the metric at each index value.
    fn predict(&self, index: &[f64]) -> Result<Vec<f64>, AppError>;

    /// In-sample root mean squared error.
    fn rmse(&self) -> f64;
}

/// Build the strategy selected by configuration.
pub fn trend_model(strategy: TrendStrategy, seasonal_period: usize) -> Box<dyn TrendModel> {
    match strategy {
        TrendStrategy::Polynomial => Box::new(PolynomialTrend::default()),
        TrendStrategy::Seasonal => Box::new(SeasonalArima::new(seasonal_period)),
    }
}

/// Shared input checks for `TrendModel::fit`.
pub(crate) fn check_fit_input(
    model: &dyn TrendModel,
    index: &[f64],
    values: &[f64],
) -> Result<(), AppError> {
    if index.len() != values.len() {
        return Err(AppError::numeric(format!(
            "Index length ({}) doesn't match values length ({}).",
            index.len(),
            values.len()
        )));
    }
    if values.len() < model.min_points() {
        return Err(AppError::insufficient(format!(
            "{} needs at least {} points, got {}.",
            model.display_name(),
            model.min_points(),
            values.len()
        )));
    }
    if index.iter().chain(values.iter()).any(|v| !v.is_finite()) {
        return Err(AppError::numeric("Non-finite value in model input."));
    }
    Ok(())
}
