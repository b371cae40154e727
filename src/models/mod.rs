//! Trend models: degree-2 polynomial regression and seasonal ARIMA.
//!
//! Models are hidden behind `TrendModel` / `FittedTrend` so the pipeline can
//! stay generic over the configured strategy.

pub mod model;
pub mod polynomial;
pub mod seasonal;

pub use model::*;
pub use polynomial::PolynomialTrend;
pub use seasonal::SeasonalArima;
