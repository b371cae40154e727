//! Degree-2 polynomial regression over the day/month index.
//!
//! The index is centred and scaled before expansion:
//!
//! ```text
//! z = (x - mean(x)) / scale,   y ≈ β0 + β1 z + β2 z²
//! ```
//!
//! Day numbers run into the thousands, so `x²` alone would leave the design
//! badly conditioned. The affine change of variable does not alter the OLS
//! predictions.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::{rmse, solve_least_squares};
use crate::models::model::{FittedTrend, TrendModel, check_fit_input};

const DEGREE: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct PolynomialTrend;

#[derive(Debug, Clone)]
pub struct FittedPolynomial {
    center: f64,
    scale: f64,
    betas: Vec<f64>,
    rmse: f64,
}

/// Fill a design row `[1, z, z²]`.
///
/// # Panics
/// Panics if `out` is shorter than `DEGREE + 1`.
pub fn fill_design_row(z: f64, out: &mut [f64]) {
    out[0] = 1.0;
    out[1] = z;
    out[2] = z * z;
}

impl TrendModel for PolynomialTrend {
    fn display_name(&self) -> &'static str {
        "polynomial (deg 2)"
    }

    fn min_points(&self) -> usize {
        DEGREE + 1
    }

    fn fit(&self, index: &[f64], values: &[f64]) -> Result<Box<dyn FittedTrend>, AppError> {
        check_fit_input(self, index, values)?;

        let n = index.len();
        let center = index.iter().sum::<f64>() / n as f64;
        let spread = index
            .iter()
            .map(|x| (x - center).abs())
            .fold(0.0_f64, f64::max);
        let scale = if spread > 0.0 { spread } else { 1.0 };

        let p = DEGREE + 1;
        let mut x = DMatrix::<f64>::zeros(n, p);
        let y = DVector::from_row_slice(values);
        let mut row = [0.0; DEGREE + 1];
        for (i, &xi) in index.iter().enumerate() {
            fill_design_row((xi - center) / scale, &mut row);
            for j in 0..p {
                x[(i, j)] = row[j];
            }
        }

        let beta = solve_least_squares(&x, &y)
            .ok_or_else(|| AppError::numeric("Polynomial least-squares solve failed."))?;

        let mut fitted = FittedPolynomial {
            center,
            scale,
            betas: beta.iter().copied().collect(),
            rmse: 0.0,
        };
        let in_sample = fitted.predict(index)?;
        fitted.rmse = rmse(values, &in_sample);

        Ok(Box::new(fitted))
    }
}

impl FittedPolynomial {
    fn eval(&self, x: f64) -> f64 {
        let z = (x - self.center) / self.scale;
        let mut row = [0.0; DEGREE + 1];
        fill_design_row(z, &mut row);
        row.iter().zip(self.betas.iter()).map(|(r, b)| r * b).sum()
    }
}

impl FittedTrend for FittedPolynomial {
    fn predict(&self, index: &[f64]) -> Result<Vec<f64>, AppError> {
        let out: Vec<f64> = index.iter().map(|&x| self.eval(x)).collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numeric("Non-finite polynomial prediction."));
        }
        Ok(out)
    }

    fn rmse(&self) -> f64 {
        self.rmse
    }
}
