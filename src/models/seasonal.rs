//! Seasonal ARIMA, order (1,1,1) with seasonal order (0,1,1,s).
//!
//! Model, with `B` the backshift operator and `s` the seasonal period:
//!
//! ```text
//! (1 - φB) (1 - B) (1 - B^s) y_t = (1 + θB) (1 + ΘB^s) e_t
//! ```
//!
//! Writing `w_t = (1 - B)(1 - B^s) y_t`, the shocks are recovered recursively:
//!
//! ```text
//! e_t = w_t - φ w_{t-1} - θ e_{t-1} - Θ e_{t-s} - θΘ e_{t-s-1}
//! ```
//!
//! with pre-sample terms set to zero. Coefficients minimise the conditional sum
//! of squares (CSS) `Σ e_t²`: a coarse deterministic grid first, then a
//! coordinate search with halving steps. Forecasts set future shocks to zero and
//! integrate the differenced predictions back to levels.

use crate::error::AppError;
use crate::fit::coef_grid::{coef_grid, lin_space};
use crate::models::model::{FittedTrend, TrendModel, check_fit_input};

/// Coefficients are kept strictly inside the invertible/stationary region.
const COEF_BOUND: f64 = 0.99;
const GRID_MIN: f64 = -0.9;
const GRID_MAX: f64 = 0.9;
const GRID_STEPS: usize = 19;
const REFINE_START: f64 = 0.05;
const REFINE_END: f64 = 1e-4;
const REFINE_MAX_ITERS: usize = 500;

#[derive(Debug, Clone)]
pub struct SeasonalArima {
    period: usize,
}

impl SeasonalArima {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(2),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Estimated coefficients `(φ, θ, Θ)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArimaCoefs {
    pub phi: f64,
    pub theta: f64,
    pub seasonal_theta: f64,
}

impl ArimaCoefs {
    fn from_array(c: [f64; 3]) -> Self {
        Self {
            phi: c[0],
            theta: c[1],
            seasonal_theta: c[2],
        }
    }

    fn as_array(self) -> [f64; 3] {
        [self.phi, self.theta, self.seasonal_theta]
    }

    fn norm_sq(self) -> f64 {
        self.as_array().iter().map(|c| c * c).sum()
    }
}

#[derive(Debug, Clone)]
pub struct FittedSeasonal {
    period: usize,
    coefs: ArimaCoefs,
    history: Vec<f64>,
    diffed: Vec<f64>,
    residuals: Vec<f64>,
    last_index: f64,
    rmse: f64,
}

impl FittedSeasonal {
    pub fn coefs(&self) -> ArimaCoefs {
        self.coefs
    }

    /// Level forecasts for the next `steps` periods after the last observation.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let s = self.period;
        let c = self.coefs;
        let mut y = self.history.clone();
        let mut w = self.diffed.clone();
        let mut e = self.residuals.clone();

        for _ in 0..steps {
            let t = w.len();
            let w_hat = c.phi * lag(&w, t, 1)
                + c.theta * lag(&e, t, 1)
                + c.seasonal_theta * lag(&e, t, s)
                + c.theta * c.seasonal_theta * lag(&e, t, s + 1);
            w.push(w_hat);
            e.push(0.0);

            let n = y.len();
            let level = w_hat + y[n - 1] + y[n - s] - y[n - s - 1];
            y.push(level);
        }

        y.split_off(self.history.len())
    }
}

impl TrendModel for SeasonalArima {
    fn display_name(&self) -> &'static str {
        "SARIMA(1,1,1)(0,1,1)"
    }

    fn min_points(&self) -> usize {
        2 * self.period
    }

    fn fit(&self, index: &[f64], values: &[f64]) -> Result<Box<dyn FittedTrend>, AppError> {
        check_fit_input(self, index, values)?;

        let s = self.period;
        let diffed = difference(values, s);
        let coefs = estimate_coefs(&diffed, s)?;
        let residuals = css_residuals(&diffed, coefs, s);
        let rmse = (residuals.iter().map(|e| e * e).sum::<f64>() / residuals.len().max(1) as f64).sqrt();

        log::debug!(
            "SARIMA fit: n={} phi={:.4} theta={:.4} seasonal_theta={:.4} rmse={:.4}",
            values.len(),
            coefs.phi,
            coefs.theta,
            coefs.seasonal_theta,
            rmse
        );

        let last_index = index.last().copied().unwrap_or(0.0);
        Ok(Box::new(FittedSeasonal {
            period: s,
            coefs,
            history: values.to_vec(),
            diffed,
            residuals,
            last_index,
            rmse,
        }))
    }
}

impl FittedTrend for FittedSeasonal {
    fn predict(&self, index: &[f64]) -> Result<Vec<f64>, AppError> {
        let mut steps = Vec::with_capacity(index.len());
        for &x in index {
            let k = (x - self.last_index).round();
            if !k.is_finite() || k < 1.0 {
                return Err(AppError::config(format!(
                    "Seasonal strategy only forecasts forward: index {x} is not after the last observation {}.",
                    self.last_index
                )));
            }
            steps.push(k as usize);
        }

        let max_steps = steps.iter().copied().max().unwrap_or(0);
        let path = self.forecast(max_steps);
        let out: Vec<f64> = steps.iter().map(|&k| path[k - 1]).collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numeric("Non-finite seasonal forecast."));
        }
        Ok(out)
    }

    fn rmse(&self) -> f64 {
        self.rmse
    }
}

/// `(1 - B)(1 - B^s) y`, dropping the first `s + 1` undefined terms.
pub fn difference(y: &[f64], s: usize) -> Vec<f64> {
    (s + 1..y.len())
        .map(|t| y[t] - y[t - 1] - y[t - s] + y[t - s - 1])
        .collect()
}

/// Recover the shocks `e_t` for the given coefficients.
pub fn css_residuals(w: &[f64], c: ArimaCoefs, s: usize) -> Vec<f64> {
    let mut e = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let et = w[t]
            - c.phi * lag(w, t, 1)
            - c.theta * lag(&e, t, 1)
            - c.seasonal_theta * lag(&e, t, s)
            - c.theta * c.seasonal_theta * lag(&e, t, s + 1);
        e.push(et);
    }
    e
}

fn css(w: &[f64], c: ArimaCoefs, s: usize) -> f64 {
    css_residuals(w, c, s).iter().map(|e| e * e).sum()
}

/// `v[t - k]`, or zero before the start of the series.
fn lag(v: &[f64], t: usize, k: usize) -> f64 {
    if t >= k { v[t - k] } else { 0.0 }
}

fn estimate_coefs(w: &[f64], s: usize) -> Result<ArimaCoefs, AppError> {
    let values = lin_space(GRID_MIN, GRID_MAX, GRID_STEPS)?;
    let grid = coef_grid(&values);

    // Deterministic selection: minimum CSS; break ties by smaller norm, then grid order.
    let mut best: Option<(ArimaCoefs, f64)> = None;
    for candidate in grid {
        let c = ArimaCoefs::from_array(candidate);
        let score = css(w, c, s);
        if !score.is_finite() {
            continue;
        }
        let better = match best {
            None => true,
            Some((b, b_score)) => score < b_score || (score == b_score && c.norm_sq() < b.norm_sq()),
        };
        if better {
            best = Some((c, score));
        }
    }

    let Some((mut coefs, mut score)) = best else {
        return Err(AppError::numeric("No finite CSS candidate for the seasonal model."));
    };

    let mut step = REFINE_START;
    let mut iters = 0;
    while step >= REFINE_END && iters < REFINE_MAX_ITERS {
        iters += 1;
        let mut improved = false;
        for k in 0..3 {
            for dir in [-1.0, 1.0] {
                let mut arr = coefs.as_array();
                arr[k] = (arr[k] + dir * step).clamp(-COEF_BOUND, COEF_BOUND);
                let candidate = ArimaCoefs::from_array(arr);
                let candidate_score = css(w, candidate, s);
                if candidate_score.is_finite() && candidate_score < score {
                    coefs = candidate;
                    score = candidate_score;
                    improved = true;
                }
            }
        }
        if !improved {
            step /= 2.0;
        }
    }

    Ok(coefs)
}
