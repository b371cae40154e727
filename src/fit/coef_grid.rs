//! Coefficient grid generation for the seasonal model.
//!
//! The SARIMA coefficients are first located by a deterministic grid search
//! over `(φ, θ, Θ)` and only then refined locally. A full cube is searched so
//! the refinement starts near the global CSS minimum rather than in whichever
//! basin a single starting point happens to fall into.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::config(format!(
            "Invalid coefficient range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::config("Coefficient grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// Cartesian cube `values³` in lexicographic order.
pub fn coef_grid(values: &[f64]) -> Vec<[f64; 3]> {
    let mut out = Vec::with_capacity(values.len().pow(3));
    for &a in values {
        for &b in values {
            for &c in values {
                out.push([a, b, c]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(-0.9, 0.9, 19).unwrap();
        assert_eq!(v.len(), 19);
        assert!((v[0] + 0.9).abs() < 1e-12);
        assert!((v[18] - 0.9).abs() < 1e-12);
        assert!(v[9].abs() < 1e-12);
    }

    #[test]
    fn lin_space_rejects_bad_ranges() {
        assert!(lin_space(1.0, 1.0, 5).is_err());
        assert!(lin_space(0.0, 1.0, 1).is_err());
    }

    #[test]
    fn grid_is_full_cube() {
        let grid = coef_grid(&[-1.0, 0.0, 1.0]);
        assert_eq!(grid.len(), 27);
        assert_eq!(grid[0], [-1.0, -1.0, -1.0]);
        assert_eq!(grid[26], [1.0, 1.0, 1.0]);
    }
}
