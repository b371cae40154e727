//! Ordinary least squares solver.
//!
//! The polynomial trend strategy solves one small regression per metric:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with a three-column design (`1, z, z²`).
//!
//! Implementation choices:
//! - We use SVD so the tall (more rows than columns) system is solved robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - A rank-deficient design (e.g. all index values equal) still yields the
//!   minimum-norm solution instead of an error.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_recovers_quadratic() {
        // y = 1 - 2x + 0.5x^2 on x = -2..=2
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let mut rows = Vec::new();
        let mut ys = Vec::new();
        for &x in &xs {
            rows.extend_from_slice(&[1.0, x, x * x]);
            ys.push(1.0 - 2.0 * x + 0.5 * x * x);
        }
        let x = DMatrix::from_row_slice(xs.len(), 3, &rows);
        let y = DVector::from_row_slice(&ys);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-9);
        assert!((beta[1] + 2.0).abs() < 1e-9);
        assert!((beta[2] - 0.5).abs() < 1e-9);
    }
}
