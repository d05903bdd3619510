//! Least squares helpers for the chart trend lines.
//!
//! The design matrix is tall (one row per country, two columns), so the
//! system is solved through SVD rather than `QR::solve`, which only accepts
//! square systems.

use nalgebra::{DMatrix, DVector};

/// Solve `min ||x β - y||²` using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser tolerances for near-singular designs.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ordinary least squares line `y = slope * x + intercept`.
///
/// Needs at least two points with distinct `x`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let first = xs[0];
    if xs[..n].iter().all(|&x| (x - first).abs() < 1e-12) {
        return None;
    }

    let mut data = Vec::with_capacity(n * 2);
    for &x in &xs[..n] {
        data.push(x);
        data.push(1.0);
    }
    let design = DMatrix::from_row_slice(n, 2, &data);
    let target = DVector::from_row_slice(&ys[..n]);
    let beta = solve_least_squares(&design, &target)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn line_through_noisy_points() {
        let xs = [-100.0, 0.0, 100.0, 200.0];
        let ys = [20.0, 18.0, 17.0, 13.0];
        let (slope, intercept) = fit_line(&xs, &ys).unwrap();
        // Closed form: slope = Sxy / Sxx.
        assert!((slope - (-0.022)).abs() < 1e-10);
        assert!((intercept - 18.1).abs() < 1e-10);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(fit_line(&[1.0], &[2.0]), None);
        assert_eq!(fit_line(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), None);
    }
}
