//! Linear models.
//!
//! All models fit an intercept by centering features and targets, then solve
//! for the coefficients of the centered problem.

mod bayesian;
mod elastic_net;
mod ols;
mod ridge;

pub use bayesian::BayesianRidge;
pub use elastic_net::{linspace, logspace, AlphaGrid, ElasticNet, ElasticNetCv};
pub use ols::LinearRegression;
pub use ridge::{Ridge, RidgeCv};

use estimator_spi::{EstimatorError, Matrix, Result};

use crate::linalg;

/// Fitted coefficients of a linear model with intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LinearFit {
    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + linalg::dot(&self.coef, row)
    }

    pub fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        x.ensure_cols(self.coef.len())?;
        Ok(x.iter_rows().map(|row| self.predict_row(row)).collect())
    }
}

/// Weighted least squares with an L2 penalty `ridge` on the coefficients.
///
/// A singular system is retried once with a small diagonal jitter so that
/// collinear or under-determined designs still yield a finite fit.
pub fn weighted_least_squares(
    x: &Matrix,
    y: &[f64],
    weights: &[f64],
    ridge: f64,
) -> Result<LinearFit> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(EstimatorError::NumericalError(
            "Sample weights sum to zero".to_string(),
        ));
    }
    let p = x.cols();
    let mut x_mean = vec![0.0; p];
    let mut y_mean = 0.0;
    for (i, row) in x.iter_rows().enumerate() {
        let w = weights[i] / total;
        y_mean += w * y[i];
        for (m, v) in x_mean.iter_mut().zip(row) {
            *m += w * v;
        }
    }

    let (mut xtx, xty) = linalg::gram(x, y, weights, &x_mean, y_mean);
    for j in 0..p {
        xtx[j * p + j] += ridge;
    }

    let coef = match linalg::solve(xtx.clone(), xty.clone(), p) {
        Ok(coef) => coef,
        Err(_) => {
            let trace: f64 = (0..p).map(|j| xtx[j * p + j]).sum();
            let jitter = 1e-10 * (trace / p as f64).max(1.0);
            for j in 0..p {
                xtx[j * p + j] += jitter;
            }
            linalg::solve(xtx, xty, p)?
        }
    };

    let intercept = y_mean - linalg::dot(&coef, &x_mean);
    Ok(LinearFit { coef, intercept })
}

/// Ordinary least squares with unit weights.
pub fn least_squares(x: &Matrix, y: &[f64], ridge: f64) -> Result<LinearFit> {
    weighted_least_squares(x, y, &vec![1.0; y.len()], ridge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_least_squares_exact_plane() {
        // y = 1 + 2a - b
        let rows = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![2.0, 3.0],
            vec![4.0, 1.0],
        ];
        let y: Vec<f64> = rows.iter().map(|r| 1.0 + 2.0 * r[0] - r[1]).collect();
        let x = Matrix::from_rows(&rows).unwrap();
        let fit = least_squares(&x, &y, 0.0).unwrap();
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.coef[0] - 2.0).abs() < 1e-9);
        assert!((fit.coef[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_design_still_fits() {
        let rows = vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]];
        let x = Matrix::from_rows(&rows).unwrap();
        let y = vec![1.0, 2.0, 3.0];
        let fit = least_squares(&x, &y, 0.0).unwrap();
        let predicted = fit.predict(&x).unwrap();
        for (p, t) in predicted.iter().zip(&y) {
            assert!((p - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_zero_weights_rejected() {
        let x = Matrix::column_vector(&[1.0, 2.0]);
        assert!(weighted_least_squares(&x, &[1.0, 2.0], &[0.0, 0.0], 0.0).is_err());
    }
}
