//! Bayesian ridge regression.
//!
//! Noise precision `alpha` and weight precision `lambda` are estimated by
//! maximising the marginal likelihood with MacKay's fixed-point updates,
//! under Gamma(1e-6, 1e-6) hyperpriors.

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use super::LinearFit;
use crate::linalg;

const HYPER: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct BayesianRidge {
    max_iter: usize,
    tol: f64,
    alpha: f64,
    lambda: f64,
    fit: Option<LinearFit>,
}

impl Default for BayesianRidge {
    fn default() -> Self {
        Self::new()
    }
}

impl BayesianRidge {
    pub fn new() -> Self {
        Self {
            max_iter: 300,
            tol: 1e-3,
            alpha: 0.0,
            lambda: 0.0,
            fit: None,
        }
    }

    /// Estimated noise precision.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Estimated weight precision.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Regressor for BayesianRidge {
    fn name(&self) -> &str {
        "bayesian"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let n = y.len() as f64;
        let p = x.cols();
        let x_mean = linalg::column_means(x);
        let y_mean = linalg::mean(y);
        let ones = vec![1.0; y.len()];
        let (xtx, xty) = linalg::gram(x, y, &ones, &x_mean, y_mean);

        let mut alpha = 1.0 / (linalg::variance(y) + f64::EPSILON);
        let mut lambda = 1.0;
        let mut coef = vec![0.0; p];

        for _ in 0..self.max_iter {
            let mut precision = xtx.iter().map(|v| alpha * v).collect::<Vec<_>>();
            for j in 0..p {
                precision[j * p + j] += lambda;
            }
            let sigma = linalg::invert(&precision, p)?;

            let updated: Vec<f64> = (0..p)
                .map(|a| alpha * (0..p).map(|b| sigma[a * p + b] * xty[b]).sum::<f64>())
                .collect();

            let trace: f64 = (0..p).map(|j| sigma[j * p + j]).sum();
            let gamma = p as f64 - lambda * trace;
            let rss: f64 = x
                .iter_rows()
                .zip(y)
                .map(|(row, t)| {
                    let pred: f64 = row
                        .iter()
                        .zip(&x_mean)
                        .zip(&updated)
                        .map(|((v, m), c)| (v - m) * c)
                        .sum();
                    (t - y_mean - pred).powi(2)
                })
                .sum();
            let norm: f64 = updated.iter().map(|c| c * c).sum();

            lambda = (gamma + 2.0 * HYPER) / (norm + 2.0 * HYPER);
            alpha = (n - gamma + 2.0 * HYPER) / (rss + 2.0 * HYPER);

            let change: f64 = updated.iter().zip(&coef).map(|(a, b)| (a - b).abs()).sum();
            coef = updated;
            if change < self.tol {
                break;
            }
        }

        if !alpha.is_finite() || !lambda.is_finite() || coef.iter().any(|c| !c.is_finite()) {
            return Err(EstimatorError::NumericalError(
                "Evidence maximisation diverged".to_string(),
            ));
        }

        self.alpha = alpha;
        self.lambda = lambda;
        let intercept = y_mean - linalg::dot(&coef, &x_mean);
        self.fit = Some(LinearFit { coef, intercept });
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        self.fit.as_ref().ok_or(EstimatorError::NotFitted)?.predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_linear_trend() {
        let xs: Vec<f64> = (0..40).map(|i| i as f64 / 4.0).collect();
        let y: Vec<f64> = xs.iter().map(|v| 4.0 * v - 2.0 + 0.1 * (v * 3.0).sin()).collect();
        let x = Matrix::column_vector(&xs);
        let mut model = BayesianRidge::new();
        model.fit(&x, &y).unwrap();
        let predicted = model.predict(&Matrix::column_vector(&[5.0])).unwrap();
        assert!((predicted[0] - 18.0).abs() < 0.5);
        assert!(model.alpha() > 0.0);
        assert!(model.lambda() > 0.0);
    }
}
