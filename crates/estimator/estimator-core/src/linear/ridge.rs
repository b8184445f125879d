//! Ridge regression and its leave-one-out tuned variant.

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use super::{least_squares, LinearFit};
use crate::linalg;

/// L2-penalised least squares.
#[derive(Debug, Clone)]
pub struct Ridge {
    alpha: f64,
    fit: Option<LinearFit>,
}

impl Ridge {
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha >= 0.0) {
            return Err(EstimatorError::InvalidParameter {
                name: "alpha".to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        Ok(Self { alpha, fit: None })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Regressor for Ridge {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        self.fit = Some(least_squares(x, y, self.alpha)?);
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

/// Ridge regression choosing `alpha` by efficient leave-one-out error.
///
/// For each candidate the LOO residual of row `i` is `e_i / (1 - h_ii)` where
/// `h_ii` is the leverage under the penalised hat matrix.
#[derive(Debug, Clone)]
pub struct RidgeCv {
    alphas: Vec<f64>,
    best_alpha: Option<f64>,
    fit: Option<LinearFit>,
}

impl RidgeCv {
    pub fn new(alphas: Vec<f64>) -> Result<Self> {
        if alphas.is_empty() || alphas.iter().any(|a| !(*a > 0.0)) {
            return Err(EstimatorError::InvalidParameter {
                name: "alphas".to_string(),
                reason: "must be a non-empty list of positive values".to_string(),
            });
        }
        Ok(Self {
            alphas,
            best_alpha: None,
            fit: None,
        })
    }

    /// The alpha chosen by the last fit.
    pub fn best_alpha(&self) -> Option<f64> {
        self.best_alpha
    }

    fn loo_error(x: &Matrix, y: &[f64], alpha: f64) -> Result<f64> {
        let p = x.cols();
        let fit = least_squares(x, y, alpha)?;
        let x_mean = linalg::column_means(x);
        let ones = vec![1.0; y.len()];
        let (mut xtx, _) = linalg::gram(x, y, &ones, &x_mean, 0.0);
        for j in 0..p {
            xtx[j * p + j] += alpha;
        }
        let inverse = linalg::invert(&xtx, p)?;
        let n = y.len() as f64;

        let mut total = 0.0;
        for (i, row) in x.iter_rows().enumerate() {
            let centered: Vec<f64> = row.iter().zip(&x_mean).map(|(v, m)| v - m).collect();
            let mut leverage = 1.0 / n;
            for a in 0..p {
                for b in 0..p {
                    leverage += centered[a] * inverse[a * p + b] * centered[b];
                }
            }
            let residual = y[i] - fit.predict_row(row);
            let denom = 1.0 - leverage;
            if denom.abs() < 1e-12 {
                return Ok(f64::INFINITY);
            }
            total += (residual / denom).powi(2);
        }
        Ok(total / n)
    }
}

impl Regressor for RidgeCv {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let mut best = (self.alphas[0], f64::INFINITY);
        for &alpha in &self.alphas {
            if let Ok(error) = Self::loo_error(x, y, alpha) {
                if error < best.1 {
                    best = (alpha, error);
                }
            }
        }
        self.fit = Some(least_squares(x, y, best.0)?);
        self.best_alpha = Some(best.0);
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
