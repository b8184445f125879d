use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::linalg;
use crate::linear::{least_squares, weighted_least_squares, LinearFit};

const L2_PENALTY: f64 = 1e-4;
const TOLERANCE: f64 = 1e-5;

/// Linear regression with the Huber loss, fitted by iteratively reweighted
/// least squares. Residuals beyond `epsilon` robust standard deviations are
/// down-weighted linearly; the scale is the normalised median absolute
/// residual of the current fit.
#[derive(Debug, Clone)]
pub struct HuberRegressor {
    epsilon: f64,
    max_iter: usize,
    fit: Option<LinearFit>,
    scale: Option<f64>,
}

impl HuberRegressor {
    pub fn new(epsilon: f64, max_iter: usize) -> Result<Self> {
        if !(epsilon >= 1.0) {
            return Err(EstimatorError::InvalidParameter {
                name: "epsilon".to_string(),
                reason: "must be at least 1.0".to_string(),
            });
        }
        Ok(Self {
            epsilon,
            max_iter: max_iter.max(1),
            fit: None,
            scale: None,
        })
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coef.as_slice())
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }
}

impl Default for HuberRegressor {
    fn default() -> Self {
        Self {
            epsilon: 1.35,
            max_iter: 1000,
            fit: None,
            scale: None,
        }
    }
}

impl Regressor for HuberRegressor {
    fn name(&self) -> &str {
        "huber"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let mut fit = least_squares(x, y, L2_PENALTY)?;
        let mut scale = 0.0;

        for _ in 0..self.max_iter {
            let residuals: Vec<f64> = x
                .iter_rows()
                .zip(y)
                .map(|(row, t)| t - fit.predict_row(row))
                .collect();
            scale = linalg::median_absolute_deviation(&residuals) / 0.6745;
            if scale <= 1e-12 {
                break;
            }
            let weights: Vec<f64> = residuals
                .iter()
                .map(|r| {
                    let z = r.abs() / scale;
                    if z <= self.epsilon {
                        1.0
                    } else {
                        self.epsilon / z
                    }
                })
                .collect();
            let next = weighted_least_squares(x, y, &weights, L2_PENALTY)?;
            let change = next
                .coef
                .iter()
                .zip(&fit.coef)
                .map(|(a, b)| (a - b).abs())
                .fold((next.intercept - fit.intercept).abs(), f64::max);
            fit = next;
            if change < TOLERANCE {
                break;
            }
        }

        self.scale = Some(scale);
        self.fit = Some(fit);
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
    use crate::linear::LinearRegression;

    fn with_outlier() -> (Matrix, Vec<f64>) {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let mut y: Vec<f64> = xs
            .iter()
            .map(|v| 2.0 * v + 1.0 + 0.1 * (v * 1.3).sin())
            .collect();
        y[19] += 200.0;
        (Matrix::column_vector(&xs), y)
    }

    #[test]
    fn test_huber_resists_outlier() {
        let (x, y) = with_outlier();
        let mut huber = HuberRegressor::default();
        let mut ols = LinearRegression::new();
        huber.fit(&x, &y).unwrap();
        ols.fit(&x, &y).unwrap();
        let huber_slope = huber.coefficients().unwrap()[0];
        let ols_slope = ols.coefficients().unwrap()[0];
        assert!((huber_slope - 2.0).abs() < (ols_slope - 2.0).abs());
        assert!((huber_slope - 2.0).abs() < 0.3);
    }

    #[test]
    fn test_huber_rejects_small_epsilon() {
        assert!(HuberRegressor::new(0.5, 100).is_err());
    }
}
