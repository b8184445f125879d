//! Ordinary least squares.

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use super::{least_squares, LinearFit};

/// Ordinary least squares linear regression with intercept.
///
/// # Example
///
/// ```rust
/// use estimator_core::prelude::*;
///
/// let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
/// let mut model = LinearRegression::new();
/// model.fit(&x, &[2.0, 4.0, 6.0]).unwrap();
/// assert!((model.coefficients().unwrap()[0] - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    fit: Option<LinearFit>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coef.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &str {
        "linear"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        self.fit = Some(least_squares(x, y, 0.0)?);
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
