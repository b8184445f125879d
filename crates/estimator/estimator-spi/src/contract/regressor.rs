//! Regressor trait.

use crate::error::EstimatorError;
use crate::model::Matrix;

/// Result type for regressor operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Common trait for all regression models.
///
/// Implementations are opaque to the evaluation engine: it only fits,
/// predicts and copies them.
pub trait Regressor: Send + Sync {
    /// Short registry name of the model.
    fn name(&self) -> &str;

    /// Fit the model to `x` (rows are samples) and targets `y`.
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()>;

    /// Predict one value per row of `x`.
    ///
    /// Fails with [`EstimatorError::ShapeMismatch`] when `x` has a different
    /// number of columns than the training matrix.
    fn predict(&self, x: &Matrix) -> Result<Vec<f64>>;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;

    /// Copy the model with its hyperparameters, used to refit on folds.
    fn clone_box(&self) -> Box<dyn Regressor>;
}

impl Clone for Box<dyn Regressor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts the training mean.
    #[derive(Clone, Default)]
    struct MeanRegressor {
        mean: Option<f64>,
        n_features: usize,
    }

    impl Regressor for MeanRegressor {
        fn name(&self) -> &str {
            "mean"
        }

        fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
            if y.is_empty() {
                return Err(EstimatorError::InsufficientData {
                    required: 1,
                    actual: 0,
                });
            }
            self.n_features = x.cols();
            self.mean = Some(y.iter().sum::<f64>() / y.len() as f64);
            Ok(())
        }

        fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
            let mean = self.mean.ok_or(EstimatorError::NotFitted)?;
            x.ensure_cols(self.n_features)?;
            Ok(vec![mean; x.rows()])
        }

        fn is_fitted(&self) -> bool {
            self.mean.is_some()
        }

        fn clone_box(&self) -> Box<dyn Regressor> {
            Box::new(self.clone())
        }
    }

    fn sample() -> (Matrix, Vec<f64>) {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        (x, vec![2.0, 4.0, 6.0])
    }

    #[test]
    fn test_fit_then_predict() {
        let (x, y) = sample();
        let mut model = MeanRegressor::default();
        assert!(!model.is_fitted());
        model.fit(&x, &y).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(&x).unwrap(), vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = sample();
        let model = MeanRegressor::default();
        assert_eq!(model.predict(&x), Err(EstimatorError::NotFitted));
    }

    #[test]
    fn test_predict_wrong_width() {
        let (x, y) = sample();
        let mut model = MeanRegressor::default();
        model.fit(&x, &y).unwrap();
        let wide = Matrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            model.predict(&wide),
            Err(EstimatorError::ShapeMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_boxed_clone_keeps_name() {
        let boxed: Box<dyn Regressor> = Box::new(MeanRegressor::default());
        let copy = boxed.clone();
        assert_eq!(copy.name(), "mean");
    }
}
