use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::search::KFold;

/// Two-level ensemble: base estimators feed a final estimator.
///
/// With `cv = Some(k)` the final estimator is trained on out-of-fold base
/// predictions; with `None` (or fewer than two rows per fold) it sees the
/// in-sample predictions. Base estimators are always refit on all rows.
#[derive(Clone)]
pub struct StackingRegressor {
    estimators: Vec<Box<dyn Regressor>>,
    final_estimator: Box<dyn Regressor>,
    cv: Option<usize>,
    fitted: bool,
}

impl std::fmt::Debug for StackingRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.estimators.iter().map(|e| e.name()).collect();
        f.debug_struct("StackingRegressor")
            .field("estimators", &names)
            .field("final_estimator", &self.final_estimator.name())
            .field("cv", &self.cv)
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl StackingRegressor {
    pub fn new(
        estimators: Vec<Box<dyn Regressor>>,
        final_estimator: Box<dyn Regressor>,
        cv: Option<usize>,
    ) -> Result<Self> {
        if estimators.is_empty() {
            return Err(EstimatorError::InvalidParameter {
                name: "estimators".to_string(),
                reason: "at least one base estimator is required".to_string(),
            });
        }
        Ok(Self {
            estimators,
            final_estimator,
            cv,
            fitted: false,
        })
    }

    pub fn estimators(&self) -> &[Box<dyn Regressor>] {
        &self.estimators
    }

    pub fn cv(&self) -> Option<usize> {
        self.cv
    }

    /// Base predictions laid out as one column per estimator.
    fn meta_features(&self, x: &Matrix) -> Result<Matrix> {
        let m = self.estimators.len();
        let mut data = vec![0.0; x.rows() * m];
        for (j, estimator) in self.estimators.iter().enumerate() {
            for (i, v) in estimator.predict(x)?.into_iter().enumerate() {
                data[i * m + j] = v;
            }
        }
        Matrix::new(x.rows(), m, data)
    }

    fn out_of_fold(&self, x: &Matrix, y: &[f64], folds: usize) -> Result<Option<Matrix>> {
        let splits = KFold::new(folds).split(y.len());
        if splits.is_empty() {
            return Ok(None);
        }
        let m = self.estimators.len();
        let mut data = vec![0.0; y.len() * m];
        for (train, test) in &splits {
            let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();
            let x_train = x.select_rows(train);
            let x_test = x.select_rows(test);
            for (j, estimator) in self.estimators.iter().enumerate() {
                let mut model = estimator.clone_box();
                model.fit(&x_train, &y_train)?;
                for (&row, v) in test.iter().zip(model.predict(&x_test)?) {
                    data[row * m + j] = v;
                }
            }
        }
        Matrix::new(y.len(), m, data).map(Some)
    }
}

impl Regressor for StackingRegressor {
    fn name(&self) -> &str {
        "stacking"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let oof = match self.cv {
            Some(folds) => self.out_of_fold(x, y, folds)?,
            None => None,
        };
        for estimator in &mut self.estimators {
            estimator.fit(x, y)?;
        }
        let meta = match oof {
            Some(meta) => meta,
            None => self.meta_features(x)?,
        };
        self.final_estimator.fit(&meta, y)?;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(EstimatorError::NotFitted);
        }
        let meta = self.meta_features(x)?;
        self.final_estimator.predict(&meta)
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LinearRegression;
    use crate::tree::{DecisionTreeRegressor, TreeParams};

    fn line() -> (Matrix, Vec<f64>) {
        let xs: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let y = xs.iter().map(|v| 3.0 * v - 2.0).collect();
        (Matrix::column_vector(&xs), y)
    }

    #[test]
    fn test_stacking_linear_over_linear_is_exact() {
        let (x, y) = line();
        let mut model = StackingRegressor::new(
            vec![Box::new(LinearRegression::new())],
            Box::new(LinearRegression::new()),
            Some(3),
        )
        .unwrap();
        model.fit(&x, &y).unwrap();
        let predicted = model.predict(&Matrix::column_vector(&[20.0])).unwrap();
        assert!((predicted[0] - 58.0).abs() < 1e-6);
    }

    #[test]
    fn test_stacking_in_sample_with_tiny_data() {
        let x = Matrix::column_vector(&[1.0, 2.0, 3.0]);
        let y = vec![2.0, 4.0, 6.0];
        let mut model = StackingRegressor::new(
            vec![
                Box::new(LinearRegression::new()),
                Box::new(DecisionTreeRegressor::new(TreeParams::default()).unwrap()),
            ],
            Box::new(LinearRegression::new()),
            None,
        )
        .unwrap();
        model.fit(&x, &y).unwrap();
        let predicted = model.predict(&x).unwrap();
        for (p, t) in predicted.iter().zip(&y) {
            assert!((p - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_stacking_requires_estimators() {
        assert!(StackingRegressor::new(vec![], Box::new(LinearRegression::new()), None).is_err());
    }
}
