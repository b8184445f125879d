use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

/// Unweighted mean of the member predictions.
#[derive(Clone)]
pub struct VotingRegressor {
    estimators: Vec<Box<dyn Regressor>>,
    fitted: bool,
}

impl std::fmt::Debug for VotingRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.estimators.iter().map(|e| e.name()).collect();
        f.debug_struct("VotingRegressor")
            .field("estimators", &names)
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl VotingRegressor {
    pub fn new(estimators: Vec<Box<dyn Regressor>>) -> Result<Self> {
        if estimators.is_empty() {
            return Err(EstimatorError::InvalidParameter {
                name: "estimators".to_string(),
                reason: "at least one member is required".to_string(),
            });
        }
        Ok(Self {
            estimators,
            fitted: false,
        })
    }

    pub fn estimators(&self) -> &[Box<dyn Regressor>] {
        &self.estimators
    }
}

impl Regressor for VotingRegressor {
    fn name(&self) -> &str {
        "voting"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        for estimator in &mut self.estimators {
            estimator.fit(x, y)?;
        }
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(EstimatorError::NotFitted);
        }
        let mut total = vec![0.0; x.rows()];
        for estimator in &self.estimators {
            for (acc, v) in total.iter_mut().zip(estimator.predict(x)?) {
                *acc += v;
            }
        }
        let count = self.estimators.len() as f64;
        Ok(total.into_iter().map(|v| v / count).collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
