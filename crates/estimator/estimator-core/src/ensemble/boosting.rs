use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::linalg;
use crate::tree::{DecisionTreeRegressor, TreeParams};

/// Least-squares gradient boosting over shallow trees.
///
/// Starts from the target mean and adds `learning_rate` times a tree fitted to
/// the current residuals at each stage.
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    seed: u64,
    init: Option<f64>,
    stages: Vec<DecisionTreeRegressor>,
}

impl GradientBoostingRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize, seed: u64) -> Result<Self> {
        if n_estimators == 0 || max_depth == 0 {
            return Err(EstimatorError::InvalidParameter {
                name: "n_estimators/max_depth".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if !(learning_rate > 0.0) {
            return Err(EstimatorError::InvalidParameter {
                name: "learning_rate".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self {
            n_estimators,
            learning_rate,
            max_depth,
            seed,
            init: None,
            stages: Vec::new(),
        })
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Regressor for GradientBoostingRegressor {
    fn name(&self) -> &str {
        "gradient_boosting"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let init = linalg::mean(y);
        let mut current = vec![init; y.len()];
        let mut rng = StdRng::seed_from_u64(self.seed);
        let params = TreeParams::default().with_max_depth(Some(self.max_depth));

        let mut stages = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let residual: Vec<f64> = y.iter().zip(&current).map(|(t, p)| t - p).collect();
            if residual.iter().all(|r| r.abs() < 1e-12) {
                break;
            }
            let mut tree = DecisionTreeRegressor::new(params.with_seed(rng.gen()))?;
            tree.fit(x, &residual)?;
            for (c, step) in current.iter_mut().zip(tree.predict(x)?) {
                *c += self.learning_rate * step;
            }
            stages.push(tree);
        }
        self.init = Some(init);
        self.stages = stages;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        let init = self.init.ok_or(EstimatorError::NotFitted)?;
        let mut out = vec![init; x.rows()];
        for tree in &self.stages {
            for (o, step) in out.iter_mut().zip(tree.predict(x)?) {
                *o += self.learning_rate * step;
            }
        }
        Ok(out)
    }

    fn is_fitted(&self) -> bool {
        self.init.is_some()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
