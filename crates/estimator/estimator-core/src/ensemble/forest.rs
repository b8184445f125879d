use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::tree::{DecisionTreeRegressor, TreeParams};

/// Bagged CART trees, each grown on a bootstrap sample.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    params: TreeParams,
    bootstrap: bool,
    seed: u64,
    trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, params: TreeParams, seed: u64) -> Result<Self> {
        if n_estimators == 0 {
            return Err(EstimatorError::InvalidParameter {
                name: "n_estimators".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        // validates the tree parameters up front
        DecisionTreeRegressor::new(params)?;
        Ok(Self {
            n_estimators,
            params,
            bootstrap: true,
            seed,
            trees: Vec::new(),
        })
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }
}

impl Regressor for RandomForestRegressor {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let n = y.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let tree_seed: u64 = rng.gen();
            let rows: Vec<usize> = if self.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let mut tree = DecisionTreeRegressor::new(self.params.with_seed(tree_seed))?;
            tree.fit_rows(x, y, &rows)?;
            trees.push(tree);
        }
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(EstimatorError::NotFitted);
        }
        let mut total = vec![0.0; x.rows()];
        for tree in &self.trees {
            for (acc, v) in total.iter_mut().zip(tree.predict(x)?) {
                *acc += v;
            }
        }
        let count = self.trees.len() as f64;
        Ok(total.into_iter().map(|v| v / count).collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
