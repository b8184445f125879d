//! k-nearest-neighbours regression with Minkowski distance.

use serde::{Deserialize, Serialize};

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

/// How neighbour targets are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborWeights {
    #[default]
    Uniform,
    /// Inverse distance; an exact match takes the mean of the exact matches
    Distance,
}

#[derive(Debug, Clone)]
pub struct KNeighborsRegressor {
    k: usize,
    weights: NeighborWeights,
    p: u32,
    train_x: Option<Matrix>,
    train_y: Vec<f64>,
}

impl KNeighborsRegressor {
    pub fn new(k: usize, weights: NeighborWeights, p: u32) -> Result<Self> {
        if k == 0 {
            return Err(EstimatorError::InvalidParameter {
                name: "k".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if p == 0 {
            return Err(EstimatorError::InvalidParameter {
                name: "p".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(Self {
            k,
            weights,
            p,
            train_x: None,
            train_y: Vec::new(),
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.p {
            1 => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            2 => a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt(),
            p => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs().powi(p as i32))
                .sum::<f64>()
                .powf(1.0 / p as f64),
        }
    }

    fn predict_row(&self, train: &Matrix, row: &[f64]) -> f64 {
        let mut distances: Vec<(f64, usize)> = train
            .iter_rows()
            .enumerate()
            .map(|(i, t)| (self.distance(t, row), i))
            .collect();
        // stable sort keeps training order among equal distances
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));
        let nearest = &distances[..self.k];

        match self.weights {
            NeighborWeights::Uniform => {
                nearest.iter().map(|&(_, i)| self.train_y[i]).sum::<f64>() / self.k as f64
            }
            NeighborWeights::Distance => {
                let exact: Vec<f64> = nearest
                    .iter()
                    .filter(|(d, _)| *d == 0.0)
                    .map(|&(_, i)| self.train_y[i])
                    .collect();
                if !exact.is_empty() {
                    return exact.iter().sum::<f64>() / exact.len() as f64;
                }
                let (num, den) = nearest.iter().fold((0.0, 0.0), |(num, den), &(d, i)| {
                    (num + self.train_y[i] / d, den + 1.0 / d)
                });
                num / den
            }
        }
    }
}

impl Regressor for KNeighborsRegressor {
    fn name(&self) -> &str {
        "knn"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, self.k)?;
        self.train_x = Some(x.clone());
        self.train_y = y.to_vec();
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        let train = self.train_x.as_ref().ok_or(EstimatorError::NotFitted)?;
        x.ensure_cols(train.cols())?;
        Ok(x.iter_rows().map(|row| self.predict_row(train, row)).collect())
    }

    fn is_fitted(&self) -> bool {
        self.train_x.is_some()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
