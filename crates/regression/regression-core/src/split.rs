//! Sample-count dependent train/test partitioning.

use estimator_spi::Matrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regression_spi::{Result, ValidationError};
use tracing::debug;

/// Rows below which no data is held out.
pub const MIN_HOLDOUT_ROWS: usize = 10;

/// A train/test partition of one dataset.
///
/// When `held_out` is false the two halves are both the full dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Matrix,
    pub x_test: Matrix,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
    pub held_out: bool,
}

impl TrainTestSplit {
    /// Train rows plus test rows; counts the dataset twice when nothing is held out.
    pub fn data_size(&self) -> usize {
        self.y_train.len() + self.y_test.len()
    }
}

/// Random partition whose train share shrinks as the dataset grows.
///
/// | rows | train share |
/// |---|---|
/// | < 10 | everything, test = train |
/// | 10..=100 | `1 - min(5 / n, 0.2)` |
/// | 101..=500 | 0.90 |
/// | 501..=1000 | 0.85 |
/// | > 1000 | 0.80 |
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveSplitter {
    seed: Option<u64>,
}

impl AdaptiveSplitter {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Train share for `n` rows, `None` when nothing is held out.
    pub fn train_fraction(n: usize) -> Option<f64> {
        match n {
            0..=9 => None,
            10..=100 => Some(1.0 - (5.0 / n as f64).min(0.2)),
            101..=500 => Some(0.9),
            501..=1000 => Some(0.85),
            _ => Some(0.8),
        }
    }

    /// `(train, test)` row counts for `n` rows.
    pub fn partition_sizes(n: usize) -> (usize, usize) {
        match Self::train_fraction(n) {
            None => (n, n),
            Some(fraction) => {
                // tolerance absorbs products like 0.8333.. * 30 landing below 25
                let train = ((fraction * n as f64) + 1e-9).floor() as usize;
                let train = train.clamp(1, n - 1);
                (train, n - train)
            }
        }
    }

    pub fn split(&self, x: &Matrix, y: &[f64]) -> Result<TrainTestSplit> {
        let n = y.len();
        if x.rows() != n {
            return Err(ValidationError::LengthMismatch {
                x_rows: x.rows(),
                y_len: n,
            }
            .into());
        }

        if Self::train_fraction(n).is_none() {
            debug!(rows = n, "no held-out rows; test set is the training set");
            return Ok(TrainTestSplit {
                x_train: x.clone(),
                x_test: x.clone(),
                y_train: y.to_vec(),
                y_test: y.to_vec(),
                held_out: false,
            });
        }

        let (n_train, n_test) = Self::partition_sizes(n);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);
        let (test_rows, train_rows) = order.split_at(n_test);
        debug!(rows = n, train = n_train, test = n_test, "split dataset");

        Ok(TrainTestSplit {
            x_train: x.select_rows(train_rows),
            x_test: x.select_rows(test_rows),
            y_train: train_rows.iter().map(|&i| y[i]).collect(),
            y_test: test_rows.iter().map(|&i| y[i]).collect(),
            held_out: true,
        })
    }
}
