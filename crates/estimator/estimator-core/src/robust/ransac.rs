use rand::rngs::StdRng;
use rand::SeedableRng;

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::linalg;
use crate::linear::{least_squares, LinearFit};
use crate::metrics::r_squared;

/// Random sample consensus over least-squares fits.
///
/// Each trial fits a minimal random subset (`n_features + 1` rows); rows whose
/// absolute residual is within the median absolute deviation of `y` are
/// inliers. The trial with most inliers (then best inlier R²) wins and the
/// final model is refit on its inliers.
#[derive(Debug, Clone)]
pub struct RansacRegressor {
    max_trials: usize,
    seed: u64,
    fit: Option<LinearFit>,
    inliers: Vec<bool>,
}

impl RansacRegressor {
    pub fn new(max_trials: usize, seed: u64) -> Self {
        Self {
            max_trials: max_trials.max(1),
            seed,
            fit: None,
            inliers: Vec::new(),
        }
    }

    /// Inlier mask of the last fit.
    pub fn inlier_mask(&self) -> &[bool] {
        &self.inliers
    }
}

impl Regressor for RansacRegressor {
    fn name(&self) -> &str {
        "ransac"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        let min_samples = x.cols() + 1;
        x.ensure_fit_input(y, min_samples)?;
        let n = y.len();
        let threshold = linalg::median_absolute_deviation(y);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<(usize, f64, Vec<usize>)> = None;
        for _ in 0..self.max_trials {
            let subset = rand::seq::index::sample(&mut rng, n, min_samples).into_vec();
            let sub_y: Vec<f64> = subset.iter().map(|&i| y[i]).collect();
            let Ok(candidate) = least_squares(&x.select_rows(&subset), &sub_y, 0.0) else {
                continue;
            };
            let inliers: Vec<usize> = (0..n)
                .filter(|&i| (y[i] - candidate.predict_row(x.row(i))).abs() <= threshold)
                .collect();
            if inliers.is_empty() {
                continue;
            }
            let in_y: Vec<f64> = inliers.iter().map(|&i| y[i]).collect();
            let in_pred: Vec<f64> = inliers
                .iter()
                .map(|&i| candidate.predict_row(x.row(i)))
                .collect();
            let score = r_squared(&in_y, &in_pred);
            let better = match &best {
                None => true,
                Some((count, best_score, _)) => {
                    inliers.len() > *count || (inliers.len() == *count && score > *best_score)
                }
            };
            if better {
                best = Some((inliers.len(), score, inliers));
            }
        }

        let (_, _, inliers) = best.ok_or_else(|| {
            EstimatorError::NumericalError("RANSAC could not find a valid consensus set".to_string())
        })?;
        let in_y: Vec<f64> = inliers.iter().map(|&i| y[i]).collect();
        self.fit = Some(least_squares(&x.select_rows(&inliers), &in_y, 0.0)?);
        let mut mask = vec![false; n];
        for i in inliers {
            mask[i] = true;
        }
        self.inliers = mask;
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
