use rand::rngs::StdRng;
use rand::SeedableRng;

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::linear::{least_squares, LinearFit};

const WEISZFELD_ITERATIONS: usize = 300;
const WEISZFELD_TOLERANCE: f64 = 1e-7;

/// Multivariate Theil-Sen estimator.
///
/// Fits exact least squares on subsets of `n_features + 1` rows and takes the
/// spatial median of the resulting `(intercept, coef...)` vectors. When the
/// number of subsets exceeds `max_subpopulation`, that many are drawn at
/// random with the configured seed.
#[derive(Debug, Clone)]
pub struct TheilSenRegressor {
    max_subpopulation: usize,
    seed: u64,
    fit: Option<LinearFit>,
}

impl TheilSenRegressor {
    pub fn new(max_subpopulation: usize, seed: u64) -> Self {
        Self {
            max_subpopulation: max_subpopulation.max(1),
            seed,
            fit: None,
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coef.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }

    fn subsets(&self, n: usize, size: usize) -> Vec<Vec<usize>> {
        if binomial(n, size) <= self.max_subpopulation as f64 {
            let mut all = Vec::new();
            let mut current: Vec<usize> = (0..size).collect();
            loop {
                all.push(current.clone());
                // advance to the next lexicographic combination
                let mut i = size;
                while i > 0 && current[i - 1] == n - size + i - 1 {
                    i -= 1;
                }
                if i == 0 {
                    return all;
                }
                current[i - 1] += 1;
                for j in i..size {
                    current[j] = current[j - 1] + 1;
                }
            }
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.max_subpopulation)
            .map(|_| rand::seq::index::sample(&mut rng, n, size).into_vec())
            .collect()
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Weiszfeld iteration for the point minimising the summed Euclidean distance.
fn spatial_median(points: &[Vec<f64>]) -> Vec<f64> {
    let dim = points[0].len();
    let mut median: Vec<f64> = (0..dim)
        .map(|d| points.iter().map(|p| p[d]).sum::<f64>() / points.len() as f64)
        .collect();

    for _ in 0..WEISZFELD_ITERATIONS {
        let mut numerator = vec![0.0; dim];
        let mut denominator = 0.0;
        for p in points {
            let distance = p
                .iter()
                .zip(&median)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            if distance < 1e-12 {
                continue;
            }
            for (acc, v) in numerator.iter_mut().zip(p) {
                *acc += v / distance;
            }
            denominator += 1.0 / distance;
        }
        if denominator == 0.0 {
            break;
        }
        let next: Vec<f64> = numerator.iter().map(|v| v / denominator).collect();
        let shift = next
            .iter()
            .zip(&median)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();
        median = next;
        if shift < WEISZFELD_TOLERANCE {
            break;
        }
    }
    median
}

impl Regressor for TheilSenRegressor {
    fn name(&self) -> &str {
        "theilsen"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        let size = x.cols() + 1;
        x.ensure_fit_input(y, size)?;

        let points: Vec<Vec<f64>> = self
            .subsets(y.len(), size)
            .into_iter()
            .filter_map(|rows| {
                let sub_y: Vec<f64> = rows.iter().map(|&i| y[i]).collect();
                least_squares(&x.select_rows(&rows), &sub_y, 0.0)
                    .ok()
                    .map(|fit| std::iter::once(fit.intercept).chain(fit.coef).collect())
            })
            .filter(|p: &Vec<f64>| p.iter().all(|v| v.is_finite()))
            .collect();
        if points.is_empty() {
            return Err(EstimatorError::NumericalError(
                "Theil-Sen found no solvable subset".to_string(),
            ));
        }

        let median = spatial_median(&points);
        self.fit = Some(LinearFit {
            intercept: median[0],
            coef: median[1..].to_vec(),
        });
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
