//! Elastic net (L1 + L2) regression by cyclic coordinate descent.
//!
//! Minimises `1/(2n)·‖y − Xw‖² + α·ρ·‖w‖₁ + ½·α·(1 − ρ)·‖w‖²` where `ρ` is the
//! L1 ratio. A ratio of 1 is the lasso.

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use super::LinearFit;
use crate::linalg;
use crate::search::{GridSearchCv, Scoring};

const TOLERANCE: f64 = 1e-4;

/// Elastic net with fixed penalty.
#[derive(Debug, Clone)]
pub struct ElasticNet {
    alpha: f64,
    l1_ratio: f64,
    max_iter: usize,
    fit: Option<LinearFit>,
}

impl ElasticNet {
    pub fn new(alpha: f64, l1_ratio: f64) -> Result<Self> {
        if !(alpha >= 0.0) {
            return Err(EstimatorError::InvalidParameter {
                name: "alpha".to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&l1_ratio) {
            return Err(EstimatorError::InvalidParameter {
                name: "l1_ratio".to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }
        Ok(Self {
            alpha,
            l1_ratio,
            max_iter: 1000,
            fit: None,
        })
    }

    /// Lasso is the elastic net with an L1 ratio of one.
    pub fn lasso(alpha: f64) -> Result<Self> {
        Self::new(alpha, 1.0)
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn l1_ratio(&self) -> f64 {
        self.l1_ratio
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coef.as_slice())
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Column-centered copy of `x` together with the centered targets.
fn center(x: &Matrix, y: &[f64]) -> Result<(Matrix, Vec<f64>, Vec<f64>, f64)> {
    let x_mean = linalg::column_means(x);
    let y_mean = linalg::mean(y);
    let data: Vec<f64> = x
        .iter_rows()
        .flat_map(|row| row.iter().zip(&x_mean).map(|(v, m)| v - m).collect::<Vec<_>>())
        .collect();
    let xc = Matrix::new(x.rows(), x.cols(), data)?;
    let yc = y.iter().map(|v| v - y_mean).collect();
    Ok((xc, yc, x_mean, y_mean))
}

impl Regressor for ElasticNet {
    fn name(&self) -> &str {
        if self.l1_ratio >= 1.0 {
            "lasso"
        } else {
            "elastic"
        }
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let (xc, yc, x_mean, y_mean) = center(x, y)?;
        let n = xc.rows() as f64;
        let p = xc.cols();
        let l1 = self.alpha * self.l1_ratio;
        let l2 = self.alpha * (1.0 - self.l1_ratio);

        let columns: Vec<Vec<f64>> = (0..p).map(|j| xc.column(j)).collect();
        let col_sq: Vec<f64> = columns
            .iter()
            .map(|c| c.iter().map(|v| v * v).sum::<f64>() / n)
            .collect();

        let mut coef = vec![0.0; p];
        let mut residual = yc;

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0_f64;
            let mut max_coef = 0.0_f64;
            for j in 0..p {
                if col_sq[j] <= 0.0 {
                    continue;
                }
                let rho = linalg::dot(&columns[j], &residual) / n + col_sq[j] * coef[j];
                let updated = soft_threshold(rho, l1) / (col_sq[j] + l2);
                let delta = updated - coef[j];
                if delta != 0.0 {
                    for (r, v) in residual.iter_mut().zip(&columns[j]) {
                        *r -= v * delta;
                    }
                    coef[j] = updated;
                }
                max_delta = max_delta.max(delta.abs());
                max_coef = max_coef.max(updated.abs());
            }
            if max_delta <= TOLERANCE * max_coef.max(f64::EPSILON) {
                break;
            }
        }

        if coef.iter().any(|c| !c.is_finite()) {
            return Err(EstimatorError::NumericalError(
                "Coordinate descent diverged".to_string(),
            ));
        }

        let intercept = y_mean - linalg::dot(&coef, &x_mean);
        self.fit = Some(LinearFit { coef, intercept });
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

/// Penalty grid searched by [`ElasticNetCv`].
#[derive(Debug, Clone, PartialEq)]
pub enum AlphaGrid {
    /// Explicit candidate values.
    Fixed(Vec<f64>),
    /// `n_alphas` log-spaced values from the smallest alpha that zeroes every
    /// coefficient down to `eps` times that value, derived from the data.
    Auto { n_alphas: usize, eps: f64 },
}

impl Default for AlphaGrid {
    fn default() -> Self {
        AlphaGrid::Auto {
            n_alphas: 100,
            eps: 1e-3,
        }
    }
}

/// `count` values spaced evenly on a log scale between `10^start` and `10^stop`.
pub fn logspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    linspace(start, stop, count)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

/// `count` values spaced evenly between `start` and `stop` inclusive.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Elastic net tuned over an alpha × L1-ratio grid by k-fold mean squared error.
#[derive(Debug, Clone)]
pub struct ElasticNetCv {
    alphas: AlphaGrid,
    l1_ratios: Vec<f64>,
    folds: usize,
    max_iter: usize,
    search: Option<GridSearchCv>,
    best: Option<(f64, f64)>,
}

impl ElasticNetCv {
    pub fn new(alphas: AlphaGrid, l1_ratios: Vec<f64>) -> Result<Self> {
        if l1_ratios.is_empty() || l1_ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(EstimatorError::InvalidParameter {
                name: "l1_ratio".to_string(),
                reason: "must be a non-empty list of values in [0, 1]".to_string(),
            });
        }
        Ok(Self {
            alphas,
            l1_ratios,
            folds: 5,
            max_iter: 1000,
            search: None,
            best: None,
        })
    }

    /// LassoCV: the L1 ratio is fixed to one.
    pub fn lasso(alphas: AlphaGrid) -> Result<Self> {
        Self::new(alphas, vec![1.0])
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds.max(2);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// `(alpha, l1_ratio)` chosen by the last fit.
    pub fn best_params(&self) -> Option<(f64, f64)> {
        self.best
    }

    fn alpha_values(&self, x: &Matrix, y: &[f64], l1_ratio: f64) -> Result<Vec<f64>> {
        match &self.alphas {
            AlphaGrid::Fixed(values) => Ok(values.clone()),
            AlphaGrid::Auto { n_alphas, eps } => {
                let (xc, yc, _, _) = center(x, y)?;
                let n = xc.rows() as f64;
                let alpha_max = (0..xc.cols())
                    .map(|j| linalg::dot(&xc.column(j), &yc).abs())
                    .fold(0.0_f64, f64::max)
                    / (n * l1_ratio.max(1e-3));
                if alpha_max <= 0.0 {
                    return Ok(vec![f64::EPSILON]);
                }
                let hi = alpha_max.log10();
                let lo = (alpha_max * eps).log10();
                Ok(logspace(hi, lo, (*n_alphas).max(1)))
            }
        }
    }
}

impl Regressor for ElasticNetCv {
    fn name(&self) -> &str {
        if self.l1_ratios == [1.0] {
            "lasso"
        } else {
            "elastic"
        }
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let mut params = Vec::new();
        let mut candidates: Vec<Box<dyn Regressor>> = Vec::new();
        for &l1_ratio in &self.l1_ratios {
            for alpha in self.alpha_values(x, y, l1_ratio)? {
                let model = ElasticNet::new(alpha, l1_ratio)?.with_max_iter(self.max_iter);
                candidates.push(Box::new(model));
                params.push((alpha, l1_ratio));
            }
        }

        let mut search = GridSearchCv::new(self.name(), candidates, self.folds, Scoring::NegMse)?;
        search.fit(x, y)?;
        self.best = search.best_index().map(|i| params[i]);
        self.search = Some(search);
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        self.search
            .as_ref()
            .ok_or(EstimatorError::NotFitted)?
            .predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.search.is_some()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
