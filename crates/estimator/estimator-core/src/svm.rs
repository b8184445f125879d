//! Kernel support vector regression.
//!
//! Solved in the dual by coordinate descent over `beta_i = alpha_i - alpha_i*`
//! in `[-C, C]`. The intercept is absorbed by adding one to every kernel value,
//! which removes the equality constraint of the standard formulation.

use serde::{Deserialize, Serialize};

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::linalg;

const MAX_SWEEPS: usize = 500;
const TOLERANCE: f64 = 1e-3;
const FULL_KERNEL_LIMIT: usize = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    #[default]
    Rbf,
    Linear,
}

/// RBF width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gamma {
    /// `1 / (n_features * var(X))`
    #[default]
    Scale,
    /// `1 / n_features`
    Auto,
    Value(f64),
}

impl Gamma {
    pub fn resolve(&self, x: &Matrix) -> f64 {
        let p = x.cols().max(1) as f64;
        match self {
            Gamma::Scale => {
                let var = linalg::variance(x.as_slice());
                if var > 0.0 {
                    1.0 / (p * var)
                } else {
                    1.0
                }
            }
            Gamma::Auto => 1.0 / p,
            Gamma::Value(g) => *g,
        }
    }
}

#[derive(Debug, Clone)]
struct SupportVectors {
    rows: Matrix,
    beta: Vec<f64>,
    gamma: f64,
}

fn kernel_value(kernel: Kernel, gamma: f64, a: &[f64], b: &[f64]) -> f64 {
    let k = match kernel {
        Kernel::Linear => linalg::dot(a, b),
        Kernel::Rbf => {
            let sq: f64 = a.iter().zip(b).map(|(u, v)| (u - v).powi(2)).sum();
            (-gamma * sq).exp()
        }
    };
    k + 1.0
}

/// Epsilon-insensitive support vector regression.
#[derive(Debug, Clone)]
pub struct Svr {
    c: f64,
    epsilon: f64,
    kernel: Kernel,
    gamma: Gamma,
    model: Option<SupportVectors>,
}

impl Svr {
    pub fn new(c: f64, kernel: Kernel, gamma: Gamma) -> Result<Self> {
        if !(c > 0.0) {
            return Err(EstimatorError::InvalidParameter {
                name: "C".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(Self {
            c,
            epsilon: 0.1,
            kernel,
            gamma,
            model: None,
        })
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.max(0.0);
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn n_support(&self) -> usize {
        self.model
            .as_ref()
            .map_or(0, |m| m.beta.iter().filter(|b| b.abs() > 0.0).count())
    }

    fn solve(&self, x: &Matrix, y: &[f64]) -> SupportVectors {
        let n = y.len();
        let gamma = self.gamma.resolve(x);
        let full: Option<Vec<f64>> = (n * n <= FULL_KERNEL_LIMIT).then(|| {
            let mut k = vec![0.0; n * n];
            for i in 0..n {
                for j in i..n {
                    let v = kernel_value(self.kernel, gamma, x.row(i), x.row(j));
                    k[i * n + j] = v;
                    k[j * n + i] = v;
                }
            }
            k
        });
        let column = |i: usize| -> Vec<f64> {
            match &full {
                Some(k) => k[i * n..(i + 1) * n].to_vec(),
                None => (0..n)
                    .map(|j| kernel_value(self.kernel, gamma, x.row(i), x.row(j)))
                    .collect(),
            }
        };

        let mut beta = vec![0.0; n];
        // q_beta[j] = sum_i Q[j][i] * beta[i]
        let mut q_beta = vec![0.0; n];
        for _ in 0..MAX_SWEEPS {
            let mut max_step: f64 = 0.0;
            for i in 0..n {
                let q_col = column(i);
                let q_ii = q_col[i];
                if q_ii <= 0.0 {
                    continue;
                }
                let gradient = q_beta[i] - y[i];
                let u = q_ii * beta[i] - gradient;
                let shrunk = u.signum() * (u.abs() - self.epsilon).max(0.0) / q_ii;
                let updated = shrunk.clamp(-self.c, self.c);
                let delta = updated - beta[i];
                if delta != 0.0 {
                    beta[i] = updated;
                    for (qb, q) in q_beta.iter_mut().zip(&q_col) {
                        *qb += q * delta;
                    }
                    max_step = max_step.max(delta.abs() * q_ii);
                }
            }
            if max_step < TOLERANCE {
                break;
            }
        }

        let keep: Vec<usize> = (0..n).filter(|&i| beta[i] != 0.0).collect();
        SupportVectors {
            rows: x.select_rows(&keep),
            beta: keep.iter().map(|&i| beta[i]).collect(),
            gamma,
        }
    }
}

impl Regressor for Svr {
    fn name(&self) -> &str {
        "svr"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        self.model = Some(self.solve(x, y));
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        let model = self.model.as_ref().ok_or(EstimatorError::NotFitted)?;
        if model.beta.is_empty() {
            return Ok(vec![0.0; x.rows()]);
        }
        x.ensure_cols(model.rows.cols())?;
        Ok(x
            .iter_rows()
            .map(|row| {
                model
                    .rows
                    .iter_rows()
                    .zip(&model.beta)
                    .map(|(sv, b)| b * kernel_value(self.kernel, model.gamma, sv, row))
                    .sum()
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

/// Nu-parameterised SVR.
///
/// The tube width is re-estimated from the fit: `epsilon` becomes the
/// `1 - nu` quantile of absolute residuals so that roughly a `nu` fraction of
/// the rows sit on or outside the tube.
#[derive(Debug, Clone)]
pub struct NuSvr {
    nu: f64,
    inner: Svr,
}

impl NuSvr {
    const ROUNDS: usize = 4;

    pub fn new(nu: f64, c: f64, kernel: Kernel, gamma: Gamma) -> Result<Self> {
        if !(nu > 0.0 && nu <= 1.0) {
            return Err(EstimatorError::InvalidParameter {
                name: "nu".to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        Ok(Self {
            nu,
            inner: Svr::new(c, kernel, gamma)?.with_epsilon(0.0),
        })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn epsilon(&self) -> f64 {
        self.inner.epsilon()
    }
}

impl Regressor for NuSvr {
    fn name(&self) -> &str {
        "nu_svr"
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let mut svr = self.inner.clone().with_epsilon(0.0);
        svr.fit(x, y)?;
        for _ in 0..Self::ROUNDS {
            let residuals: Vec<f64> = svr
                .predict(x)?
                .iter()
                .zip(y)
                .map(|(p, t)| (t - p).abs())
                .collect();
            let epsilon = linalg::quantile(&residuals, 1.0 - self.nu);
            if (epsilon - svr.epsilon()).abs() < 1e-9 {
                break;
            }
            svr = svr.with_epsilon(epsilon);
            svr.fit(x, y)?;
        }
        self.inner = svr;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        self.inner.predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner.is_fitted()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{r_squared, rmse};

    fn wave() -> (Matrix, Vec<f64>) {
        let xs: Vec<f64> = (0..40).map(|i| i as f64 / 8.0).collect();
        let y = xs.iter().map(|v| v.sin()).collect();
        (Matrix::column_vector(&xs), y)
    }

    #[test]
    fn test_rbf_svr_fits_sine() {
        let (x, y) = wave();
        let mut svr = Svr::new(10.0, Kernel::Rbf, Gamma::Value(1.0)).unwrap();
        svr.fit(&x, &y).unwrap();
        let predicted = svr.predict(&x).unwrap();
        assert!(r_squared(&y, &predicted) > 0.8);
    }

    #[test]
    fn test_linear_svr_tracks_line_within_tube() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 / 10.0).collect();
        let y: Vec<f64> = xs.iter().map(|v| 2.0 * v + 1.0).collect();
        let x = Matrix::column_vector(&xs);
        let mut svr = Svr::new(10.0, Kernel::Linear, Gamma::Scale).unwrap();
        svr.fit(&x, &y).unwrap();
        assert!(rmse(&y, &svr.predict(&x).unwrap()) < 0.3);
    }

    #[test]
    fn test_wide_tube_has_no_support_vectors() {
        let x = Matrix::column_vector(&[0.0, 1.0, 2.0]);
        let y = vec![0.01, -0.01, 0.0];
        let mut svr = Svr::new(1.0, Kernel::Rbf, Gamma::Auto).unwrap().with_epsilon(1.0);
        svr.fit(&x, &y).unwrap();
        assert_eq!(svr.n_support(), 0);
        assert_eq!(svr.predict(&x).unwrap(), vec![0.0; 3]);
    }

    #[test]
    fn test_gamma_resolution() {
        let x = Matrix::from_rows(&[vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
        assert!((Gamma::Auto.resolve(&x) - 0.5).abs() < 1e-12);
        // all values {0, 2, 2, 0}: variance 1
        assert!((Gamma::Scale.resolve(&x) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nu_svr_sets_epsilon_from_residuals() {
        let (x, y) = wave();
        let mut model = NuSvr::new(0.5, 10.0, Kernel::Rbf, Gamma::Value(1.0)).unwrap();
        model.fit(&x, &y).unwrap();
        assert!(model.epsilon() >= 0.0);
        assert!(r_squared(&y, &model.predict(&x).unwrap()) > 0.7);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Svr::new(0.0, Kernel::Rbf, Gamma::Scale).is_err());
        assert!(NuSvr::new(1.5, 1.0, Kernel::Rbf, Gamma::Scale).is_err());
    }
}
