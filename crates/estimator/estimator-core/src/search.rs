//! Hyperparameter search by k-fold cross-validation.

use rand::rngs::StdRng;
use rand::SeedableRng;

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

use crate::metrics::{mse, r_squared};

/// Fold score used to rank candidates (higher is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoring {
    /// Coefficient of determination
    #[default]
    R2,
    /// Negated mean squared error
    NegMse,
}

impl Scoring {
    pub fn score(&self, actual: &[f64], predicted: &[f64]) -> f64 {
        match self {
            Scoring::R2 => r_squared(actual, predicted),
            Scoring::NegMse => -mse(actual, predicted),
        }
    }
}

/// Contiguous, unshuffled k-fold partition of `0..n`.
///
/// The first `n % k` folds hold one extra row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    folds: usize,
}

impl KFold {
    pub fn new(folds: usize) -> Self {
        Self { folds }
    }

    /// Number of folds actually used for `n` rows (capped at `n`).
    pub fn effective_folds(&self, n: usize) -> usize {
        self.folds.min(n)
    }

    /// `(train, test)` index pairs. Empty when fewer than two folds fit.
    pub fn split(&self, n: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let k = self.effective_folds(n);
        if k < 2 {
            return Vec::new();
        }
        let base = n / k;
        let extra = n % k;
        let mut start = 0;
        (0..k)
            .map(|fold| {
                let size = base + usize::from(fold < extra);
                let test: Vec<usize> = (start..start + size).collect();
                let train: Vec<usize> = (0..start).chain(start + size..n).collect();
                start += size;
                (train, test)
            })
            .collect()
    }
}

/// Mean fold score of a fresh copy of `candidate`, or `None` if any fold fails.
fn cross_validate(
    candidate: &dyn Regressor,
    x: &Matrix,
    y: &[f64],
    splits: &[(Vec<usize>, Vec<usize>)],
    scoring: Scoring,
) -> Option<f64> {
    let mut total = 0.0;
    for (train, test) in splits {
        let mut model = candidate.clone_box();
        let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();
        let y_test: Vec<f64> = test.iter().map(|&i| y[i]).collect();
        model.fit(&x.select_rows(train), &y_train).ok()?;
        let predicted = model.predict(&x.select_rows(test)).ok()?;
        let score = scoring.score(&y_test, &predicted);
        if !score.is_finite() {
            return None;
        }
        total += score;
    }
    Some(total / splits.len() as f64)
}

/// Exhaustive search over a list of configured candidates.
///
/// Each candidate is scored by k-fold cross-validation; candidates whose fold
/// fit or predict fails are skipped. The best one is refit on all rows.
#[derive(Clone)]
pub struct GridSearchCv {
    name: String,
    candidates: Vec<Box<dyn Regressor>>,
    folds: usize,
    scoring: Scoring,
    best_index: Option<usize>,
    best_score: Option<f64>,
    best: Option<Box<dyn Regressor>>,
}

impl std::fmt::Debug for GridSearchCv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSearchCv")
            .field("name", &self.name)
            .field("candidates", &self.candidates.len())
            .field("folds", &self.folds)
            .field("scoring", &self.scoring)
            .field("best_index", &self.best_index)
            .field("best_score", &self.best_score)
            .finish()
    }
}

impl GridSearchCv {
    pub fn new(
        name: impl Into<String>,
        candidates: Vec<Box<dyn Regressor>>,
        folds: usize,
        scoring: Scoring,
    ) -> Result<Self> {
        if candidates.is_empty() {
            return Err(EstimatorError::InvalidParameter {
                name: "candidates".to_string(),
                reason: "grid is empty".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            candidates,
            folds: folds.max(2),
            scoring,
            best_index: None,
            best_score: None,
            best: None,
        })
    }

    pub fn n_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Position in the grid of the candidate chosen by the last fit.
    pub fn best_index(&self) -> Option<usize> {
        self.best_index
    }

    /// Mean cross-validated score of the chosen candidate. `None` when the
    /// data was too small to cross-validate.
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Fit the first candidate that accepts all rows.
    fn fit_first_viable(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        let mut last_error = None;
        for (i, candidate) in self.candidates.iter().enumerate() {
            let mut model = candidate.clone_box();
            match model.fit(x, y) {
                Ok(()) => {
                    self.best_index = Some(i);
                    self.best_score = None;
                    self.best = Some(model);
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(EstimatorError::NoViableCandidate(format!(
            "{}: {}",
            self.name,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

impl Regressor for GridSearchCv {
    fn name(&self) -> &str {
        &self.name
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let splits = KFold::new(self.folds).split(y.len());
        if splits.is_empty() {
            return self.fit_first_viable(x, y);
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in self.candidates.iter().enumerate() {
            if let Some(score) = cross_validate(candidate.as_ref(), x, y, &splits, self.scoring) {
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((i, score));
                }
            }
        }

        let Some((index, score)) = best else {
            // nothing survived every fold; fall back to a plain fit
            return self.fit_first_viable(x, y);
        };

        let mut model = self.candidates[index].clone_box();
        model.fit(x, y)?;
        self.best_index = Some(index);
        self.best_score = Some(score);
        self.best = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        self.best
            .as_ref()
            .ok_or(EstimatorError::NotFitted)?
            .predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.best.is_some()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}

/// Grid search over `n_iter` candidates drawn without replacement from the
/// full grid with a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomizedSearchCv {
    search: GridSearchCv,
    sampled: Vec<usize>,
}

impl RandomizedSearchCv {
    pub fn new(
        name: impl Into<String>,
        grid: Vec<Box<dyn Regressor>>,
        n_iter: usize,
        folds: usize,
        scoring: Scoring,
        seed: u64,
    ) -> Result<Self> {
        let total = grid.len();
        let take = n_iter.clamp(1, total.max(1));
        let mut rng = StdRng::seed_from_u64(seed);
        let sampled = rand::seq::index::sample(&mut rng, total, take.min(total)).into_vec();
        let candidates = sampled.iter().map(|&i| grid[i].clone_box()).collect();
        Ok(Self {
            search: GridSearchCv::new(name, candidates, folds, scoring)?,
            sampled,
        })
    }

    /// Grid positions of the sampled candidates, in evaluation order.
    pub fn sampled_indices(&self) -> &[usize] {
        &self.sampled
    }

    /// Grid position of the candidate chosen by the last fit.
    pub fn best_grid_index(&self) -> Option<usize> {
        self.search.best_index().map(|i| self.sampled[i])
    }
}

impl Regressor for RandomizedSearchCv {
    fn name(&self) -> &str {
        self.search.name()
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        self.search.fit(x, y)
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        self.search.predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.search.is_fitted()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
