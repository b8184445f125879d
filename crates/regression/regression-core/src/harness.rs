//! Fit / predict / score protocol for one or many candidates.

use estimator_core::{build, DEFAULT_SEED};
use estimator_spi::{EstimatorError, Matrix, ModelKind, Regressor};
use rayon::prelude::*;
use regression_spi::{EvaluationRecord, RegressionError, Result};
use tracing::{debug, warn};

use crate::scoring::ScoringEngine;
use crate::split::TrainTestSplit;

/// Drives candidates through fit on train, predict on train and test, and a
/// best-effort prediction of the query rows.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationHarness {
    seed: u64,
    parallel: bool,
}

impl Default for EvaluationHarness {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            parallel: false,
        }
    }
}

impl EvaluationHarness {
    /// `seed` is handed to every randomised model of the roster.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evaluate one configured model.
    ///
    /// Fit and train/test prediction failures are returned as
    /// [`RegressionError::Candidate`]; a failed query prediction only drops
    /// `x0`/`y0` from the record.
    pub fn evaluate(
        &self,
        name: &str,
        mut model: Box<dyn Regressor>,
        split: &TrainTestSplit,
        x0: Option<&Matrix>,
    ) -> Result<EvaluationRecord> {
        let candidate = |e: EstimatorError| RegressionError::candidate(name, e);

        model.fit(&split.x_train, &split.y_train).map_err(candidate)?;
        let train_predicted = model.predict(&split.x_train).map_err(candidate)?;
        let test_predicted = model.predict(&split.x_test).map_err(candidate)?;
        if train_predicted
            .iter()
            .chain(&test_predicted)
            .any(|v| !v.is_finite())
        {
            return Err(candidate(EstimatorError::NumericalError(
                "non-finite prediction".to_string(),
            )));
        }

        let query = x0.and_then(|x0| match model.predict(x0) {
            Ok(y0) if y0.iter().all(|v| v.is_finite()) => Some((x0, y0)),
            Ok(_) => {
                warn!(model = name, "query prediction is not finite; omitting y0");
                None
            }
            Err(e) => {
                warn!(model = name, error = %e, "query prediction failed; omitting y0");
                None
            }
        });

        let record = ScoringEngine::score(name, split, &train_predicted, &test_predicted, query);
        debug!(
            model = name,
            r2_test = record.r2_test,
            rmse_test = record.rmse_test,
            "evaluated candidate"
        );
        Ok(record)
    }

    /// Build `kind` from the registry and evaluate it under `name`.
    pub fn evaluate_kind(
        &self,
        name: &str,
        kind: ModelKind,
        split: &TrainTestSplit,
        x0: Option<&Matrix>,
    ) -> Result<EvaluationRecord> {
        let model = build(kind, self.seed).map_err(|e| RegressionError::candidate(name, e))?;
        self.evaluate(name, model, split, x0)
    }

    /// Evaluate every model of `roster`, skipping the ones that fail.
    ///
    /// Records keep roster order whether or not evaluation runs in parallel.
    pub fn evaluate_roster(
        &self,
        roster: &[ModelKind],
        split: &TrainTestSplit,
        x0: Option<&Matrix>,
    ) -> Vec<EvaluationRecord> {
        let run = |kind: &ModelKind| {
            self.evaluate_kind(kind.as_str(), *kind, split, x0)
                .map_err(|e| {
                    warn!(model = kind.as_str(), error = %e, "candidate skipped");
                    e
                })
                .ok()
        };

        let results: Vec<Option<EvaluationRecord>> = if self.parallel {
            roster.par_iter().map(run).collect()
        } else {
            roster.iter().map(run).collect()
        };
        results.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimator_core::prelude::{KNeighborsRegressor, LinearRegression, NeighborWeights};
    use estimator_spi::Result as EstimatorResult;

    /// Fits fine but refuses to predict more than `limit` rows.
    #[derive(Clone)]
    struct Picky {
        limit: usize,
        inner: LinearRegression,
    }

    impl Regressor for Picky {
        fn name(&self) -> &str {
            "picky"
        }

        fn fit(&mut self, x: &Matrix, y: &[f64]) -> EstimatorResult<()> {
            self.inner.fit(x, y)
        }

        fn predict(&self, x: &Matrix) -> EstimatorResult<Vec<f64>> {
            if x.rows() > self.limit {
                return Err(EstimatorError::NumericalError("too many rows".to_string()));
            }
            self.inner.predict(x)
        }

        fn is_fitted(&self) -> bool {
            self.inner.is_fitted()
        }

        fn clone_box(&self) -> Box<dyn Regressor> {
            Box::new(self.clone())
        }
    }

    fn split() -> TrainTestSplit {
        let x = Matrix::column_vector(&[1.0, 2.0, 3.0, 4.0]);
        let y = vec![3.0, 5.0, 7.0, 9.0];
        TrainTestSplit {
            x_train: x.clone(),
            x_test: x,
            y_train: y.clone(),
            y_test: y,
            held_out: false,
        }
    }

    #[test]
    fn test_evaluate_with_query() {
        let harness = EvaluationHarness::default();
        let query = Matrix::column_vector(&[5.0]);
        let record = harness
            .evaluate("linear", Box::new(LinearRegression::new()), &split(), Some(&query))
            .unwrap();
        assert_eq!(record.y0, Some(vec![11.0]));
        assert_eq!(record.r2_test, 1.0);
        assert_eq!(record.rmse_train, record.rmse_test);
    }

    #[test]
    fn test_query_failure_degrades_to_none() {
        let harness = EvaluationHarness::default();
        let model = Picky {
            limit: 4,
            inner: LinearRegression::new(),
        };
        let query = Matrix::column_vector(&[5.0, 6.0, 7.0, 8.0, 9.0]);
        let record = harness
            .evaluate("picky", Box::new(model), &split(), Some(&query))
            .unwrap();
        assert!(record.y0.is_none());
        assert!(record.x0.is_none());
    }

    #[test]
    fn test_fit_failure_is_candidate_error() {
        let harness = EvaluationHarness::default();
        let model = KNeighborsRegressor::new(7, NeighborWeights::Uniform, 2).unwrap();
        let err = harness
            .evaluate("knn", Box::new(model), &split(), None)
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_roster_skips_failures_and_keeps_order() {
        let harness = EvaluationHarness::default();
        let tiny = TrainTestSplit {
            x_train: Matrix::column_vector(&[1.0]),
            x_test: Matrix::column_vector(&[1.0]),
            y_train: vec![2.0],
            y_test: vec![2.0],
            held_out: false,
        };
        // ransac needs two rows for a one-feature subset
        let roster = [ModelKind::Linear, ModelKind::Ransac, ModelKind::Knn];
        let records = harness.evaluate_roster(&roster, &tiny, None);
        let names: Vec<&str> = records.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(names, vec!["linear", "knn"]);
    }

    #[test]
    fn test_parallel_roster_matches_sequential_order() {
        let sequential = EvaluationHarness::new(42);
        let parallel = EvaluationHarness::new(42).with_parallel(true);
        let roster = ModelKind::BASELINE;
        let a = sequential.evaluate_roster(&roster, &split(), None);
        let b = parallel.evaluate_roster(&roster, &split(), None);
        assert_eq!(a, b);
    }
}
