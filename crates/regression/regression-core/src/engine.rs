//! Entry points for the three evaluation modes.

use estimator_core::DEFAULT_SEED;
use estimator_spi::{Matrix, ModelKind};
use regression_api::{EngineConfig, RegressionInput};
use regression_spi::{EvaluationRecord, RegressionError, Result, SelectionResult};
use tracing::{info, warn};

use crate::harness::EvaluationHarness;
use crate::input::{InputPreparer, PreparedInput};
use crate::routing::RoutingClassifier;
use crate::scoring::ScoringEngine;
use crate::selection::SelectionEngine;
use crate::split::{AdaptiveSplitter, TrainTestSplit};
use crate::stack::{FittedEnsemble, ENSEMBLE_RECORD_NAME};

/// Synchronous, stateless evaluation engine. Each call owns its data; one
/// engine can serve any number of requests.
#[derive(Debug, Clone, Default)]
pub struct RegressionEngine {
    config: EngineConfig,
}

impl RegressionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn harness(&self) -> EvaluationHarness {
        EvaluationHarness::new(self.config.seed.unwrap_or(DEFAULT_SEED))
            .with_parallel(self.config.parallel_candidates)
    }

    fn prepare(&self, input: &RegressionInput) -> Result<(PreparedInput, TrainTestSplit)> {
        let prepared = InputPreparer::prepare(input)?;
        let split = AdaptiveSplitter::new(self.config.seed).split(&prepared.x, &prepared.y)?;
        Ok((prepared, split))
    }

    /// Fit and score the single model named by `input.model`.
    ///
    /// An unknown selector is fatal. Unlike the roster modes, a failing fit
    /// is returned to the caller.
    pub fn run_option(&self, input: &RegressionInput) -> Result<EvaluationRecord> {
        let selector = input.model.trim();
        let kind: ModelKind = selector
            .parse()
            .map_err(|_| RegressionError::unknown_selector(selector))?;
        let name = if selector.is_empty() {
            kind.as_str()
        } else {
            selector
        };

        let (prepared, split) = self.prepare(input)?;
        let record = self
            .harness()
            .evaluate_kind(name, kind, &split, prepared.x0.as_ref())?;
        info!(model = name, r2_test = record.r2_test, "evaluated requested model");
        Ok(record)
    }

    /// Evaluate the baseline roster, skipping candidates that fail.
    pub fn evaluate_all(&self, input: &RegressionInput) -> Result<Vec<EvaluationRecord>> {
        let (prepared, split) = self.prepare(input)?;
        Ok(self
            .harness()
            .evaluate_roster(&ModelKind::BASELINE, &split, prepared.x0.as_ref()))
    }

    /// Evaluate the baseline roster and pick a winner with the configured
    /// selection policy.
    pub fn find_best(&self, input: &RegressionInput) -> Result<SelectionResult> {
        let (prepared, split) = self.prepare(input)?;
        let records =
            self.harness()
                .evaluate_roster(&ModelKind::BASELINE, &split, prepared.x0.as_ref());
        SelectionEngine::for_strategy(self.config.selection)
            .select(&records, prepared.x0.is_some())
    }

    /// Ensemble mode: metrics from the stacking meta-model, each query row
    /// predicted by the member its routing label names.
    pub fn run_stack(&self, input: &RegressionInput) -> Result<EvaluationRecord> {
        let (prepared, split) = self.prepare(input)?;
        let seed = self.config.seed.unwrap_or(DEFAULT_SEED);
        let ensemble = FittedEnsemble::fit(prepared.n_samples(), &split, seed)?;

        let train_predicted = ensemble.predict_stacking(&split.x_train)?;
        let test_predicted = ensemble.predict_stacking(&split.x_test)?;

        let query = match prepared.x0.as_ref() {
            Some(x0) => self.route_query(&ensemble, &prepared.x, x0).map(|y0| (x0, y0)),
            None => None,
        };

        Ok(ScoringEngine::score(
            ENSEMBLE_RECORD_NAME,
            &split,
            &train_predicted,
            &test_predicted,
            query,
        ))
    }

    /// Predict every query row with its routed member. Quartiles come from
    /// the full `x`. Any failed row drops the whole query prediction.
    fn route_query(&self, ensemble: &FittedEnsemble, x: &Matrix, x0: &Matrix) -> Option<Vec<f64>> {
        let classifier = RoutingClassifier::fit(self.config.routing, x);
        let labels = classifier.classify(x0);

        let mut y0 = Vec::with_capacity(labels.len());
        for (row, label) in x0.iter_rows().zip(labels) {
            match ensemble.predict_member(label, row) {
                Ok(value) if value.is_finite() => y0.push(value),
                Ok(_) => {
                    warn!(member = label.as_str(), "routed prediction is not finite; omitting y0");
                    return None;
                }
                Err(e) => {
                    warn!(member = label.as_str(), error = %e, "routed prediction failed; omitting y0");
                    return None;
                }
            }
        }
        Some(y0)
    }
}
