//! Winner selection across evaluated candidates.

use regression_api::SelectionStrategy;
use regression_spi::{EvaluationRecord, RegressionError, Result, SelectionPolicy, SelectionResult};
use tracing::{debug, info};

/// Differences below this count as a tie.
const NEAR_TIE: f64 = 1e-4;

/// Model whose query prediction backs up a winner without one.
const FALLBACK_MODEL: &str = "linear";

/// First record with the highest `r2_test`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSelection;

impl SelectionPolicy for SimpleSelection {
    fn name(&self) -> &str {
        "simple"
    }

    fn pick(&self, records: &[EvaluationRecord]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, record) in records.iter().enumerate() {
            if best.map_or(true, |b| record.r2_test > records[b].r2_test) {
                best = Some(i);
            }
        }
        best
    }
}

/// Highest `r2_test`; near ties go to the lower `rmse_test`, then to the
/// lower `generalization_error`. Earlier records win complete ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustSelection;

impl RobustSelection {
    fn beats(challenger: &EvaluationRecord, incumbent: &EvaluationRecord) -> bool {
        if (challenger.r2_test - incumbent.r2_test).abs() >= NEAR_TIE {
            return challenger.r2_test > incumbent.r2_test;
        }
        if (challenger.rmse_test - incumbent.rmse_test).abs() >= NEAR_TIE {
            return challenger.rmse_test < incumbent.rmse_test;
        }
        challenger.generalization_error < incumbent.generalization_error
    }
}

impl SelectionPolicy for RobustSelection {
    fn name(&self) -> &str {
        "robust"
    }

    fn pick(&self, records: &[EvaluationRecord]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, record) in records.iter().enumerate() {
            if best.map_or(true, |b| Self::beats(record, &records[b])) {
                best = Some(i);
            }
        }
        best
    }
}

pub fn policy_for(strategy: SelectionStrategy) -> Box<dyn SelectionPolicy> {
    match strategy {
        SelectionStrategy::Simple => Box::new(SimpleSelection),
        SelectionStrategy::Robust => Box::new(RobustSelection),
    }
}

/// Applies a [`SelectionPolicy`] and the linear query-prediction fallback.
pub struct SelectionEngine {
    policy: Box<dyn SelectionPolicy>,
}

impl SelectionEngine {
    pub fn new(policy: Box<dyn SelectionPolicy>) -> Self {
        Self { policy }
    }

    pub fn for_strategy(strategy: SelectionStrategy) -> Self {
        Self::new(policy_for(strategy))
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Pick the winner. With query rows, a winner without a prediction
    /// borrows the first linear record's prediction; if there is none the
    /// result simply carries no prediction.
    pub fn select(&self, records: &[EvaluationRecord], has_query: bool) -> Result<SelectionResult> {
        let index = self
            .policy
            .pick(records)
            .ok_or(RegressionError::NoViableCandidate)?;
        let winner = records
            .get(index)
            .ok_or_else(|| RegressionError::unreachable("selection index out of range"))?;

        let mut best_result = winner.y0.clone();
        if has_query && best_result.is_none() {
            best_result = records
                .iter()
                .find(|r| r.model == FALLBACK_MODEL && r.y0.is_some())
                .and_then(|r| r.y0.clone());
            debug!(
                winner = %winner.model,
                found = best_result.is_some(),
                "winner has no query prediction; tried linear fallback"
            );
        }

        info!(
            policy = self.policy.name(),
            model = %winner.model,
            r2_test = winner.r2_test,
            candidates = records.len(),
            "selected best model"
        );

        Ok(SelectionResult {
            best_model: winner.model.clone(),
            best_score: winner.r2_test,
            best_rmse_test: winner.rmse_test,
            best_generalization_error: winner.generalization_error,
            best_result,
            policy: self.policy.name().to_string(),
        })
    }
}

impl std::fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("policy", &self.policy.name())
            .finish()
    }
}
