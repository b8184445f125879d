//! Winner of a multi-candidate evaluation.

use serde::{Deserialize, Serialize};

/// View over the winning [`EvaluationRecord`](super::EvaluationRecord).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub best_model: String,
    /// `r2_test` of the winner
    pub best_score: f64,
    pub best_rmse_test: f64,
    pub best_generalization_error: f64,
    /// Query prediction of the winner, or of the linear fallback
    pub best_result: Option<Vec<f64>>,
    /// Name of the selection policy that produced this result
    pub policy: String,
}
