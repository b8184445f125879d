//! Cross-candidate winner selection.

use crate::model::EvaluationRecord;

/// Picks the winning record of a multi-candidate evaluation.
pub trait SelectionPolicy: Send + Sync {
    fn name(&self) -> &str;

    /// Index of the winner, or `None` for an empty record set.
    fn pick(&self, records: &[EvaluationRecord]) -> Option<usize>;
}
