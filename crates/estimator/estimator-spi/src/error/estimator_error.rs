//! Estimator error types.

use thiserror::Error;

/// Errors raised by regressors while fitting or predicting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// Insufficient rows for the operation.
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid hyperparameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Feature count differs from the one seen during fit.
    #[error("Shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Model has not been fitted yet.
    #[error("Model must be fitted before prediction")]
    NotFitted,

    /// Numerical computation error.
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Every candidate of a search or ensemble failed.
    #[error("No candidate could be fitted: {0}")]
    NoViableCandidate(String),

    /// Selector string does not name a registry entry.
    #[error("Unknown model '{0}'")]
    UnknownModel(String),
}
