//! Error module containing estimator error types.

mod estimator_error;

pub use estimator_error::EstimatorError;
