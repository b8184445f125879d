//! Estimator Service Provider Interface
//!
//! Defines the contract every regression model in the registry implements:
//! - [`Regressor`] - uniform fit/predict capability
//! - [`Matrix`] - dense row-major feature matrix
//! - [`ModelKind`] - closed catalogue of registry entries

pub mod contract;
pub mod error;
pub mod model;

pub use contract::Regressor;
pub use error::EstimatorError;
pub use model::{Matrix, ModelKind};

/// Result type for estimator operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;
