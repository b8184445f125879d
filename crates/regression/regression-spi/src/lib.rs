//! Regression Engine Service Provider Interface
//!
//! Defines the shared vocabulary of the evaluation engine:
//! - Evaluation records and selection results
//! - Routing labels for ensemble dispatch
//! - Selection and routing strategy contracts
//! - The engine error taxonomy

pub mod contract;
pub mod error;
pub mod model;

pub use contract::{RowRouter, SelectionPolicy};
pub use error::{FatalKind, RegressionError, ValidationError};
pub use model::{
    DataSizeLabel, EvaluationRecord, FeatureStats, ModelStatus, RoutingLabel, SelectionResult,
};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, RegressionError>;
