//! Regression Facade
//!
//! High-level API for evaluating, selecting and combining regression models.
//! Re-exports all public types from the regression stack for convenient usage.
//!
//! # Example
//!
//! ```ignore
//! use regression_facade::prelude::*;
//!
//! let input = RegressionInput::new(
//!     NumericArray::Vector(vec![1.0, 2.0, 3.0, 4.0]),
//!     NumericArray::Vector(vec![3.0, 5.0, 7.0, 9.0]),
//! )
//! .with_query(NumericArray::Vector(vec![5.0]))
//! .with_model("linear");
//!
//! let engine = RegressionEngine::new(EngineConfig::seeded(42));
//! let record = engine.run_option(&input)?;
//! println!("r2_test = {}, y0 = {:?}", record.r2_test, record.y0);
//! ```

// Re-export everything from core (which includes API and SPI)
pub use regression_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    // Traits
    pub use estimator_spi::Regressor;
    pub use regression_spi::{RowRouter, SelectionPolicy};

    // Core types
    pub use estimator_spi::{Matrix, ModelKind};
    pub use regression_api::{
        EngineConfig, NumericArray, RegressionInput, RoutingStrategy, SelectionStrategy,
    };

    // Records and error types
    pub use regression_spi::{
        DataSizeLabel, EvaluationRecord, FatalKind, FeatureStats, ModelStatus, RegressionError,
        Result, RoutingLabel, SelectionResult, ValidationError,
    };

    // Implementations
    pub use regression_core::{
        AdaptiveSplitter, EvaluationHarness, FittedEnsemble, InputPreparer, RegressionEngine,
        RoutingClassifier, ScoringEngine, SelectionEngine, WorkerPool,
    };
}
