//! Regression Engine Core
//!
//! Core implementations of the evaluation pipeline:
//! - Input preparation and validation
//! - Sample-count dependent train/test splitting
//! - Metric scoring and qualitative status labels
//! - Single-candidate and roster evaluation
//! - Winner selection policies
//! - Quartile-based row routing for the ensemble mode
//! - A worker pool that keeps fitting off the async scheduler

mod engine;
mod harness;
mod input;
mod routing;
mod scoring;
mod selection;
mod split;
mod stack;
mod worker;

pub use engine::RegressionEngine;
pub use harness::EvaluationHarness;
pub use input::{InputPreparer, PreparedInput};
pub use routing::{
    feature_stats, router_for, BandCounts, NormalizedIqrRouter, QuartileBandRouter,
    RoutingClassifier,
};
pub use scoring::{composite_score, data_size_label, round4, status, ScoringEngine};
pub use selection::{policy_for, RobustSelection, SelectionEngine, SimpleSelection};
pub use split::{AdaptiveSplitter, TrainTestSplit};
pub use stack::{stacking_folds, FittedEnsemble, ENSEMBLE_RECORD_NAME};
pub use worker::WorkerPool;

// Re-export from API for convenience
pub use regression_api::{
    DataSizeLabel, EngineConfig, EvaluationRecord, FatalKind, FeatureStats, ModelStatus,
    NumericArray, RegressionError, RegressionInput, Result, RoutingLabel, RoutingStrategy,
    SelectionResult, SelectionStrategy, ValidationError,
};

// Re-export SPI traits
pub use regression_spi::{RowRouter, SelectionPolicy};
