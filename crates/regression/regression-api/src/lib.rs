//! Regression Engine Consumer API
//!
//! Configuration types and DTOs for engine consumers.

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use regression_spi::{
    DataSizeLabel, EvaluationRecord, FatalKind, FeatureStats, ModelStatus, RegressionError,
    Result, RoutingLabel, RowRouter, SelectionPolicy, SelectionResult, ValidationError,
};

/// Winner selection policy for the multi-candidate mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// First candidate with the highest test R²
    Simple,
    /// Highest test R², then lower test RMSE, then lower generalization error
    #[default]
    Robust,
}

/// Row router for the ensemble mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Near-median / near-quartile / far counts against half a standard deviation
    #[default]
    QuartileBands,
    /// Distance to the median normalised by the interquartile range
    NormalizedIqr,
}

/// Configuration for the regression engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Seed for the train/test split and every randomised model; `None` draws from entropy
    pub seed: Option<u64>,
    /// Policy used by the best-model mode
    pub selection: SelectionStrategy,
    /// Router used by the ensemble mode
    pub routing: RoutingStrategy,
    /// Evaluate the baseline roster on rayon's pool instead of sequentially
    pub parallel_candidates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            selection: SelectionStrategy::Robust,
            routing: RoutingStrategy::QuartileBands,
            parallel_candidates: false,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the selection policy
    pub fn selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    /// Set the ensemble router
    pub fn routing(mut self, routing: RoutingStrategy) -> Self {
        self.routing = routing;
        self
    }

    /// Enable or disable parallel candidate evaluation
    pub fn parallel_candidates(mut self, parallel: bool) -> Self {
        self.parallel_candidates = parallel;
        self
    }
}

/// A JSON number array that is either flat or nested one level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumericArray {
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl NumericArray {
    /// Number of top-level entries
    pub fn len(&self) -> usize {
        match self {
            NumericArray::Vector(v) => v.len(),
            NumericArray::Matrix(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All values in row-major order
    pub fn flatten(&self) -> Vec<f64> {
        match self {
            NumericArray::Vector(v) => v.clone(),
            NumericArray::Matrix(m) => m.iter().flatten().copied().collect(),
        }
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(values: Vec<f64>) -> Self {
        NumericArray::Vector(values)
    }
}

impl From<Vec<Vec<f64>>> for NumericArray {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        NumericArray::Matrix(rows)
    }
}

/// Request body shared by the single-model, best-model and ensemble modes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionInput {
    #[serde(rename = "X_array")]
    pub x: NumericArray,
    #[serde(rename = "Y_array")]
    pub y: NumericArray,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x0: Option<NumericArray>,
    /// Model selector; ignored outside the single-model mode
    #[serde(default)]
    pub model: String,
}

impl RegressionInput {
    pub fn new(x: impl Into<NumericArray>, y: impl Into<NumericArray>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            x0: None,
            model: String::new(),
        }
    }

    pub fn with_query(mut self, x0: impl Into<NumericArray>) -> Self {
        self.x0 = Some(x0.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
