//! Closed catalogue of registry models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// A registry entry. Selector strings map onto exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Ridge,
    Lasso,
    Elastic,
    Bayesian,
    DecisionTree,
    ExtraTree,
    RandomForest,
    Svr,
    NuSvr,
    Knn,
    Huber,
    Ransac,
    TheilSen,
}

impl ModelKind {
    /// Every registry entry.
    pub const ALL: [ModelKind; 14] = [
        ModelKind::Linear,
        ModelKind::Ridge,
        ModelKind::Lasso,
        ModelKind::Elastic,
        ModelKind::Bayesian,
        ModelKind::DecisionTree,
        ModelKind::ExtraTree,
        ModelKind::RandomForest,
        ModelKind::Svr,
        ModelKind::NuSvr,
        ModelKind::Knn,
        ModelKind::Huber,
        ModelKind::Ransac,
        ModelKind::TheilSen,
    ];

    /// The baseline roster run when searching for the best model.
    pub const BASELINE: [ModelKind; 6] = [
        ModelKind::Linear,
        ModelKind::Elastic,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::Svr,
        ModelKind::Knn,
    ];

    /// Canonical registry name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Ridge => "ridge",
            ModelKind::Lasso => "lasso",
            ModelKind::Elastic => "elastic",
            ModelKind::Bayesian => "bayesian",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::ExtraTree => "extra_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::Svr => "svr",
            ModelKind::NuSvr => "nu_svr",
            ModelKind::Knn => "knn",
            ModelKind::Huber => "huber",
            ModelKind::Ransac => "ransac",
            ModelKind::TheilSen => "theilsen",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = EstimatorError;

    /// Case-insensitive; the empty selector means `linear`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "" | "linear" | "linear_regression" => ModelKind::Linear,
            // polynomial features are not expanded; kept as an alias
            "polynomial" | "polynomial_regression" => ModelKind::Linear,
            "ridge" | "ridge_regression" => ModelKind::Ridge,
            "lasso" | "lasso_regression" => ModelKind::Lasso,
            "elastic" | "elastic_regression" => ModelKind::Elastic,
            "bayesian" => ModelKind::Bayesian,
            "decision_tree" => ModelKind::DecisionTree,
            "extra_tree" => ModelKind::ExtraTree,
            "random_forest" => ModelKind::RandomForest,
            "svm" | "svr" => ModelKind::Svr,
            "nu_svm" | "nu_svr" => ModelKind::NuSvr,
            "knn" => ModelKind::Knn,
            "huber" => ModelKind::Huber,
            "ransac" => ModelKind::Ransac,
            "theilsen" | "theil_sen" => ModelKind::TheilSen,
            _ => return Err(EstimatorError::UnknownModel(s.to_string())),
        };
        Ok(kind)
    }
}
