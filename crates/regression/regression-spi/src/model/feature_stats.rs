//! Per-feature distribution summary used by row routers.

use serde::{Deserialize, Serialize};

/// Quartiles and population standard deviation of one training feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub std: f64,
}

impl FeatureStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}
