//! Qualitative train/test health label.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelStatus {
    /// Both R² values below the quality floor
    #[serde(rename = "Weak model")]
    WeakModel,
    Overfit,
    Stable,
    Uncertain,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::WeakModel => "Weak model",
            ModelStatus::Overfit => "Overfit",
            ModelStatus::Stable => "Stable",
            ModelStatus::Uncertain => "Uncertain",
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
