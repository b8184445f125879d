//! Descriptive dataset size bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSizeLabel {
    /// Fewer than 50 rows
    Tiny,
    /// 50 to 99 rows
    Small,
    /// 100 to 999 rows
    Normal,
    /// 1000 to 9999 rows
    Big,
    Enormous,
}

impl DataSizeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSizeLabel::Tiny => "tiny",
            DataSizeLabel::Small => "small",
            DataSizeLabel::Normal => "normal",
            DataSizeLabel::Big => "big",
            DataSizeLabel::Enormous => "enormous",
        }
    }
}

impl fmt::Display for DataSizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
