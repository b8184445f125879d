//! Ensemble member chosen for a query row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of ensemble members a row can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingLabel {
    Stacking,
    Voting,
    Elastic,
    DecisionTree,
}

impl RoutingLabel {
    pub const ALL: [RoutingLabel; 4] = [
        RoutingLabel::Stacking,
        RoutingLabel::Voting,
        RoutingLabel::Elastic,
        RoutingLabel::DecisionTree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingLabel::Stacking => "stacking",
            RoutingLabel::Voting => "voting",
            RoutingLabel::Elastic => "elastic",
            RoutingLabel::DecisionTree => "decision_tree",
        }
    }
}

impl fmt::Display for RoutingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_snake_case() {
        for label in RoutingLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
        }
    }
}
