//! Output record of one evaluated candidate.

use serde::{Deserialize, Serialize};

use super::{DataSizeLabel, ModelStatus};

/// Metrics of one candidate over a train/test split.
///
/// Every float is rounded to four decimals. `x0` and `y0` are present only
/// when query points were supplied and the candidate predicted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub model: String,
    /// Train rows plus test rows
    pub data_size: usize,
    pub data_size_label: DataSizeLabel,
    pub rmse_train: f64,
    pub rmse_test: f64,
    /// Mean absolute error on the test rows
    pub mae: f64,
    pub r2_train: f64,
    pub r2_test: f64,
    pub r2_status: ModelStatus,
    pub generalization_error: f64,
    pub generalization_status: ModelStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x0: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y0: Option<Vec<f64>>,
}

impl EvaluationRecord {
    pub fn has_prediction(&self) -> bool {
        self.y0.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            model: "linear".to_string(),
            data_size: 8,
            data_size_label: DataSizeLabel::Tiny,
            rmse_train: 0.5,
            rmse_test: 0.5,
            mae: 0.4,
            r2_train: 0.9,
            r2_test: 0.9,
            r2_status: ModelStatus::Stable,
            generalization_error: 0.0,
            generalization_status: ModelStatus::Stable,
            x0: None,
            y0: None,
        }
    }

    #[test]
    fn test_query_fields_omitted_without_prediction() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("x0").is_none());
        assert!(json.get("y0").is_none());
        assert_eq!(json["data_size_label"], "tiny");
        assert_eq!(json["r2_status"], "Stable");
    }

    #[test]
    fn test_query_fields_serialized_with_prediction() {
        let mut with_query = record();
        with_query.x0 = Some(vec![vec![1.0, 2.0]]);
        with_query.y0 = Some(vec![3.5]);
        assert!(with_query.has_prediction());
        let json = serde_json::to_value(&with_query).unwrap();
        assert_eq!(json["x0"], serde_json::json!([[1.0, 2.0]]));
        assert_eq!(json["y0"], serde_json::json!([3.5]));
    }
}
