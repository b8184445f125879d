//! Metrics, composite generalization score and status labels.

use estimator_core::metrics::{mae, r_squared, rmse};
use estimator_spi::Matrix;
use regression_spi::{DataSizeLabel, EvaluationRecord, ModelStatus};

use crate::split::TrainTestSplit;

/// Both R² values below this mark a weak model.
const R2_FLOOR: f64 = 0.5;
const R2_GAP_LIMIT: f64 = 0.2;
const RMSE_GAP_LIMIT: f64 = 0.2;
/// RMSE sums below this make the normalised RMSE gap zero.
const RMSE_SUM_EPSILON: f64 = 1e-4;

/// Round to four decimals.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Mean of the normalised RMSE gap and the R² gap. Zero means train/test
/// parity; lower is better.
pub fn composite_score(rmse_train: f64, rmse_test: f64, r2_train: f64, r2_test: f64) -> f64 {
    let sum = rmse_train + rmse_test;
    let rmse_gap = if sum < RMSE_SUM_EPSILON {
        0.0
    } else {
        (rmse_train / sum - rmse_test / sum).abs()
    };
    let r2_gap = (r2_train - r2_test).abs();
    (rmse_gap + r2_gap) / 2.0
}

/// Qualitative label. A weak model takes precedence over any gap analysis;
/// the RMSE gap here is the raw absolute difference.
pub fn status(r2_train: f64, r2_test: f64, rmse_train: f64, rmse_test: f64) -> ModelStatus {
    if r2_train < R2_FLOOR && r2_test < R2_FLOOR {
        return ModelStatus::WeakModel;
    }
    let r2_gap = (r2_train - r2_test).abs();
    let rmse_gap = (rmse_test - rmse_train).abs();
    if r2_gap > R2_GAP_LIMIT && rmse_gap > RMSE_GAP_LIMIT {
        ModelStatus::Overfit
    } else if r2_gap < R2_GAP_LIMIT && rmse_gap < RMSE_GAP_LIMIT {
        ModelStatus::Stable
    } else {
        ModelStatus::Uncertain
    }
}

pub fn data_size_label(n: usize) -> DataSizeLabel {
    match n {
        0..=49 => DataSizeLabel::Tiny,
        50..=99 => DataSizeLabel::Small,
        100..=999 => DataSizeLabel::Normal,
        1000..=9999 => DataSizeLabel::Big,
        _ => DataSizeLabel::Enormous,
    }
}

/// Builds [`EvaluationRecord`]s from true and predicted vectors.
///
/// Labels and the composite score are computed from unrounded metrics;
/// rounding happens once when the record is assembled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn score(
        model: &str,
        split: &TrainTestSplit,
        train_predicted: &[f64],
        test_predicted: &[f64],
        query: Option<(&Matrix, Vec<f64>)>,
    ) -> EvaluationRecord {
        let rmse_train = rmse(&split.y_train, train_predicted);
        let rmse_test = rmse(&split.y_test, test_predicted);
        let mae_test = mae(&split.y_test, test_predicted);
        let r2_train = r_squared(&split.y_train, train_predicted);
        let r2_test = r_squared(&split.y_test, test_predicted);
        let label = status(r2_train, r2_test, rmse_train, rmse_test);
        let data_size = split.data_size();

        let (x0, y0) = match query {
            Some((x0, y0)) => (
                Some(x0.to_rows()),
                Some(y0.into_iter().map(round4).collect()),
            ),
            None => (None, None),
        };

        EvaluationRecord {
            model: model.to_string(),
            data_size,
            data_size_label: data_size_label(data_size),
            rmse_train: round4(rmse_train),
            rmse_test: round4(rmse_test),
            mae: round4(mae_test),
            r2_train: round4(r2_train),
            r2_test: round4(r2_test),
            r2_status: label,
            generalization_error: round4(composite_score(rmse_train, rmse_test, r2_train, r2_test)),
            generalization_status: label,
            x0,
            y0,
        }
    }
}
