//! Regression accuracy metrics.
//!
//! All functions return `NaN` when the inputs differ in length or are empty.

/// Mean Absolute Error (MAE)
///
/// Average of absolute differences between predictions and actual values.
/// Lower is better. Same scale as the data.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

/// Mean Squared Error (MSE)
///
/// Average of squared differences. Penalizes large errors more heavily.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    sum / actual.len() as f64
}

/// Root Mean Squared Error (RMSE)
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// R-squared (Coefficient of Determination)
///
/// 1.0 = perfect, 0.0 = same as mean prediction, negative = worse than mean.
/// When the actual values are constant the score is 1.0 for a perfect
/// prediction and 0.0 otherwise, so the result is always finite.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let scale: f64 = actual.iter().map(|a| a * a).sum::<f64>().max(1.0);

    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot <= 1e-12 * scale {
        return if ss_res <= 1e-12 * scale { 1.0 } else { 0.0 };
    }

    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_metrics() {
        let actual = vec![3.0, -0.5, 2.0, 7.0];
        let predicted = vec![2.5, 0.0, 2.0, 8.0];
        assert!((mae(&actual, &predicted) - 0.5).abs() < 1e-12);
        assert!((mse(&actual, &predicted) - 0.375).abs() < 1e-12);
        assert!((r_squared(&actual, &predicted) - 0.948_608_137_044_968).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch_is_nan() {
        assert!(mae(&[1.0], &[1.0, 2.0]).is_nan());
        assert!(rmse(&[], &[]).is_nan());
    }

    #[test]
    fn test_constant_target_r2() {
        assert_eq!(r_squared(&[2.0, 2.0], &[2.0, 2.0]), 1.0);
        assert_eq!(r_squared(&[2.0, 2.0], &[1.0, 3.0]), 0.0);
        assert_eq!(r_squared(&[5.0], &[4.0]), 0.0);
    }
}
