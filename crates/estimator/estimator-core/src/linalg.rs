//! Small dense linear-algebra and order-statistic helpers.
//!
//! Square matrices are passed as flat row-major buffers of length `n * n`.

use estimator_spi::{EstimatorError, Matrix, Result};

/// Arithmetic mean; `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (`ddof = 0`).
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation (`ddof = 0`).
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Per-column means of `x`.
pub fn column_means(x: &Matrix) -> Vec<f64> {
    let mut sums = vec![0.0; x.cols()];
    for row in x.iter_rows() {
        for (s, v) in sums.iter_mut().zip(row) {
            *s += v;
        }
    }
    let n = x.rows().max(1) as f64;
    sums.into_iter().map(|s| s / n).collect()
}

/// Sort a copy of `values` ascending. `NaN`s compare equal.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Quantile `q` in `[0, 1]` of already sorted data, linearly interpolated
/// between the two nearest order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn quantile(values: &[f64], q: f64) -> f64 {
    quantile_sorted(&sorted(values), q)
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Median absolute deviation around the median.
pub fn median_absolute_deviation(values: &[f64]) -> f64 {
    let m = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - m).abs()).collect();
    median(&deviations)
}

/// Solve `a * x = b` for square `a` (`n x n`) by Gaussian elimination with
/// partial pivoting.
pub fn solve(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i * n + col]
                    .abs()
                    .partial_cmp(&a[j * n + col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot * n + col].abs() <= 1e-12 * scale {
            return Err(EstimatorError::NumericalError(
                "Singular matrix in linear solve".to_string(),
            ));
        }

        if pivot != col {
            for k in 0..n {
                a.swap(col * n + k, pivot * n + k);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[row * n + col] / a[col * n + col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row * n + k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row * n + row];
    }
    Ok(x)
}

/// Invert a square matrix by solving against each unit vector.
pub fn invert(a: &[f64], n: usize) -> Result<Vec<f64>> {
    let mut inverse = vec![0.0; n * n];
    for col in 0..n {
        let mut unit = vec![0.0; n];
        unit[col] = 1.0;
        let column = solve(a.to_vec(), unit, n)?;
        for row in 0..n {
            inverse[row * n + col] = column[row];
        }
    }
    Ok(inverse)
}

/// Weighted Gram system of column-centered data: returns `(XᵀWX, XᵀWy)`.
pub fn gram(x: &Matrix, y: &[f64], weights: &[f64], x_mean: &[f64], y_mean: f64) -> (Vec<f64>, Vec<f64>) {
    let p = x.cols();
    let mut xtx = vec![0.0; p * p];
    let mut xty = vec![0.0; p];
    for (i, row) in x.iter_rows().enumerate() {
        let w = weights[i];
        let yc = y[i] - y_mean;
        for a in 0..p {
            let xa = row[a] - x_mean[a];
            xty[a] += w * xa * yc;
            for b in a..p {
                xtx[a * p + b] += w * xa * (row[b] - x_mean[b]);
            }
        }
    }
    for a in 0..p {
        for b in 0..a {
            xtx[a * p + b] = xtx[b * p + a];
        }
    }
    (xtx, xty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantiles_interpolate() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&data, 0.25) - 1.75).abs() < 1e-12);
        assert!((median(&data) - 2.5).abs() < 1e-12);
        assert!((quantile(&data, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_population() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&data) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_two_by_two() {
        // 2x + y = 5, x + 3y = 10
        let x = solve(vec![2.0, 1.0, 1.0, 3.0], vec![5.0, 10.0], 2).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let result = solve(vec![1.0, 2.0, 2.0, 4.0], vec![1.0, 2.0], 2);
        assert!(matches!(result, Err(EstimatorError::NumericalError(_))));
    }

    #[test]
    fn test_invert_identity_product() {
        let a = vec![4.0, 7.0, 2.0, 6.0];
        let inv = invert(&a, 2).unwrap();
        let product = [
            a[0] * inv[0] + a[1] * inv[2],
            a[0] * inv[1] + a[1] * inv[3],
            a[2] * inv[0] + a[3] * inv[2],
            a[2] * inv[1] + a[3] * inv[3],
        ];
        for (got, want) in product.iter().zip([1.0, 0.0, 0.0, 1.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mad() {
        let data = vec![1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0];
        assert!((median_absolute_deviation(&data) - 1.0).abs() < 1e-12);
    }
}
