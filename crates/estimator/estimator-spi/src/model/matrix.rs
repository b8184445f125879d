//! Dense row-major feature matrix.

use crate::error::EstimatorError;
use crate::Result;

/// Dense row-major matrix of `f64` features. Rows are samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Build a matrix from a flat row-major buffer.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(EstimatorError::InvalidParameter {
                name: "data".to_string(),
                reason: format!(
                    "buffer of length {} cannot form a {}x{} matrix",
                    data.len(),
                    rows,
                    cols
                ),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from nested rows. All rows must share one width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(EstimatorError::ShapeMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Single-feature matrix: each value becomes its own row.
    pub fn column_vector(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// Single-sample matrix: the values form one row.
    pub fn row_vector(values: &[f64]) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Copy column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// New matrix made of the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            rows: indices.len(),
            cols: self.cols,
            data,
        }
    }

    /// New matrix keeping only the given columns.
    pub fn select_cols(&self, columns: &[usize]) -> Self {
        let mut data = Vec::with_capacity(self.rows * columns.len());
        for row in self.iter_rows() {
            data.extend(columns.iter().map(|&j| row[j]));
        }
        Self {
            rows: self.rows,
            cols: columns.len(),
            data,
        }
    }

    /// Nested-vector copy, one inner vector per row.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Fail with [`EstimatorError::ShapeMismatch`] unless the matrix has `expected` columns.
    pub fn ensure_cols(&self, expected: usize) -> Result<()> {
        if self.cols != expected {
            return Err(EstimatorError::ShapeMismatch {
                expected,
                actual: self.cols,
            });
        }
        Ok(())
    }

    /// Check that `x` and `y` describe the same samples and are non-empty.
    pub fn ensure_fit_input(&self, y: &[f64], required: usize) -> Result<()> {
        if self.rows != y.len() {
            return Err(EstimatorError::InvalidParameter {
                name: "y".to_string(),
                reason: format!("{} targets for {} rows", y.len(), self.rows),
            });
        }
        if self.rows < required.max(1) {
            return Err(EstimatorError::InsufficientData {
                required: required.max(1),
                actual: self.rows,
            });
        }
        if self.cols == 0 {
            return Err(EstimatorError::InvalidParameter {
                name: "x".to_string(),
                reason: "matrix has no feature columns".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_shape() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.column(1), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_from_rows_ragged() {
        let result = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(EstimatorError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_new_rejects_bad_buffer() {
        assert!(Matrix::new(2, 2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(Matrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
    }

    #[test]
    fn test_column_and_row_vectors() {
        let col = Matrix::column_vector(&[1.0, 2.0, 3.0]);
        assert_eq!((col.rows(), col.cols()), (3, 1));
        let row = Matrix::row_vector(&[1.0, 2.0, 3.0]);
        assert_eq!((row.rows(), row.cols()), (1, 3));
    }

    #[test]
    fn test_select_rows_and_cols() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let picked = m.select_rows(&[2, 0]);
        assert_eq!(picked.to_rows(), vec![vec![5.0, 6.0], vec![1.0, 2.0]]);
        let second = m.select_cols(&[1]);
        assert_eq!(second.as_slice(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_ensure_fit_input() {
        let m = Matrix::column_vector(&[1.0, 2.0]);
        assert!(m.ensure_fit_input(&[1.0, 2.0], 2).is_ok());
        assert!(m.ensure_fit_input(&[1.0], 1).is_err());
        assert!(matches!(
            m.ensure_fit_input(&[1.0, 2.0], 3),
            Err(EstimatorError::InsufficientData { .. })
        ));
    }
}
