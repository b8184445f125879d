//! Shape normalisation of raw request arrays.

use estimator_spi::Matrix;
use regression_api::{NumericArray, RegressionInput};
use regression_spi::{Result, ValidationError};

/// Validated dataset: `x.rows() == y.len()` and, when present,
/// `x0.cols() == x.cols()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInput {
    pub x: Matrix,
    pub y: Vec<f64>,
    pub x0: Option<Matrix>,
}

impl PreparedInput {
    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    pub fn n_features(&self) -> usize {
        self.x.cols()
    }
}

/// Turns raw [`NumericArray`]s into matrices.
///
/// A flat `X` becomes one column, a flat `x0` becomes one row, and `Y` is
/// always flattened.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputPreparer;

impl InputPreparer {
    pub fn prepare(input: &RegressionInput) -> Result<PreparedInput> {
        Self::prepare_arrays(&input.x, &input.y, input.x0.as_ref())
    }

    pub fn prepare_arrays(
        x: &NumericArray,
        y: &NumericArray,
        x0: Option<&NumericArray>,
    ) -> Result<PreparedInput> {
        let x = to_matrix("X", x, Orientation::Column)?;
        let y = y.flatten();
        if y.is_empty() {
            return Err(empty("Y").into());
        }
        ensure_finite("Y", &y)?;
        if x.rows() != y.len() {
            return Err(ValidationError::LengthMismatch {
                x_rows: x.rows(),
                y_len: y.len(),
            }
            .into());
        }

        let x0 = match x0 {
            Some(raw) => {
                let query = to_matrix("x0", raw, Orientation::Row)?;
                if query.cols() != x.cols() {
                    return Err(ValidationError::ShapeMismatch {
                        expected: x.cols(),
                        actual: query.cols(),
                    }
                    .into());
                }
                Some(query)
            }
            None => None,
        };

        Ok(PreparedInput { x, y, x0 })
    }
}

/// How a flat array is promoted to two dimensions.
#[derive(Clone, Copy)]
enum Orientation {
    /// n values -> n x 1
    Column,
    /// k values -> 1 x k
    Row,
}

fn empty(field: &str) -> ValidationError {
    ValidationError::Empty {
        field: field.to_string(),
    }
}

fn ensure_finite(field: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::NonFinite {
            field: field.to_string(),
        }
        .into())
    }
}

fn to_matrix(field: &str, raw: &NumericArray, orientation: Orientation) -> Result<Matrix> {
    if raw.is_empty() {
        return Err(empty(field).into());
    }
    let (rows, cols, data) = match raw {
        NumericArray::Vector(values) => match orientation {
            Orientation::Column => (values.len(), 1, values.clone()),
            Orientation::Row => (1, values.len(), values.clone()),
        },
        NumericArray::Matrix(rows) => {
            let cols = rows[0].len();
            if cols == 0 {
                return Err(empty(field).into());
            }
            if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
                return Err(ValidationError::RaggedRows {
                    field: field.to_string(),
                    row,
                    expected: cols,
                    actual: bad.len(),
                }
                .into());
            }
            (rows.len(), cols, raw.flatten())
        }
    };
    ensure_finite(field, &data)?;
    Matrix::new(rows, cols, data).map_err(|_| {
        ValidationError::RaggedRows {
            field: field.to_string(),
            row: 0,
            expected: cols,
            actual: 0,
        }
        .into()
    })
}
