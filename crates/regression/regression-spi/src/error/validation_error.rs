//! Input validation errors.

use thiserror::Error;

/// Rejected input shapes. Raised before any model is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} row {row} has {actual} values, expected {expected}")]
    RaggedRows {
        field: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("X has {x_rows} rows but Y has {y_len} values")]
    LengthMismatch { x_rows: usize, y_len: usize },

    #[error("x0 has {actual} columns but X has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{field} contains a non-finite value")]
    NonFinite { field: String },
}
