//! Error module containing engine error types.

mod regression_error;
mod validation_error;

pub use regression_error::{FatalKind, RegressionError};
pub use validation_error::ValidationError;
