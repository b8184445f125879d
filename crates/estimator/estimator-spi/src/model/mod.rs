//! Model module containing estimator data structures.
//!
//! - [`Matrix`] - Dense feature matrix shared by every regressor
//! - [`ModelKind`] - Closed enumeration of registry entries

mod matrix;
mod model_kind;

pub use matrix::Matrix;
pub use model_kind::ModelKind;
