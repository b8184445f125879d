//! Contract module containing the estimator traits.

mod regressor;

pub use regressor::Regressor;
