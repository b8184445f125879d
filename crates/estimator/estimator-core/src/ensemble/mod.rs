//! Ensembles built from other regressors.

mod boosting;
mod forest;
mod stacking;
mod voting;

pub use boosting::GradientBoostingRegressor;
pub use forest::RandomForestRegressor;
pub use stacking::StackingRegressor;
pub use voting::VotingRegressor;

pub use crate::tree::MaxFeatures;
