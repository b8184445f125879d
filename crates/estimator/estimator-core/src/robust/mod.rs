//! Outlier-resistant linear regressors.

mod huber;
mod ransac;
mod theil_sen;

pub use huber::HuberRegressor;
pub use ransac::RansacRegressor;
pub use theil_sen::TheilSenRegressor;
