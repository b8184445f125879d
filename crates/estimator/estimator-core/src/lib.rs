//! Estimator Core
//!
//! Regression models behind the [`Regressor`] contract, organized by family:
//!
//! - [`linear`]: ordinary least squares, ridge, lasso / elastic net, Bayesian ridge
//! - [`tree`]: CART decision trees (best and randomised splits)
//! - [`ensemble`]: random forest, gradient boosting, stacking, voting
//! - [`neighbors`]: k-nearest-neighbours regression
//! - [`svm`]: epsilon- and nu-support vector regression
//! - [`robust`]: Huber, RANSAC, Theil-Sen
//! - [`search`]: k-fold grid and randomized hyperparameter search
//! - [`registry`]: [`ModelKind`] lookup table producing configured models
//!
//! ## Example
//!
//! ```rust
//! use estimator_core::prelude::*;
//!
//! let x = Matrix::column_vector(&[1.0, 2.0, 3.0, 4.0]);
//! let y = vec![3.0, 5.0, 7.0, 9.0];
//! let mut model = LinearRegression::new();
//! model.fit(&x, &y).unwrap();
//! let predicted = model.predict(&Matrix::column_vector(&[5.0])).unwrap();
//! assert!((predicted[0] - 11.0).abs() < 1e-9);
//! ```

pub mod ensemble;
pub mod linalg;
pub mod linear;
pub mod metrics;
pub mod neighbors;
pub mod registry;
pub mod robust;
pub mod search;
pub mod svm;
pub mod tree;

// Re-export from SPI
pub use estimator_spi::{EstimatorError, Matrix, ModelKind, Regressor, Result};

pub use registry::{build, DEFAULT_SEED};

/// Prelude module for convenient imports
pub mod prelude {
    pub use estimator_spi::{EstimatorError, Matrix, ModelKind, Regressor, Result};

    pub use crate::ensemble::{
        GradientBoostingRegressor, MaxFeatures, RandomForestRegressor, StackingRegressor,
        VotingRegressor,
    };
    pub use crate::linear::{
        BayesianRidge, ElasticNet, ElasticNetCv, LinearRegression, Ridge, RidgeCv,
    };
    pub use crate::neighbors::{KNeighborsRegressor, NeighborWeights};
    pub use crate::registry::{build, DEFAULT_SEED};
    pub use crate::robust::{HuberRegressor, RansacRegressor, TheilSenRegressor};
    pub use crate::search::{GridSearchCv, KFold, RandomizedSearchCv, Scoring};
    pub use crate::svm::{Gamma, Kernel, NuSvr, Svr};
    pub use crate::tree::{DecisionTreeRegressor, Splitter, TreeParams};
}
