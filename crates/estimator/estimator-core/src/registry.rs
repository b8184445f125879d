//! Selector lookup table.
//!
//! Every [`ModelKind`] maps to a constructor producing a fresh, unfitted model
//! with its hyperparameter grid or fixed settings. Searched models score
//! candidates with 3-fold cross-validation.

use estimator_spi::{EstimatorError, ModelKind, Regressor, Result};

use crate::ensemble::RandomForestRegressor;
use crate::linear::{
    linspace, logspace, AlphaGrid, BayesianRidge, ElasticNetCv, LinearRegression, RidgeCv,
};
use crate::neighbors::{KNeighborsRegressor, NeighborWeights};
use crate::robust::{HuberRegressor, RansacRegressor, TheilSenRegressor};
use crate::search::{GridSearchCv, RandomizedSearchCv, Scoring};
use crate::svm::{Gamma, Kernel, NuSvr, Svr};
use crate::tree::{DecisionTreeRegressor, MaxFeatures, Splitter, TreeParams};

/// Seed used for every randomised model unless the caller overrides it.
pub const DEFAULT_SEED: u64 = 42;

const SEARCH_FOLDS: usize = 3;
const SVR_C: [f64; 3] = [0.1, 1.0, 10.0];
const SVR_GAMMA: [Gamma; 2] = [Gamma::Scale, Gamma::Auto];
const SVR_KERNEL: [Kernel; 2] = [Kernel::Rbf, Kernel::Linear];
const NU: [f64; 3] = [0.3, 0.5, 0.7];
const TREE_DEPTH: [usize; 3] = [3, 5, 10];
const TREE_SPLIT: [usize; 2] = [2, 5];
const TREE_LEAF: [usize; 2] = [1, 2];
const FOREST_SIZE: [usize; 2] = [50, 100];
const FOREST_FEATURES: [MaxFeatures; 2] = [MaxFeatures::Sqrt, MaxFeatures::Log2];
const FOREST_SAMPLES: usize = 5;
const KNN_K: [usize; 4] = [1, 3, 5, 7];
const KNN_WEIGHTS: [NeighborWeights; 2] = [NeighborWeights::Uniform, NeighborWeights::Distance];
const KNN_P: [u32; 2] = [1, 2];

type Constructor = fn(u64) -> Result<Box<dyn Regressor>>;

const REGISTRY: &[(ModelKind, Constructor)] = &[
    (ModelKind::Linear, linear),
    (ModelKind::Ridge, ridge),
    (ModelKind::Lasso, lasso),
    (ModelKind::Elastic, elastic),
    (ModelKind::Bayesian, bayesian),
    (ModelKind::DecisionTree, decision_tree),
    (ModelKind::ExtraTree, extra_tree),
    (ModelKind::RandomForest, random_forest),
    (ModelKind::Svr, svr),
    (ModelKind::NuSvr, nu_svr),
    (ModelKind::Knn, knn),
    (ModelKind::Huber, huber),
    (ModelKind::Ransac, ransac),
    (ModelKind::TheilSen, theilsen),
];

/// Build an unfitted model for `kind`. `seed` drives every random choice the
/// model makes.
pub fn build(kind: ModelKind, seed: u64) -> Result<Box<dyn Regressor>> {
    let (_, constructor) = REGISTRY
        .iter()
        .find(|(k, _)| *k == kind)
        .ok_or_else(|| EstimatorError::UnknownModel(kind.to_string()))?;
    constructor(seed)
}

fn linear(_: u64) -> Result<Box<dyn Regressor>> {
    Ok(Box::new(LinearRegression::new()))
}

fn ridge(_: u64) -> Result<Box<dyn Regressor>> {
    Ok(Box::new(RidgeCv::new(linspace(0.01, 10.0, 20))?))
}

fn lasso(_: u64) -> Result<Box<dyn Regressor>> {
    let model = ElasticNetCv::lasso(AlphaGrid::Fixed(logspace(-4.0, 1.0, 30)))?
        .with_folds(SEARCH_FOLDS)
        .with_max_iter(5000);
    Ok(Box::new(model))
}

fn elastic(_: u64) -> Result<Box<dyn Regressor>> {
    let model = ElasticNetCv::new(
        AlphaGrid::Fixed(logspace(-4.0, 1.0, 20)),
        linspace(0.1, 1.0, 10),
    )?
    .with_folds(SEARCH_FOLDS)
    .with_max_iter(5000);
    Ok(Box::new(model))
}

fn bayesian(_: u64) -> Result<Box<dyn Regressor>> {
    Ok(Box::new(BayesianRidge::new()))
}

fn svr_grid() -> Result<Vec<Box<dyn Regressor>>> {
    let mut grid: Vec<Box<dyn Regressor>> = Vec::new();
    for c in SVR_C {
        for gamma in SVR_GAMMA {
            for kernel in SVR_KERNEL {
                grid.push(Box::new(Svr::new(c, kernel, gamma)?));
            }
        }
    }
    Ok(grid)
}

fn svr(_: u64) -> Result<Box<dyn Regressor>> {
    let search = GridSearchCv::new("svr", svr_grid()?, SEARCH_FOLDS, Scoring::R2)?;
    Ok(Box::new(search))
}

fn nu_svr(_: u64) -> Result<Box<dyn Regressor>> {
    let mut grid: Vec<Box<dyn Regressor>> = Vec::new();
    for nu in NU {
        for c in SVR_C {
            for gamma in SVR_GAMMA {
                for kernel in SVR_KERNEL {
                    grid.push(Box::new(NuSvr::new(nu, c, kernel, gamma)?));
                }
            }
        }
    }
    let search = GridSearchCv::new("nu_svr", grid, SEARCH_FOLDS, Scoring::R2)?;
    Ok(Box::new(search))
}

fn tree_params(seed: u64) -> Vec<TreeParams> {
    let mut params = Vec::new();
    for depth in TREE_DEPTH {
        for split in TREE_SPLIT {
            for leaf in TREE_LEAF {
                params.push(
                    TreeParams::default()
                        .with_max_depth(Some(depth))
                        .with_min_samples_split(split)
                        .with_min_samples_leaf(leaf)
                        .with_seed(seed),
                );
            }
        }
    }
    params
}

fn tree_search(name: &str, splitter: Splitter, seed: u64) -> Result<Box<dyn Regressor>> {
    let grid = tree_params(seed)
        .into_iter()
        .map(|p| {
            DecisionTreeRegressor::new(p.with_splitter(splitter))
                .map(|t| Box::new(t) as Box<dyn Regressor>)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(GridSearchCv::new(name, grid, SEARCH_FOLDS, Scoring::R2)?))
}

fn decision_tree(seed: u64) -> Result<Box<dyn Regressor>> {
    tree_search("decision_tree", Splitter::Best, seed)
}

fn extra_tree(seed: u64) -> Result<Box<dyn Regressor>> {
    tree_search("extra_tree", Splitter::Random, seed)
}

fn random_forest(seed: u64) -> Result<Box<dyn Regressor>> {
    let mut grid: Vec<Box<dyn Regressor>> = Vec::new();
    for size in FOREST_SIZE {
        for params in tree_params(seed) {
            for features in FOREST_FEATURES {
                grid.push(Box::new(RandomForestRegressor::new(
                    size,
                    params.with_max_features(features),
                    seed,
                )?));
            }
        }
    }
    let search = RandomizedSearchCv::new(
        "random_forest",
        grid,
        FOREST_SAMPLES,
        SEARCH_FOLDS,
        Scoring::R2,
        seed,
    )?;
    Ok(Box::new(search))
}

fn knn(_: u64) -> Result<Box<dyn Regressor>> {
    let mut grid: Vec<Box<dyn Regressor>> = Vec::new();
    for k in KNN_K {
        for weights in KNN_WEIGHTS {
            for p in KNN_P {
                grid.push(Box::new(KNeighborsRegressor::new(k, weights, p)?));
            }
        }
    }
    Ok(Box::new(GridSearchCv::new("knn", grid, SEARCH_FOLDS, Scoring::R2)?))
}

fn huber(_: u64) -> Result<Box<dyn Regressor>> {
    Ok(Box::new(HuberRegressor::new(1.35, 1000)?))
}

fn ransac(seed: u64) -> Result<Box<dyn Regressor>> {
    Ok(Box::new(RansacRegressor::new(100, seed)))
}

fn theilsen(seed: u64) -> Result<Box<dyn Regressor>> {
    Ok(Box::new(TheilSenRegressor::new(10_000, seed)))
}
