//! Ensemble mode: four fitted members, one chosen per query row.

use estimator_core::linear::{AlphaGrid, ElasticNet, ElasticNetCv, LinearRegression};
use estimator_core::prelude::{
    DecisionTreeRegressor, GradientBoostingRegressor, StackingRegressor, TreeParams,
    VotingRegressor,
};
use estimator_spi::{EstimatorError, Matrix, Regressor};
use regression_spi::{RegressionError, Result, RoutingLabel};
use tracing::debug;

use crate::split::TrainTestSplit;

/// Name carried by ensemble-mode records.
pub const ENSEMBLE_RECORD_NAME: &str = "Stacking + Voting + Elastic + DecisionTree";

/// Feature count above which the decision tree joins the meta-models.
const MAX_LINEAR_ONLY_FEATURES: usize = 3;

/// Row count from which the elastic member tunes its penalty.
const ELASTIC_CV_MIN_ROWS: usize = 100;

/// Out-of-fold splits for the stacking meta-model, `None` for in-sample
/// stacking.
pub fn stacking_folds(n_samples: usize) -> Option<usize> {
    match n_samples {
        0..=4 => None,
        5..=49 => Some(2),
        n => Some(n.ilog2() as usize),
    }
}

fn elastic_member(n_samples: usize) -> std::result::Result<Box<dyn Regressor>, EstimatorError> {
    if n_samples < ELASTIC_CV_MIN_ROWS {
        Ok(Box::new(ElasticNet::new(1.0, 0.5)?))
    } else {
        Ok(Box::new(
            ElasticNetCv::new(AlphaGrid::default(), vec![0.5])?.with_folds(5),
        ))
    }
}

fn tree_member(seed: u64) -> std::result::Result<Box<dyn Regressor>, EstimatorError> {
    let params = TreeParams::default().with_seed(seed);
    Ok(Box::new(DecisionTreeRegressor::new(params)?))
}

/// The stacking and voting meta-models plus their standalone elastic-net
/// and decision-tree members, all fitted on the training partition.
pub struct FittedEnsemble {
    stacking: Box<dyn Regressor>,
    voting: Box<dyn Regressor>,
    elastic: Box<dyn Regressor>,
    decision_tree: Box<dyn Regressor>,
}

impl FittedEnsemble {
    /// Build the members for a dataset of `n_samples` rows and fit them on
    /// the training partition of `split`.
    pub fn fit(n_samples: usize, split: &TrainTestSplit, seed: u64) -> Result<Self> {
        let n_features = split.x_train.cols();
        let folds = stacking_folds(n_samples);
        let build = |member: &str, e: EstimatorError| RegressionError::candidate(member, e);

        let elastic = elastic_member(n_samples).map_err(|e| build("elastic", e))?;
        let decision_tree = tree_member(seed).map_err(|e| build("decision_tree", e))?;

        let (stacking, voting): (Box<dyn Regressor>, Box<dyn Regressor>) =
            if n_features <= MAX_LINEAR_ONLY_FEATURES {
                let stacking = StackingRegressor::new(
                    vec![elastic.clone_box()],
                    Box::new(LinearRegression::new()),
                    folds,
                )
                .map_err(|e| build("stacking", e))?;
                let voting = VotingRegressor::new(vec![elastic.clone_box()])
                    .map_err(|e| build("voting", e))?;
                (Box::new(stacking), Box::new(voting))
            } else {
                let boosting = GradientBoostingRegressor::new(100, 0.1, 3, seed)
                    .map_err(|e| build("stacking", e))?;
                let stacking = StackingRegressor::new(
                    vec![elastic.clone_box(), decision_tree.clone_box()],
                    Box::new(boosting),
                    folds,
                )
                .map_err(|e| build("stacking", e))?;
                let voting =
                    VotingRegressor::new(vec![elastic.clone_box(), decision_tree.clone_box()])
                        .map_err(|e| build("voting", e))?;
                (Box::new(stacking), Box::new(voting))
            };

        let mut ensemble = Self {
            stacking,
            voting,
            elastic,
            decision_tree,
        };
        for label in RoutingLabel::ALL {
            ensemble
                .member_mut(label)
                .fit(&split.x_train, &split.y_train)
                .map_err(|e| build(label.as_str(), e))?;
        }
        debug!(
            n_samples,
            n_features,
            folds = ?folds,
            "fitted ensemble members"
        );
        Ok(ensemble)
    }

    /// The member a routing label dispatches to.
    pub fn member(&self, label: RoutingLabel) -> &dyn Regressor {
        match label {
            RoutingLabel::Stacking => self.stacking.as_ref(),
            RoutingLabel::Voting => self.voting.as_ref(),
            RoutingLabel::Elastic => self.elastic.as_ref(),
            RoutingLabel::DecisionTree => self.decision_tree.as_ref(),
        }
    }

    fn member_mut(&mut self, label: RoutingLabel) -> &mut Box<dyn Regressor> {
        match label {
            RoutingLabel::Stacking => &mut self.stacking,
            RoutingLabel::Voting => &mut self.voting,
            RoutingLabel::Elastic => &mut self.elastic,
            RoutingLabel::DecisionTree => &mut self.decision_tree,
        }
    }

    /// Train and test metrics come from the stacking meta-model.
    pub fn predict_stacking(&self, x: &Matrix) -> Result<Vec<f64>> {
        self.stacking
            .predict(x)
            .map_err(|e| RegressionError::candidate(RoutingLabel::Stacking.as_str(), e))
    }

    /// Predict a single query row with the member chosen for it.
    pub fn predict_member(&self, label: RoutingLabel, row: &[f64]) -> Result<f64> {
        let predicted = self
            .member(label)
            .predict(&Matrix::row_vector(row))
            .map_err(|e| RegressionError::candidate(label.as_str(), e))?;
        predicted
            .first()
            .copied()
            .ok_or_else(|| RegressionError::unreachable("single-row prediction returned no value"))
    }
}

impl std::fmt::Debug for FittedEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FittedEnsemble")
            .field("stacking", &self.stacking.name())
            .field("voting", &self.voting.name())
            .field("elastic", &self.elastic.name())
            .field("decision_tree", &self.decision_tree.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::AdaptiveSplitter;

    fn dataset(n: usize, k: usize) -> (Matrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..k).map(|j| ((i * (j + 3)) % 17) as f64 + i as f64).collect())
            .collect();
        let y = rows.iter().map(|r| r.iter().sum::<f64>() * 2.0 + 1.0).collect();
        (Matrix::from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn test_stacking_folds() {
        assert_eq!(stacking_folds(1), None);
        assert_eq!(stacking_folds(4), None);
        assert_eq!(stacking_folds(5), Some(2));
        assert_eq!(stacking_folds(49), Some(2));
        assert_eq!(stacking_folds(50), Some(5));
        assert_eq!(stacking_folds(64), Some(6));
        assert_eq!(stacking_folds(1000), Some(9));
    }

    #[test]
    fn test_fit_small_linear_only_ensemble() {
        let (x, y) = dataset(8, 2);
        let split = AdaptiveSplitter::new(Some(1)).split(&x, &y).unwrap();
        let ensemble = FittedEnsemble::fit(8, &split, 42).unwrap();
        for label in RoutingLabel::ALL {
            assert!(ensemble.member(label).is_fitted());
        }
        assert_eq!(ensemble.member(RoutingLabel::Stacking).name(), "stacking");
        assert_eq!(ensemble.member(RoutingLabel::Voting).name(), "voting");
        assert_eq!(ensemble.member(RoutingLabel::DecisionTree).name(), "decision_tree");
    }

    #[test]
    fn test_tree_member_matches_direct_fit() {
        let (x, y) = dataset(30, 4);
        let split = AdaptiveSplitter::new(Some(3)).split(&x, &y).unwrap();
        let ensemble = FittedEnsemble::fit(30, &split, 42).unwrap();

        let mut tree = tree_member(42).unwrap();
        tree.fit(&split.x_train, &split.y_train).unwrap();
        let row = x.row(0);
        let direct = tree.predict(&Matrix::row_vector(row)).unwrap()[0];
        let routed = ensemble.predict_member(RoutingLabel::DecisionTree, row).unwrap();
        assert_eq!(direct, routed);
    }

    #[test]
    fn test_predict_member_rejects_wrong_width() {
        let (x, y) = dataset(12, 2);
        let split = AdaptiveSplitter::new(Some(5)).split(&x, &y).unwrap();
        let ensemble = FittedEnsemble::fit(12, &split, 42).unwrap();
        let err = ensemble
            .predict_member(RoutingLabel::Elastic, &[1.0, 2.0, 3.0])
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
