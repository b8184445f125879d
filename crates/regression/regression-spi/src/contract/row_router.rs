//! Per-row ensemble dispatch.

use crate::model::{FeatureStats, RoutingLabel};

/// Assigns a query row to an ensemble member given the training feature
/// distribution. `stats` and `row` have one entry per feature.
pub trait RowRouter: Send + Sync {
    fn name(&self) -> &str;

    fn route(&self, stats: &[FeatureStats], row: &[f64]) -> RoutingLabel;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AboveMedian;

    impl RowRouter for AboveMedian {
        fn name(&self) -> &str {
            "above_median"
        }

        fn route(&self, stats: &[FeatureStats], row: &[f64]) -> RoutingLabel {
            if row.iter().zip(stats).all(|(v, s)| *v > s.q2) {
                RoutingLabel::Voting
            } else {
                RoutingLabel::Elastic
            }
        }
    }

    #[test]
    fn test_router_is_object_safe() {
        let stats = [FeatureStats {
            q1: 1.0,
            q2: 2.0,
            q3: 3.0,
            std: 1.0,
        }];
        let router: Box<dyn RowRouter> = Box::new(AboveMedian);
        assert_eq!(router.route(&stats, &[5.0]), RoutingLabel::Voting);
        assert_eq!(router.route(&stats, &[0.0]), RoutingLabel::Elastic);
        assert_eq!(stats[0].iqr(), 2.0);
    }
}
