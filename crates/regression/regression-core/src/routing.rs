//! Per-row routing of query points to ensemble members.

use estimator_core::linalg;
use estimator_spi::Matrix;
use regression_api::RoutingStrategy;
use regression_spi::{FeatureStats, RoutingLabel, RowRouter};
use tracing::debug;

/// Quartiles (linear interpolation) and population standard deviation of
/// every column of `x`.
pub fn feature_stats(x: &Matrix) -> Vec<FeatureStats> {
    (0..x.cols())
        .map(|j| {
            let column = linalg::sorted(&x.column(j));
            FeatureStats {
                q1: linalg::quantile_sorted(&column, 0.25),
                q2: linalg::quantile_sorted(&column, 0.5),
                q3: linalg::quantile_sorted(&column, 0.75),
                std: linalg::std_dev(&column),
            }
        })
        .collect()
}

/// How a row's features sit relative to the training quartiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandCounts {
    pub near_median: usize,
    pub near_quartile: usize,
    pub far: usize,
}

impl BandCounts {
    /// Count features within half a standard deviation of the median, else
    /// of the first or third quartile, else neither.
    pub fn of(stats: &[FeatureStats], row: &[f64]) -> Self {
        let mut counts = Self::default();
        for (s, &value) in stats.iter().zip(row) {
            let thresh = 0.5 * s.std;
            if (value - s.q2).abs() <= thresh {
                counts.near_median += 1;
            } else if (value - s.q1).abs() <= thresh || (value - s.q3).abs() <= thresh {
                counts.near_quartile += 1;
            } else {
                counts.far += 1;
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.near_median + self.near_quartile + self.far
    }
}

/// Default router: counts band membership and applies fixed rules by
/// feature count.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuartileBandRouter;

impl QuartileBandRouter {
    pub fn label(counts: BandCounts) -> RoutingLabel {
        let BandCounts {
            near_median: m,
            near_quartile: q,
            far: f,
        } = counts;
        match counts.total() {
            1 => {
                if m == 1 {
                    RoutingLabel::Stacking
                } else if q == 1 {
                    RoutingLabel::Voting
                } else {
                    RoutingLabel::Elastic
                }
            }
            2 => match (m, q, f) {
                (2, 0, 0) | (1, 1, 0) => RoutingLabel::Stacking,
                (0, 2, 0) | (1, 0, 1) => RoutingLabel::Voting,
                _ => RoutingLabel::Elastic,
            },
            k => {
                let third = k / 3;
                let two_thirds = 2 * k / 3;
                if m >= two_thirds {
                    RoutingLabel::Stacking
                } else if m >= third && q >= third {
                    RoutingLabel::Stacking
                } else if q >= two_thirds {
                    RoutingLabel::Voting
                } else if m >= third && f >= third {
                    RoutingLabel::Voting
                } else if q >= third && f >= third {
                    RoutingLabel::DecisionTree
                } else if f >= two_thirds {
                    RoutingLabel::Elastic
                } else if m >= q && m >= f {
                    RoutingLabel::Stacking
                } else if q >= m && q >= f {
                    RoutingLabel::Voting
                } else {
                    RoutingLabel::Elastic
                }
            }
        }
    }
}

impl RowRouter for QuartileBandRouter {
    fn name(&self) -> &str {
        "quartile_bands"
    }

    fn route(&self, stats: &[FeatureStats], row: &[f64]) -> RoutingLabel {
        Self::label(BandCounts::of(stats, row))
    }
}

/// Alternate router: votes per feature on the IQR-normalised distance from
/// the median.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedIqrRouter;

impl NormalizedIqrRouter {
    const IQR_EPS: f64 = 1e-8;
    const NEAR: f64 = 0.25;
    const MID: f64 = 0.75;
}

impl RowRouter for NormalizedIqrRouter {
    fn name(&self) -> &str {
        "normalized_iqr"
    }

    fn route(&self, stats: &[FeatureStats], row: &[f64]) -> RoutingLabel {
        let (mut stacking, mut voting, mut elastic) = (0usize, 0usize, 0usize);
        for (s, &value) in stats.iter().zip(row) {
            let d = (value - s.q2).abs() / (s.iqr() + Self::IQR_EPS);
            if d <= Self::NEAR {
                stacking += 1;
            } else if d <= Self::MID {
                voting += 1;
            } else {
                elastic += 1;
            }
        }

        if stacking == 0 && voting > 0 && elastic > 0 {
            return RoutingLabel::DecisionTree;
        }
        if stacking >= voting && stacking >= elastic {
            RoutingLabel::Stacking
        } else if voting >= elastic {
            RoutingLabel::Voting
        } else {
            RoutingLabel::Elastic
        }
    }
}

pub fn router_for(strategy: RoutingStrategy) -> Box<dyn RowRouter> {
    match strategy {
        RoutingStrategy::QuartileBands => Box::new(QuartileBandRouter),
        RoutingStrategy::NormalizedIqr => Box::new(NormalizedIqrRouter),
    }
}

/// Labels every query row using statistics of the training features.
pub struct RoutingClassifier {
    router: Box<dyn RowRouter>,
    stats: Vec<FeatureStats>,
}

impl RoutingClassifier {
    pub fn new(router: Box<dyn RowRouter>, stats: Vec<FeatureStats>) -> Self {
        Self { router, stats }
    }

    /// Compute statistics from `x` and route with `strategy`.
    pub fn fit(strategy: RoutingStrategy, x: &Matrix) -> Self {
        Self::new(router_for(strategy), feature_stats(x))
    }

    pub fn stats(&self) -> &[FeatureStats] {
        &self.stats
    }

    pub fn router_name(&self) -> &str {
        self.router.name()
    }

    pub fn classify(&self, x0: &Matrix) -> Vec<RoutingLabel> {
        let labels: Vec<RoutingLabel> = x0
            .iter_rows()
            .map(|row| self.router.route(&self.stats, row))
            .collect();
        debug!(
            router = self.router.name(),
            labels = ?labels,
            "routed query rows"
        );
        labels
    }
}

impl std::fmt::Debug for RoutingClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingClassifier")
            .field("router", &self.router.name())
            .field("features", &self.stats.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(near_median: usize, near_quartile: usize, far: usize) -> BandCounts {
        BandCounts {
            near_median,
            near_quartile,
            far,
        }
    }

    fn one_to_nine() -> Matrix {
        Matrix::column_vector(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
    }

    #[test]
    fn test_feature_stats() {
        let stats = feature_stats(&one_to_nine());
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].q1, 3.0);
        assert_eq!(stats[0].q2, 5.0);
        assert_eq!(stats[0].q3, 7.0);
        let expected_std = (60.0f64 / 9.0).sqrt();
        assert!((stats[0].std - expected_std).abs() < 1e-12);
    }

    #[test]
    fn test_single_feature_routes() {
        // std of 1..=9 is about 2.58, so the band half-width is about 1.29
        let classifier = RoutingClassifier::fit(RoutingStrategy::QuartileBands, &one_to_nine());
        let x0 = Matrix::column_vector(&[5.5, 3.2, 100.0]);
        assert_eq!(
            classifier.classify(&x0),
            vec![
                RoutingLabel::Stacking,
                RoutingLabel::Voting,
                RoutingLabel::Elastic
            ]
        );
    }

    #[test]
    fn test_two_feature_table() {
        assert_eq!(QuartileBandRouter::label(counts(2, 0, 0)), RoutingLabel::Stacking);
        assert_eq!(QuartileBandRouter::label(counts(1, 1, 0)), RoutingLabel::Stacking);
        assert_eq!(QuartileBandRouter::label(counts(0, 2, 0)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(1, 0, 1)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(0, 1, 1)), RoutingLabel::Elastic);
        assert_eq!(QuartileBandRouter::label(counts(0, 0, 2)), RoutingLabel::Elastic);
    }

    #[test]
    fn test_many_feature_rules() {
        // k = 3: third = 1, two_thirds = 2
        assert_eq!(QuartileBandRouter::label(counts(2, 0, 1)), RoutingLabel::Stacking);
        assert_eq!(QuartileBandRouter::label(counts(1, 1, 1)), RoutingLabel::Stacking);
        assert_eq!(QuartileBandRouter::label(counts(0, 2, 1)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(0, 1, 2)), RoutingLabel::DecisionTree);
        assert_eq!(QuartileBandRouter::label(counts(0, 0, 3)), RoutingLabel::Elastic);
        // k = 4: third = 1, two_thirds = 2
        assert_eq!(QuartileBandRouter::label(counts(0, 1, 3)), RoutingLabel::DecisionTree);
        assert_eq!(QuartileBandRouter::label(counts(1, 0, 3)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(0, 2, 2)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(0, 0, 4)), RoutingLabel::Elastic);
    }

    #[test]
    fn test_mixed_rules_before_plurality() {
        // k = 7: third = 2, two_thirds = 4
        assert_eq!(QuartileBandRouter::label(counts(3, 1, 3)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(1, 3, 3)), RoutingLabel::DecisionTree);
    }

    #[test]
    fn test_plurality_fallback() {
        // k = 9: third = 3, two_thirds = 6; no threshold rule applies
        assert_eq!(QuartileBandRouter::label(counts(5, 2, 2)), RoutingLabel::Stacking);
        assert_eq!(QuartileBandRouter::label(counts(2, 5, 2)), RoutingLabel::Voting);
        assert_eq!(QuartileBandRouter::label(counts(2, 2, 5)), RoutingLabel::Elastic);
    }

    #[test]
    fn test_normalized_iqr_router() {
        // q1 = 3, q2 = 5, q3 = 7, iqr = 4
        let stats = feature_stats(&one_to_nine());
        let router = NormalizedIqrRouter;
        assert_eq!(router.route(&stats, &[5.5]), RoutingLabel::Stacking);
        assert_eq!(router.route(&stats, &[7.0]), RoutingLabel::Voting);
        assert_eq!(router.route(&stats, &[20.0]), RoutingLabel::Elastic);

        let two = vec![stats[0], stats[0]];
        assert_eq!(router.route(&two, &[7.0, 20.0]), RoutingLabel::DecisionTree);
        assert_eq!(router.route(&two, &[5.0, 20.0]), RoutingLabel::Stacking);
        assert_eq!(router.route(&two, &[7.0, 7.0]), RoutingLabel::Voting);
    }

    #[test]
    fn test_router_for_names() {
        assert_eq!(router_for(RoutingStrategy::QuartileBands).name(), "quartile_bands");
        assert_eq!(router_for(RoutingStrategy::NormalizedIqr).name(), "normalized_iqr");
    }
}
