use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use estimator_spi::{EstimatorError, Matrix, Regressor, Result};

/// Number of features examined at each split.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Count(k) => *k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Threshold strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Splitter {
    /// Best midpoint over all distinct values
    #[default]
    Best,
    /// One uniformly drawn threshold per feature (extremely randomised trees)
    Random,
}

/// Growth limits shared by trees and tree ensembles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub splitter: Splitter,
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            splitter: Splitter::Best,
            seed: 0,
        }
    }
}

impl TreeParams {
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_splitter(mut self, splitter: Splitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(EstimatorError::InvalidParameter {
                name: "min_samples_split".to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(EstimatorError::InvalidParameter {
                name: "min_samples_leaf".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(EstimatorError::InvalidParameter {
                name: "max_depth".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct Candidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Regression tree minimising squared error.
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    params: TreeParams,
    nodes: Vec<Node>,
    n_features: usize,
}

impl DecisionTreeRegressor {
    pub fn new(params: TreeParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            nodes: Vec::new(),
            n_features: 0,
        })
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit on a multiset of row indices (bootstrap samples repeat rows).
    pub(crate) fn fit_rows(&mut self, x: &Matrix, y: &[f64], rows: &[usize]) -> Result<()> {
        if rows.is_empty() {
            return Err(EstimatorError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.nodes.clear();
        self.n_features = x.cols();
        let mut rows = rows.to_vec();
        self.grow(x, y, &mut rows, 0, &mut rng);
        Ok(())
    }

    fn grow(&mut self, x: &Matrix, y: &[f64], rows: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let n = rows.len();
        let sum: f64 = rows.iter().map(|&i| y[i]).sum();
        let value = sum / n as f64;
        let sse: f64 = rows.iter().map(|&i| (y[i] - value).powi(2)).sum();

        let at = self.nodes.len();
        self.nodes.push(Node::Leaf { value });

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached || n < self.params.min_samples_split || n < 2 * self.params.min_samples_leaf || sse <= 1e-12 {
            return at;
        }

        let Some(split) = self.find_split(x, y, rows, sse, rng) else {
            return at;
        };

        // partition in place: left rows first
        let mut boundary = 0;
        for i in 0..n {
            if x.get(rows[i], split.feature) <= split.threshold {
                rows.swap(i, boundary);
                boundary += 1;
            }
        }
        let (left_rows, right_rows) = rows.split_at_mut(boundary);
        let left = self.grow(x, y, left_rows, depth + 1, rng);
        let right = self.grow(x, y, right_rows, depth + 1, rng);
        self.nodes[at] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        at
    }

    fn find_split(&self, x: &Matrix, y: &[f64], rows: &[usize], sse: f64, rng: &mut StdRng) -> Option<Candidate> {
        let p = x.cols();
        let mut features: Vec<usize> = (0..p).collect();
        let k = self.params.max_features.resolve(p);
        if k < p {
            features.shuffle(rng);
            features.truncate(k);
        }

        let mut best: Option<Candidate> = None;
        for feature in features {
            let found = match self.params.splitter {
                Splitter::Best => self.best_threshold(x, y, rows, feature),
                Splitter::Random => self.random_threshold(x, y, rows, feature, rng),
            };
            if let Some(candidate) = found {
                if best.as_ref().map_or(true, |b| candidate.score < b.score) {
                    best = Some(candidate);
                }
            }
        }
        best.filter(|b| b.score < sse - 1e-12)
    }

    fn best_threshold(&self, x: &Matrix, y: &[f64], rows: &[usize], feature: usize) -> Option<Candidate> {
        let leaf = self.params.min_samples_leaf;
        let mut ordered: Vec<(f64, f64)> = rows.iter().map(|&i| (x.get(i, feature), y[i])).collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = ordered.len();
        let total: f64 = ordered.iter().map(|p| p.1).sum();
        let total_sq: f64 = ordered.iter().map(|p| p.1 * p.1).sum();
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<Candidate> = None;

        for i in 0..n - 1 {
            left_sum += ordered[i].1;
            left_sq += ordered[i].1 * ordered[i].1;
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < leaf || n_right < leaf || ordered[i].0 >= ordered[i + 1].0 {
                continue;
            }
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let score = (left_sq - left_sum * left_sum / n_left as f64)
                + (right_sq - right_sum * right_sum / n_right as f64);
            if best.as_ref().map_or(true, |b| score < b.score) {
                best = Some(Candidate {
                    feature,
                    threshold: (ordered[i].0 + ordered[i + 1].0) / 2.0,
                    score,
                });
            }
        }
        best
    }

    fn random_threshold(
        &self,
        x: &Matrix,
        y: &[f64],
        rows: &[usize],
        feature: usize,
        rng: &mut StdRng,
    ) -> Option<Candidate> {
        let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            let v = x.get(i, feature);
            (lo.min(v), hi.max(v))
        });
        if !(hi > lo) {
            return None;
        }
        let threshold = rng.gen_range(lo..hi);
        let (mut n_l, mut s_l, mut q_l, mut n_r, mut s_r, mut q_r) = (0usize, 0.0, 0.0, 0usize, 0.0, 0.0);
        for &i in rows {
            let v = y[i];
            if x.get(i, feature) <= threshold {
                n_l += 1;
                s_l += v;
                q_l += v * v;
            } else {
                n_r += 1;
                s_r += v;
                q_r += v * v;
            }
        }
        let leaf = self.params.min_samples_leaf;
        if n_l < leaf || n_r < leaf || n_l == 0 || n_r == 0 {
            return None;
        }
        let score = (q_l - s_l * s_l / n_l as f64) + (q_r - s_r * s_r / n_r as f64);
        Some(Candidate {
            feature,
            threshold,
            score,
        })
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    fn name(&self) -> &str {
        match self.params.splitter {
            Splitter::Best => "decision_tree",
            Splitter::Random => "extra_tree",
        }
    }

    fn fit(&mut self, x: &Matrix, y: &[f64]) -> Result<()> {
        x.ensure_fit_input(y, 1)?;
        let rows: Vec<usize> = (0..y.len()).collect();
        self.fit_rows(x, y, &rows)
    }

    fn predict(&self, x: &Matrix) -> Result<Vec<f64>> {
        if self.nodes.is_empty() {
            return Err(EstimatorError::NotFitted);
        }
        x.ensure_cols(self.n_features)?;
        Ok(x.iter_rows().map(|row| self.predict_row(row)).collect())
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn clone_box(&self) -> Box<dyn Regressor> {
        Box::new(self.clone())
    }
}
