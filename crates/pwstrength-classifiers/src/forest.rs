//! Random forest classifier
//!
//! Bagged CART trees grown on Gini impurity. Each tree sees a bootstrap
//! sample of the training rows and a random subset of the features at every
//! split. Class probabilities are the mean of the leaf class distributions.

use crate::dataset::Dataset;
use pwstrength_core::{Error, ForestConfig, Result, NUM_CLASSES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Class distribution over the strength classes
pub type Probabilities = [f64; NUM_CLASSES];

/// Ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestConfig,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on `dataset`
    pub fn fit(dataset: &Dataset, params: &ForestConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(Error::model("cannot fit on an empty dataset"));
        }
        if dataset.n_features() == 0 {
            return Err(Error::model("cannot fit without feature columns"));
        }
        if params.n_estimators == 0 {
            return Err(Error::config("n_estimators must be at least 1"));
        }

        let start = Instant::now();
        let n_rows = dataset.len();
        let max_features = params.max_features.resolve(dataset.n_features());
        let mut seeder = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeder.gen());
                let sample: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };

                let mut grower = TreeGrower {
                    rows: dataset.rows(),
                    labels: dataset.labels(),
                    n_features: dataset.n_features(),
                    max_depth: params.max_depth,
                    min_samples_split: params.min_samples_split.max(2),
                    max_features,
                    rng,
                };
                DecisionTree {
                    root: grower.grow(sample, 0),
                }
            })
            .collect::<Vec<_>>();

        let forest = Self {
            params: params.clone(),
            n_features: dataset.n_features(),
            trees,
        };

        info!(
            "Fitted random forest: {} trees, {} features, {} rows in {}ms",
            forest.trees.len(),
            forest.n_features,
            n_rows,
            start.elapsed().as_millis()
        );
        debug!(
            "Mean tree depth {:.1}, mean leaves {:.1}",
            forest.trees.iter().map(|t| t.depth() as f64).sum::<f64>() / forest.trees.len() as f64,
            forest.trees.iter().map(|t| t.leaf_count() as f64).sum::<f64>() / forest.trees.len() as f64
        );

        Ok(forest)
    }

    /// Mean class distribution across all trees
    pub fn predict_proba(&self, row: &[f64]) -> Result<Probabilities> {
        self.check_width(row)?;

        let mut sum = [0.0; NUM_CLASSES];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(sum.map(|s| s / n))
    }

    /// Most probable class id; ties go to the lower id
    pub fn predict(&self, row: &[f64]) -> Result<usize> {
        Ok(argmax(&self.predict_proba(row)?))
    }

    /// Predict every row of a dataset
    pub fn predict_batch(&self, dataset: &Dataset) -> Result<Vec<usize>> {
        dataset.rows().iter().map(|row| self.predict(row)).collect()
    }

    /// Number of input columns the forest was trained on
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Check a deserialized forest before it is used for inference
    ///
    /// Every split must index an existing feature with a finite threshold, and
    /// every leaf must hold a finite, non-negative distribution summing to 1.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model("forest has no trees"));
        }
        if self.n_features == 0 {
            return Err(Error::model("forest has no input features"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            validate_node(&tree.root, self.n_features)
                .map_err(|msg| Error::model(format!("tree {}: {}", i, msg)))?;
        }
        Ok(())
    }

    fn check_width(&self, row: &[f64]) -> Result<()> {
        if row.len() != self.n_features {
            return Err(Error::feature_mismatch(format!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        Ok(())
    }
}

/// Index of the largest value, preferring the first on ties
pub fn argmax(probabilities: &Probabilities) -> usize {
    probabilities
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
        .0
}

/// Single classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Node {
    Leaf {
        distribution: Probabilities,
    },
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl DecisionTree {
    /// Leaf class distribution reached by `row`
    pub fn predict_proba(&self, row: &[f64]) -> Probabilities {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { distribution } => return *distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }
}

fn validate_node(node: &Node, n_features: usize) -> std::result::Result<(), String> {
    match node {
        Node::Leaf { distribution } => {
            if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(format!("invalid leaf distribution {:?}", distribution));
            }
            let total: f64 = distribution.iter().sum();
            if (total - 1.0).abs() > 1e-6 {
                return Err(format!("leaf distribution sums to {}", total));
            }
            Ok(())
        }
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if *feature >= n_features {
                return Err(format!(
                    "split on feature {} but the forest has {} features",
                    feature, n_features
                ));
            }
            if !threshold.is_finite() {
                return Err(format!("non-finite threshold on feature {}", feature));
            }
            validate_node(left, n_features)?;
            validate_node(right, n_features)
        }
    }
}

/// Candidate split found while scanning one feature
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Recursive CART builder for a single tree
struct TreeGrower<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [usize],
    n_features: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: usize,
    rng: StdRng,
}

impl TreeGrower<'_> {
    fn grow(&mut self, sample: Vec<usize>, depth: usize) -> Node {
        let counts = self.class_counts(&sample);
        let at_max_depth = self.max_depth.is_some_and(|max| depth >= max);
        let pure = counts.iter().filter(|c| **c > 0).count() <= 1;

        if pure || at_max_depth || sample.len() < self.min_samples_split {
            return leaf(&counts);
        }

        let Some(split) = self.best_split(&sample) else {
            return leaf(&counts);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&i| self.rows[i][split.feature] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left, depth + 1)),
            right: Box::new(self.grow(right, depth + 1)),
        }
    }

    /// Lowest weighted Gini split over a random feature subset
    ///
    /// Constant features do not count towards `max_features`, and the search
    /// continues past `max_features` until at least one valid split exists.
    fn best_split(&mut self, sample: &[usize]) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;
        for feature in features {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            let Some(candidate) = self.scan_feature(sample, feature) else {
                continue;
            };
            visited += 1;
            if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Best threshold on one feature, or `None` if the feature is constant here
    fn scan_feature(&self, sample: &[usize], feature: usize) -> Option<SplitCandidate> {
        let mut values: Vec<(f64, usize)> = sample
            .iter()
            .map(|&i| (self.rows[i][feature], self.labels[i]))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = values.len();
        let mut right = [0usize; NUM_CLASSES];
        for (_, label) in &values {
            right[*label] += 1;
        }
        let mut left = [0usize; NUM_CLASSES];

        let mut best: Option<SplitCandidate> = None;
        for i in 1..n {
            let label = values[i - 1].1;
            left[label] += 1;
            right[label] -= 1;

            let (lo, hi) = (values[i - 1].0, values[i].0);
            if lo >= hi {
                continue;
            }

            let impurity = (i as f64 * gini(&left, i)
                + (n - i) as f64 * gini(&right, n - i))
                / n as f64;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid >= hi { lo } else { mid };
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }

    fn class_counts(&self, sample: &[usize]) -> [usize; NUM_CLASSES] {
        let mut counts = [0; NUM_CLASSES];
        for &i in sample {
            counts[self.labels[i]] += 1;
        }
        counts
    }
}

fn leaf(counts: &[usize; NUM_CLASSES]) -> Node {
    let total: usize = counts.iter().sum();
    let distribution = if total == 0 {
        [1.0 / NUM_CLASSES as f64; NUM_CLASSES]
    } else {
        counts.map(|c| c as f64 / total as f64)
    };
    Node::Leaf { distribution }
}

fn gini(counts: &[usize; NUM_CLASSES], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}
