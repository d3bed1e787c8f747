use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 4;

const MAX_DEPTH: usize = 10;
const MIN_SAMPLES_SPLIT: usize = 4;
/// Candidate thresholds evaluated per feature when searching for a split.
const SPLIT_CANDIDATES: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A single variance-minimizing regression tree with axis-aligned splits and
/// mean-valued leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit on the samples selected by `indices` (indices may repeat — the
    /// forest passes bootstrap resamples).
    pub fn fit(xs: &[[f64; FEATURE_COUNT]], ys: &[f64], indices: &[usize]) -> Self {
        RegressionTree { root: build(xs, ys, indices, 0) }
    }

    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn build(xs: &[[f64; FEATURE_COUNT]], ys: &[f64], indices: &[usize], depth: usize) -> Node {
    let mean = mean(ys, indices);
    if depth >= MAX_DEPTH || indices.len() < MIN_SAMPLES_SPLIT {
        return Node::Leaf { value: mean };
    }

    let parent_sse = sse(ys, indices, mean);
    if parent_sse <= f64::EPSILON {
        return Node::Leaf { value: mean };
    }

    let mut best: Option<(usize, f64, f64)> = None;
    for feature in 0..FEATURE_COUNT {
        let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
            (lo.min(xs[i][feature]), hi.max(xs[i][feature]))
        });
        if hi <= lo {
            continue;
        }
        for k in 1..SPLIT_CANDIDATES {
            let threshold = lo + (hi - lo) * k as f64 / SPLIT_CANDIDATES as f64;
            if let Some(split_sse) = split_cost(xs, ys, indices, feature, threshold) {
                if best.map_or(true, |(_, _, s)| split_sse < s) {
                    best = Some((feature, threshold, split_sse));
                }
            }
        }
    }

    match best {
        Some((feature, threshold, split_sse)) if split_sse < parent_sse => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
                indices.iter().copied().partition(|&i| xs[i][feature] <= threshold);
            Node::Split {
                feature,
                threshold,
                left: Box::new(build(xs, ys, &left_idx, depth + 1)),
                right: Box::new(build(xs, ys, &right_idx, depth + 1)),
            }
        }
        _ => Node::Leaf { value: mean },
    }
}

/// Combined SSE of both sides of the candidate split, or `None` when one side
/// would be empty.
fn split_cost(
    xs: &[[f64; FEATURE_COUNT]],
    ys: &[f64],
    indices: &[usize],
    feature: usize,
    threshold: f64,
) -> Option<f64> {
    let (mut ln, mut ls, mut lq) = (0usize, 0.0f64, 0.0f64);
    let (mut rn, mut rs, mut rq) = (0usize, 0.0f64, 0.0f64);
    for &i in indices {
        let y = ys[i];
        if xs[i][feature] <= threshold {
            ln += 1;
            ls += y;
            lq += y * y;
        } else {
            rn += 1;
            rs += y;
            rq += y * y;
        }
    }
    if ln == 0 || rn == 0 {
        return None;
    }
    Some((lq - ls * ls / ln as f64) + (rq - rs * rs / rn as f64))
}

fn mean(ys: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| ys[i]).sum::<f64>() / indices.len() as f64
}

fn sse(ys: &[f64], indices: &[usize], mean: f64) -> f64 {
    indices.iter().map(|&i| (ys[i] - mean).powi(2)).sum()
}

/// Bagged ensemble: each tree is fit on a bootstrap resample and predictions
/// are averaged over the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forest {
    trees: Vec<RegressionTree>,
}

impl Forest {
    pub fn fit(
        xs: &[[f64; FEATURE_COUNT]],
        ys: &[f64],
        n_trees: usize,
        rng: &mut StdRng,
    ) -> Self {
        let n = xs.len();
        let trees = (0..n_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(xs, ys, &sample)
            })
            .collect();
        Forest { trees }
    }

    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(x)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn linear_samples() -> (Vec<[f64; FEATURE_COUNT]>, Vec<f64>) {
        // y depends on feature 0 only; the others are constant noise floor.
        let xs: Vec<[f64; FEATURE_COUNT]> =
            (0..200).map(|i| [i as f64, 1.0, 1.0, 0.5]).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x[0]).collect();
        (xs, ys)
    }

    #[test]
    fn single_tree_fits_step_structure() {
        let (xs, ys) = linear_samples();
        let indices: Vec<usize> = (0..xs.len()).collect();
        let tree = RegressionTree::fit(&xs, &ys, &indices);
        // Piecewise-constant approximation of a line: coarse but ordered.
        let low = tree.predict(&[10.0, 1.0, 1.0, 0.5]);
        let high = tree.predict(&[190.0, 1.0, 1.0, 0.5]);
        assert!(low < high, "low={low} high={high}");
        assert!((high - 3.0 * 190.0).abs() < 100.0);
    }

    #[test]
    fn constant_targets_collapse_to_leaf() {
        let xs: Vec<[f64; FEATURE_COUNT]> = (0..50).map(|i| [i as f64, 0.0, 0.0, 0.0]).collect();
        let ys = vec![7.5; 50];
        let indices: Vec<usize> = (0..50).collect();
        let tree = RegressionTree::fit(&xs, &ys, &indices);
        assert_eq!(tree.predict(&[25.0, 0.0, 0.0, 0.0]), 7.5);
    }

    #[test]
    fn forest_averages_trees() {
        let (xs, ys) = linear_samples();
        let mut rng = StdRng::seed_from_u64(7);
        let forest = Forest::fit(&xs, &ys, 10, &mut rng);
        assert_eq!(forest.len(), 10);
        let p = forest.predict(&[100.0, 1.0, 1.0, 0.5]);
        assert!((p - 300.0).abs() < 60.0, "prediction {p}");
    }

    #[test]
    fn forest_fit_is_deterministic_for_a_seed() {
        let (xs, ys) = linear_samples();
        let a = Forest::fit(&xs, &ys, 5, &mut StdRng::seed_from_u64(9));
        let b = Forest::fit(&xs, &ys, 5, &mut StdRng::seed_from_u64(9));
        for x in [[0.0, 1.0, 1.0, 0.5], [50.0, 1.0, 1.0, 0.5], [199.0, 1.0, 1.0, 0.5]] {
            assert_eq!(a.predict(&x), b.predict(&x));
        }
    }
}
