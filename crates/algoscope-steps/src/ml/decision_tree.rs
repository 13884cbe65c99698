//! CART-style decision tree on two features with Gini impurity.
//!
//! Growth is depth-first, left subtree before right. Each leaf adds one
//! region and emits a `partition` with every region found so far.

use std::collections::BTreeMap;

use super::{DecisionNode, LabeledPoint, Metrics, MlParams, Region};
use crate::step::MlStep;
use crate::stream::{Recorder, StepStream};

pub const MAX_DEPTH: usize = 4;
pub const MIN_SAMPLES: usize = 3;
const UNIT_BOUNDS: [f64; 4] = [0.0, 0.0, 1.0, 1.0];

fn label_counts(points: &[&LabeledPoint]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for p in points {
        *counts.entry(p.label).or_default() += 1;
    }
    counts
}

pub fn gini(points: &[&LabeledPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let n = points.len() as f64;
    1.0 - label_counts(points)
        .values()
        .map(|&c| (c as f64 / n).powi(2))
        .sum::<f64>()
}

/// Most frequent label; ties go to the lowest label, empty input to 0.
fn majority(points: &[&LabeledPoint]) -> u32 {
    label_counts(points)
        .into_iter()
        .fold((0, 0), |best, (label, count)| if count > best.1 { (label, count) } else { best })
        .0
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Best strictly positive gain over midpoints of sorted feature values,
/// x before y, first found wins ties.
fn best_split(points: &[&LabeledPoint]) -> Option<Split> {
    if points.len() < 2 {
        return None;
    }
    let parent = gini(points);
    let mut best: Option<Split> = None;

    for feature in 0..2 {
        let mut values: Vec<f64> = points.iter().map(|p| p.point().feature(feature)).collect();
        values.sort_by(f64::total_cmp);
        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<&LabeledPoint>, Vec<&LabeledPoint>) =
                points.iter().copied().partition(|p| p.point().feature(feature) <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let weighted = (left.len() as f64 * gini(&left) + right.len() as f64 * gini(&right)) / points.len() as f64;
            let gain = parent - weighted;
            if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                best = Some(Split { feature, threshold, gain });
            }
        }
    }
    best
}

struct Grower<'a> {
    rec: &'a mut Recorder,
    regions: Vec<Region>,
    max_depth: usize,
    min_samples: usize,
}

impl Grower<'_> {
    fn leaf(&mut self, points: &[&LabeledPoint], impurity: f64, bounds: [f64; 4]) -> DecisionNode {
        let prediction = majority(points);
        self.regions.push(Region { bounds, label: prediction, samples: points.len() });
        self.rec.emit(MlStep::Partition { regions: self.regions.clone() });
        DecisionNode::Leaf { prediction, samples: points.len(), impurity }
    }

    fn grow(&mut self, points: &[&LabeledPoint], depth: usize, bounds: [f64; 4]) -> DecisionNode {
        let impurity = gini(points);
        if impurity == 0.0 || depth >= self.max_depth || points.len() < self.min_samples {
            return self.leaf(points, impurity, bounds);
        }
        let Some(split) = best_split(points) else {
            return self.leaf(points, impurity, bounds);
        };

        self.rec.emit(MlStep::Split {
            depth,
            feature: split.feature,
            threshold: split.threshold,
            gain: split.gain,
            samples: points.len(),
        });

        let (left, right): (Vec<&LabeledPoint>, Vec<&LabeledPoint>) =
            points.iter().copied().partition(|p| p.point().feature(split.feature) <= split.threshold);
        let (mut left_bounds, mut right_bounds) = (bounds, bounds);
        left_bounds[2 + split.feature] = split.threshold;
        right_bounds[split.feature] = split.threshold;

        let left = self.grow(&left, depth + 1, left_bounds);
        let right = self.grow(&right, depth + 1, right_bounds);
        DecisionNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            samples: points.len(),
            impurity,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Grow a tree over `points` and report training accuracy.
pub fn decision_tree(points: &[LabeledPoint], max_depth: usize, min_samples: usize) -> StepStream {
    let mut rec = Recorder::new();
    rec.emit(MlStep::Init {
        params: MlParams::Tree { max_depth, min_samples, root: None },
    });

    let refs: Vec<&LabeledPoint> = points.iter().collect();
    let mut grower = Grower { rec: &mut rec, regions: Vec::new(), max_depth, min_samples };
    let root = grower.grow(&refs, 0, UNIT_BOUNDS);

    let accuracy = if points.is_empty() {
        None
    } else {
        let correct = points.iter().filter(|p| root.predict(&p.point()) == p.label).count();
        Some(correct as f64 / points.len() as f64)
    };

    rec.finish(MlStep::Done {
        params: MlParams::Tree { max_depth, min_samples, root: Some(root) },
        metrics: Metrics { accuracy, ..Metrics::default() },
    })
}
