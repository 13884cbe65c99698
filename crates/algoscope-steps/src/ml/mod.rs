//! Iterative model fitting on 2-D points in the unit square.
//!
//! Every producer takes its data, and any random starting state, as input.
//! The seeded helpers in [`data`] build those inputs.

pub mod data;
pub mod decision_tree;
pub mod kmeans;
pub mod knn;
pub mod regression;

pub use decision_tree::decision_tree;
pub use kmeans::kmeans;
pub use knn::{knn, knn_batch};
pub use regression::{linear_regression, logistic_regression};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Coordinate by feature index: 0 is x, anything else y.
    pub fn feature(&self, feature: usize) -> f64 {
        if feature == 0 {
            self.x
        } else {
            self.y
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub x: f64,
    pub y: f64,
    pub label: u32,
}

impl LabeledPoint {
    pub fn new(x: f64, y: f64, label: u32) -> Self {
        Self { x, y, label }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Model state at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MlParams {
    Linear { slope: f64, intercept: f64 },
    Logistic { weights: [f64; 2], bias: f64 },
    Knn { k: usize, query: Point },
    /// k-NN over a labeled query set.
    KnnBatch { k: usize, queries: Vec<LabeledPoint> },
    Tree {
        max_depth: usize,
        min_samples: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        root: Option<DecisionNode>,
    },
    KMeans { k: usize, centroids: Vec<Point> },
}

/// Final scores. Only the fields a model produces are set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Sum of squared distances to assigned centroids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertia: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub point: LabeledPoint,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub label: u32,
    pub votes: usize,
}

/// Axis-aligned leaf region of a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// `[min_x, min_y, max_x, max_y]`.
    pub bounds: [f64; 4],
    pub label: u32,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionNode {
    Leaf {
        prediction: u32,
        samples: usize,
        impurity: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        samples: usize,
        impurity: f64,
        left: Box<DecisionNode>,
        right: Box<DecisionNode>,
    },
}

impl DecisionNode {
    pub fn predict(&self, point: &Point) -> u32 {
        let mut node = self;
        loop {
            match node {
                DecisionNode::Leaf { prediction, .. } => return *prediction,
                DecisionNode::Split { feature, threshold, left, right, .. } => {
                    node = if point.feature(*feature) <= *threshold { left } else { right };
                }
            }
        }
    }
}
