//! Topology generators.
//!
//! Each generator is a pure function of a [`GeneratorSpec`] (including its
//! seed) and produces a graph satisfying the matching row of the
//! [`GeneratorProperties`] table:
//!
//! | type              | directed | weighted | acyclic | connected |
//! |-------------------|----------|----------|---------|-----------|
//! | `complete`        | no       | yes      | no      | yes       |
//! | `tree`            | no       | yes      | yes     | yes       |
//! | `dag`             | yes      | yes      | yes     | no        |
//! | `weighted-random` | no       | yes      | no      | no        |
//! | `grid`            | no       | no       | no      | yes       |
//! | `custom`          | no       | no       | no      | no        |

use std::collections::VecDeque;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::error::Error;
use crate::model::{Edge, Graph, Node, NodeId, Position};

/// Side length of the layout canvas.
pub const CANVAS: f64 = 400.0;

/// Radius of circular layouts.
pub const CIRCLE_RADIUS: f64 = 150.0;

/// Probability that `weighted-random` includes any given edge.
pub const EDGE_DENSITY: f64 = 0.4;

/// Maximum children per parent in `tree`.
pub const TREE_BRANCHING: usize = 3;

/// Probability of a skip edge (layer i to i+2) in `dag`.
pub const DAG_SKIP_PROBABILITY: f64 = 0.05;

/// Topology families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum GeneratorType {
    Complete,
    Tree,
    Dag,
    WeightedRandom,
    Grid,
    Custom,
}

impl GeneratorType {
    /// Every generator in declaration order.
    pub const ALL: [GeneratorType; 6] = [
        GeneratorType::Complete,
        GeneratorType::Tree,
        GeneratorType::Dag,
        GeneratorType::WeightedRandom,
        GeneratorType::Grid,
        GeneratorType::Custom,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            GeneratorType::Complete => "complete",
            GeneratorType::Tree => "tree",
            GeneratorType::Dag => "dag",
            GeneratorType::WeightedRandom => "weighted-random",
            GeneratorType::Grid => "grid",
            GeneratorType::Custom => "custom",
        }
    }

    /// Structural guarantees declared for this topology.
    pub const fn properties(&self) -> GeneratorProperties {
        match self {
            GeneratorType::Complete => GeneratorProperties::new(false, true, false, true),
            GeneratorType::Tree => GeneratorProperties::new(false, true, true, true),
            GeneratorType::Dag => GeneratorProperties::new(true, true, true, false),
            GeneratorType::WeightedRandom => GeneratorProperties::new(false, true, false, false),
            GeneratorType::Grid => GeneratorProperties::new(false, false, false, true),
            GeneratorType::Custom => GeneratorProperties::new(false, false, false, false),
        }
    }
}

impl fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneratorType::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::UnknownGenerator(s.to_string()))
    }
}

/// Declared structural guarantees of a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorProperties {
    pub directed: bool,
    pub weighted: bool,
    pub acyclic: bool,
    pub connected: bool,
}

impl GeneratorProperties {
    pub const fn new(directed: bool, weighted: bool, acyclic: bool, connected: bool) -> Self {
        Self { directed, weighted, acyclic, connected }
    }
}

/// Parameters for one generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorSpec {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: GeneratorType,
    pub num_nodes: usize,
    pub weighted: Option<bool>,
    pub directed: Option<bool>,
    /// Seed for every random choice the generator makes.
    pub seed: u64,
}

impl GeneratorSpec {
    pub const fn new(kind: GeneratorType, num_nodes: usize) -> Self {
        Self {
            kind,
            num_nodes,
            weighted: None,
            directed: None,
            seed: 42,
        }
    }

    pub const fn weighted(mut self, weighted: bool) -> Self {
        self.weighted = Some(weighted);
        self
    }

    pub const fn directed(mut self, directed: bool) -> Self {
        self.directed = Some(directed);
        self
    }

    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Generate a graph for the given spec.
pub fn generate(spec: &GeneratorSpec) -> Graph {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let weighted = spec.weighted.unwrap_or(false);
    match spec.kind {
        GeneratorType::Complete => complete(spec.num_nodes, weighted, &mut rng),
        GeneratorType::Tree => tree(spec.num_nodes, weighted, &mut rng),
        GeneratorType::Dag => dag(spec.num_nodes, weighted, &mut rng),
        GeneratorType::WeightedRandom => weighted_random(spec.num_nodes, &mut rng),
        GeneratorType::Grid => grid(spec.num_nodes),
        GeneratorType::Custom => Graph::new(
            spec.directed.unwrap_or(false),
            spec.weighted.unwrap_or(false),
        ),
    }
}

/// Nodes `0..n` evenly spaced on a circle, first node at the top.
pub(crate) fn circle_nodes(n: usize) -> Vec<Node> {
    let step = 2.0 * PI / n.max(1) as f64;
    let center = CANVAS / 2.0;
    (0..n)
        .map(|i| {
            let angle = i as f64 * step - PI / 2.0;
            Node::at(
                NodeId(i),
                Position::new(angle.cos() * CIRCLE_RADIUS + center, angle.sin() * CIRCLE_RADIUS + center),
            )
        })
        .collect()
}

fn assemble(nodes: Vec<Node>, edges: Vec<Edge>, directed: bool, weighted: bool) -> Graph {
    let graph = Graph::from_parts(nodes, edges, directed, weighted);
    debug_assert!(graph.is_ok(), "generator built an invalid graph: {graph:?}");
    graph.unwrap_or_else(|_| Graph::new(directed, weighted))
}

fn complete(n: usize, weighted: bool, rng: &mut StdRng) -> Graph {
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = weighted.then(|| rng.gen_range(1..=20));
            edges.push(Edge::undirected(NodeId(i), NodeId(j), weight));
        }
    }
    assemble(circle_nodes(n), edges, false, weighted)
}

fn tree(n: usize, weighted: bool, rng: &mut StdRng) -> Graph {
    if n == 0 {
        return Graph::new(false, weighted);
    }
    let center = CANVAS / 2.0;
    let mut nodes = vec![Node::at(NodeId(0), Position::new(center, center))];
    let mut edges = Vec::with_capacity(n - 1);
    let mut queue = VecDeque::from([0usize]);
    let mut next = 1;

    while let Some(parent) = queue.pop_front() {
        if next >= n {
            break;
        }
        let children = TREE_BRANCHING.min(n - next);
        let parent_pos = nodes[parent].position.unwrap_or_default();
        let heading = (parent_pos.y - center).atan2(parent_pos.x - center);

        for i in 0..children {
            let child = next;
            next += 1;
            let angle = (i as f64 - (children as f64 - 1.0) / 2.0) * 0.5 + heading;
            let distance = 100.0 + (rng.gen::<f64>() - 0.5) * 40.0;
            nodes.push(Node::at(
                NodeId(child),
                Position::new(parent_pos.x + angle.cos() * distance, parent_pos.y + angle.sin() * distance),
            ));
            edges.push(Edge::undirected(NodeId(parent), NodeId(child), weighted.then_some(1)));
            queue.push_back(child);
        }
    }

    assemble(nodes, edges, false, weighted)
}

/// Layer layout shared by the generator and its tests.
pub(crate) fn dag_layers(n: usize) -> (usize, usize) {
    let layers = (n as f64).sqrt().ceil() as usize;
    let per_layer = if layers == 0 { 0 } else { n.div_ceil(layers) };
    (layers, per_layer)
}

fn dag(n: usize, weighted: bool, rng: &mut StdRng) -> Graph {
    if n == 0 {
        return Graph::new(true, weighted);
    }
    let (layers, per_layer) = dag_layers(n);
    let layer_of = |i: usize| i / per_layer;
    let layer_range = |layer: usize| {
        let start = (layer * per_layer).min(n);
        start..((layer + 1) * per_layer).min(n)
    };

    let nodes = (0..n)
        .map(|i| {
            let x = ((i % per_layer) + 1) as f64 * (CANVAS / (per_layer + 1) as f64);
            let y = (layer_of(i) + 1) as f64 * (CANVAS / (layers + 1) as f64);
            Node::at(NodeId(i), Position::new(x, y))
        })
        .collect();

    let mut edges: Vec<Edge> = Vec::new();
    let weight = |rng: &mut StdRng| weighted.then(|| rng.gen_range(1..=10));

    for i in 0..n {
        let layer = layer_of(i);

        if layer + 1 < layers {
            let next = layer_range(layer + 1);
            if !next.is_empty() {
                let wanted = if rng.gen::<f64>() < 0.7 { 1 } else { 2 };
                let count = wanted.min(next.len());
                for offset in sample(rng, next.len(), count) {
                    let w = weight(rng);
                    edges.push(Edge::directed(NodeId(i), NodeId(next.start + offset), w));
                }
            }
        }

        if layer + 2 < layers && rng.gen::<f64>() < DAG_SKIP_PROBABILITY {
            let skip = layer_range(layer + 2);
            if !skip.is_empty() {
                let target = rng.gen_range(skip);
                let w = weight(rng);
                edges.push(Edge::directed(NodeId(i), NodeId(target), w));
            }
        }
    }

    // Every node past the first layer needs an incoming edge.
    for layer in 1..layers {
        for j in layer_range(layer) {
            if edges.iter().any(|e| e.to == NodeId(j)) {
                continue;
            }
            let from = rng.gen_range(layer_range(layer - 1));
            let w = weight(rng);
            edges.push(Edge::directed(NodeId(from), NodeId(j), w));
        }
    }

    assemble(nodes, edges, true, weighted)
}

fn weighted_random(n: usize, rng: &mut StdRng) -> Graph {
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < EDGE_DENSITY {
                edges.push(Edge::undirected(NodeId(i), NodeId(j), Some(rng.gen_range(1..=20))));
            }
        }
    }
    assemble(circle_nodes(n), edges, false, true)
}

fn grid(n: usize) -> Graph {
    let size = (n as f64).sqrt().ceil().max(1.0) as usize;
    let cell = CANVAS / (size + 1) as f64;
    let nodes = (0..n)
        .map(|i| {
            let (row, col) = (i / size, i % size);
            Node::at(NodeId(i), Position::new((col + 1) as f64 * cell, (row + 1) as f64 * cell))
        })
        .collect();

    let mut edges = Vec::new();
    for i in 0..n {
        let (row, col) = (i / size, i % size);
        if col + 1 < size && i + 1 < n {
            edges.push(Edge::undirected(NodeId(i), NodeId(i + 1), None));
        }
        if row + 1 < size && i + size < n {
            edges.push(Edge::undirected(NodeId(i), NodeId(i + size), None));
        }
    }
    assemble(nodes, edges, false, false)
}
