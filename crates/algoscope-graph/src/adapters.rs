//! Conversion between the canonical [`Graph`] and the flat legacy shape.
//!
//! The legacy shape is a `Vec<LegacyNode>` indexed `0..n`, where each node
//! carries its own edge list plus `outgoing`/`incoming` index lists. Several
//! producers (Prim, topological sort) consume it directly.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::generators::circle_nodes;
use crate::model::{Edge, Graph, Node, NodeId, Position};

/// One inline edge entry of a [`LegacyNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyEdge {
    pub to: usize,
    pub weight: i64,
}

/// Index-based node with inline adjacency.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyNode {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub edges: Vec<LegacyEdge>,
    pub outgoing: Vec<usize>,
    pub incoming: Vec<usize>,
}

/// Index-based weighted arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedEdge {
    pub from: usize,
    pub to: usize,
    pub weight: i64,
}

impl WeightedEdge {
    pub const fn new(from: usize, to: usize, weight: i64) -> Self {
        Self { from, to, weight }
    }
}

/// Flatten a canonical graph into legacy nodes.
///
/// Undirected edges fill both endpoints' `edges`, and both directions of
/// `outgoing`/`incoming`. Directed edges fill only the source side.
pub fn to_legacy(graph: &Graph) -> Vec<LegacyNode> {
    let mut nodes: Vec<LegacyNode> = graph
        .nodes()
        .iter()
        .map(|node| {
            let pos = node.position.unwrap_or_default();
            LegacyNode {
                x: pos.x,
                y: pos.y,
                label: node.label.clone().unwrap_or_else(|| node.id.to_string()),
                edges: Vec::new(),
                outgoing: Vec::new(),
                incoming: Vec::new(),
            }
        })
        .collect();

    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.index_of(edge.from), graph.index_of(edge.to)) else {
            continue;
        };
        let weight = edge.cost();
        nodes[from].edges.push(LegacyEdge { to, weight });
        nodes[from].outgoing.push(to);
        nodes[to].incoming.push(from);

        if !edge.directed {
            nodes[to].edges.push(LegacyEdge { to: from, weight });
            nodes[to].outgoing.push(from);
            nodes[from].incoming.push(to);
        }
    }

    nodes
}

/// Rebuild a canonical graph from legacy nodes. Node ids are the indices.
///
/// Directed graphs take every inline edge as an arc. Undirected graphs keep
/// the first entry seen for each unordered pair.
pub fn from_legacy(nodes: &[LegacyNode], directed: bool, weighted: bool) -> Result<Graph> {
    let canonical_nodes = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| Node {
            id: NodeId(i),
            label: Some(node.label.clone()),
            position: Some(Position::new(node.x, node.y)),
        })
        .collect();

    let mut edges = Vec::new();
    let mut seen = HashSet::new();
    for (from, node) in nodes.iter().enumerate() {
        for entry in &node.edges {
            if entry.to >= nodes.len() {
                continue;
            }
            if directed {
                edges.push(Edge::directed(NodeId(from), NodeId(entry.to), Some(entry.weight)));
            } else if seen.insert((from.min(entry.to), from.max(entry.to))) {
                edges.push(Edge::undirected(NodeId(from), NodeId(entry.to), Some(entry.weight)));
            }
        }
    }

    Graph::from_parts(canonical_nodes, edges, directed, weighted)
}

/// Build a circle-laid-out weighted graph from an index-based edge list.
pub fn edge_list_to_graph(num_nodes: usize, edges: &[WeightedEdge], directed: bool) -> Result<Graph> {
    let edges = edges
        .iter()
        .map(|e| Edge {
            from: NodeId(e.from),
            to: NodeId(e.to),
            weight: Some(e.weight),
            directed,
        })
        .collect();
    Graph::from_parts(circle_nodes(num_nodes), edges, directed, true)
}

/// Index-based arcs of a graph. Undirected edges yield both directions.
pub fn weighted_edges(graph: &Graph) -> Vec<WeightedEdge> {
    let mut out = Vec::with_capacity(graph.edge_count());
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.index_of(edge.from), graph.index_of(edge.to)) else {
            continue;
        };
        out.push(WeightedEdge::new(from, to, edge.cost()));
        if !edge.directed {
            out.push(WeightedEdge::new(to, from, edge.cost()));
        }
    }
    out
}

/// Orient an undirected graph for Bellman-Ford.
///
/// Returns a new directed graph: each edge gets a random direction, duplicate
/// arcs are dropped, then every node but the last receives an outgoing arc if
/// it has none. The last node gets one too when the graph has more than two
/// nodes. The input is left untouched.
pub fn orient_for_bellman_ford(graph: &Graph, seed: u64) -> Result<Graph> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = graph.node_count();
    let id_at = |idx: usize| graph.nodes()[idx].id;

    let mut arcs: Vec<Edge> = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut outgoing = vec![0usize; n];

    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.index_of(edge.from), graph.index_of(edge.to)) else {
            continue;
        };
        let (from, to) = if rng.gen_bool(0.5) { (a, b) } else { (b, a) };
        if seen.insert((from, to)) {
            arcs.push(Edge::directed(id_at(from), id_at(to), Some(edge.cost())));
            outgoing[from] += 1;
        }
    }

    for i in 0..n.saturating_sub(1) {
        if outgoing[i] > 0 {
            continue;
        }
        let target = loop {
            let t = rng.gen_range(0..n);
            if t != i {
                break t;
            }
        };
        if seen.insert((i, target)) {
            arcs.push(Edge::directed(id_at(i), id_at(target), Some(rng.gen_range(1..=20))));
            outgoing[i] += 1;
        }
    }

    if n > 2 && outgoing[n - 1] == 0 {
        let target = rng.gen_range(0..n - 1);
        arcs.push(Edge::directed(id_at(n - 1), id_at(target), Some(rng.gen_range(1..=20))));
    }

    graph.with_edges(arcs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{generate, GeneratorSpec, GeneratorType};
    use proptest::prelude::*;

    fn sorted(nodes: &[LegacyNode]) -> Vec<(Vec<LegacyEdge>, Vec<usize>, Vec<usize>)> {
        nodes
            .iter()
            .map(|n| {
                let (mut e, mut o, mut i) = (n.edges.clone(), n.outgoing.clone(), n.incoming.clone());
                e.sort();
                o.sort();
                i.sort();
                (e, o, i)
            })
            .collect()
    }

    #[test]
    fn undirected_edge_is_symmetric() {
        let graph = edge_list_to_graph(2, &[WeightedEdge::new(0, 1, 4)], false).unwrap();
        let legacy = to_legacy(&graph);
        assert_eq!(legacy[0].edges, vec![LegacyEdge { to: 1, weight: 4 }]);
        assert_eq!(legacy[1].edges, vec![LegacyEdge { to: 0, weight: 4 }]);
        assert_eq!(legacy[0].outgoing, vec![1]);
        assert_eq!(legacy[0].incoming, vec![1]);
    }

    #[test]
    fn directed_edge_is_one_sided() {
        let graph = edge_list_to_graph(2, &[WeightedEdge::new(0, 1, 4)], true).unwrap();
        let legacy = to_legacy(&graph);
        assert_eq!(legacy[0].outgoing, vec![1]);
        assert!(legacy[0].incoming.is_empty());
        assert!(legacy[1].edges.is_empty());
        assert_eq!(legacy[1].incoming, vec![0]);
    }

    #[test]
    fn missing_weight_defaults_to_one() {
        let graph = generate(&GeneratorSpec::new(GeneratorType::Grid, 4));
        assert!(to_legacy(&graph).iter().flat_map(|n| &n.edges).all(|e| e.weight == 1));
    }

    #[test]
    fn edge_list_rejects_out_of_range() {
        assert!(edge_list_to_graph(2, &[WeightedEdge::new(0, 5, 1)], true).is_err());
    }

    #[test]
    fn weighted_edges_expand_undirected() {
        let graph = edge_list_to_graph(3, &[WeightedEdge::new(0, 2, 7)], false).unwrap();
        assert_eq!(weighted_edges(&graph), vec![WeightedEdge::new(0, 2, 7), WeightedEdge::new(2, 0, 7)]);
    }

    #[test]
    fn orientation_produces_new_directed_graph() {
        let source = generate(&GeneratorSpec::new(GeneratorType::WeightedRandom, 10).seed(5));
        let oriented = orient_for_bellman_ford(&source, 5).unwrap();

        assert!(!source.directed);
        assert!(source.edges().iter().all(|e| !e.directed));
        assert!(oriented.directed);
        assert!(oriented.edges().iter().all(|e| e.directed));

        let n = oriented.node_count();
        for i in 0..n - 1 {
            assert!(oriented.edges().iter().any(|e| e.from == NodeId(i)), "node {i} has no outgoing arc");
        }
        let mut arcs: Vec<_> = oriented.edges().iter().map(|e| (e.from, e.to)).collect();
        let total = arcs.len();
        arcs.sort();
        arcs.dedup();
        assert_eq!(arcs.len(), total);
    }

    #[test]
    fn orientation_is_seeded() {
        let source = generate(&GeneratorSpec::new(GeneratorType::WeightedRandom, 8).seed(1));
        assert_eq!(orient_for_bellman_ford(&source, 9).unwrap(), orient_for_bellman_ford(&source, 9).unwrap());
    }

    fn arb_graph() -> impl Strategy<Value = Graph> {
        (2usize..10, any::<bool>(), prop::collection::vec((0usize..10, 0usize..10, 1i64..30), 0..25)).prop_map(
            |(n, directed, raw)| {
                let mut seen = HashSet::new();
                let edges: Vec<WeightedEdge> = raw
                    .into_iter()
                    .map(|(a, b, w)| (a % n, b % n, w))
                    .filter(|&(a, b, _)| a != b)
                    .filter(|&(a, b, _)| directed || seen.insert((a.min(b), a.max(b))))
                    .map(|(a, b, w)| WeightedEdge::new(a, b, w))
                    .collect();
                edge_list_to_graph(n, &edges, directed).unwrap()
            },
        )
    }

    #[test]
    fn dangling_legacy_edges_are_dropped() {
        let node = |to: usize| LegacyNode {
            x: 0.0,
            y: 0.0,
            label: String::new(),
            edges: vec![LegacyEdge { to, weight: 1 }],
            outgoing: vec![to],
            incoming: Vec::new(),
        };
        let graph = from_legacy(&[node(1), node(9)], true, true).unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].to, NodeId(1));
    }

    proptest! {
        #[test]
        fn legacy_round_trip(graph in arb_graph()) {
            let once = to_legacy(&graph);
            let twice = to_legacy(&from_legacy(&once, graph.directed, graph.weighted).unwrap());
            prop_assert_eq!(sorted(&once), sorted(&twice));
        }
    }
}
