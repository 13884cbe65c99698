//! Canonical graph model.
//!
//! A [`Graph`] is a value object: an ordered node set plus an edge sequence
//! whose endpoints always reference existing nodes. Generators build graphs
//! once; every later stage (adapters, producers) treats them as read-only and
//! derives new values instead of mutating.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Identifier of a node inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

impl NodeId {
    /// Raw index value.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Layout position of a node on the 400x400 canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another position.
    pub fn distance(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A node with optional label and layout position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub label: Option<String>,
    pub position: Option<Position>,
}

impl Node {
    /// A node labelled with its own id.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label: Some(id.to_string()),
            position: None,
        }
    }

    pub fn at(id: NodeId, position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::new(id)
        }
    }
}

/// An edge between two existing nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Option<i64>,
    pub directed: bool,
}

impl Edge {
    pub const fn undirected(from: NodeId, to: NodeId, weight: Option<i64>) -> Self {
        Self { from, to, weight, directed: false }
    }

    pub const fn directed(from: NodeId, to: NodeId, weight: Option<i64>) -> Self {
        Self { from, to, weight, directed: true }
    }

    /// Weight used by algorithms; unweighted edges count as 1.
    pub fn cost(&self) -> i64 {
        self.weight.unwrap_or(1)
    }
}

/// Canonical graph: ordered nodes, edge sequence, top-level flags.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    pub directed: bool,
    pub weighted: bool,
}

impl Graph {
    /// Create an empty graph with the given flags.
    pub fn new(directed: bool, weighted: bool) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            directed,
            weighted,
        }
    }

    /// Build a graph from parts, checking every edge endpoint exists.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>, directed: bool, weighted: bool) -> Result<Self> {
        let mut graph = Self::new(directed, weighted);
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Append a node. Ids must be unique.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.contains(node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Append an edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        for node in [edge.from, edge.to] {
            if !self.contains(node) {
                return Err(Error::MissingNode { node });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Replace the edge set, producing a new graph value.
    pub fn with_edges(&self, edges: Vec<Edge>, directed: bool) -> Result<Self> {
        Self::from_parts(self.nodes.clone(), edges, directed, self.weighted)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Position of a node id in the ordered node set.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Neighbors of `id` in edge order.
    ///
    /// Directed graphs follow outgoing edges only; undirected graphs follow
    /// every incident edge.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.weighted_neighbors(id).into_iter().map(|(n, _)| n).collect()
    }

    /// Neighbors of `id` paired with the edge cost, in edge order.
    pub fn weighted_neighbors(&self, id: NodeId) -> Vec<(NodeId, i64)> {
        let mut out = Vec::new();
        for edge in &self.edges {
            if edge.from == id {
                out.push((edge.to, edge.cost()));
            } else if !self.directed && edge.to == id {
                out.push((edge.from, edge.cost()));
            }
        }
        out
    }

    /// Kahn ordering over edge direction. Shorter than `node_count` iff the
    /// directed reading of the edges has a cycle.
    pub fn kahn_order(&self) -> Vec<NodeId> {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); n];
        for edge in &self.edges {
            if let (Some(from), Some(to)) = (self.index_of(edge.from), self.index_of(edge.to)) {
                outgoing[from].push(to);
                in_degree[to] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(u) = queue.pop_front() {
            order.push(self.nodes[u].id);
            for &v in &outgoing[u] {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        order
    }

    /// Whether every node is reachable from the first, ignoring direction.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.nodes.first() else {
            return true;
        };
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([first.id]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(current) = queue.pop_front() {
            for edge in &self.edges {
                let next = if edge.from == current {
                    edge.to
                } else if edge.to == current {
                    edge.from
                } else {
                    continue;
                };
                if let Some(idx) = self.index_of(next) {
                    if !seen[idx] {
                        seen[idx] = true;
                        reached += 1;
                        queue.push_back(next);
                    }
                }
            }
        }
        reached == self.nodes.len()
    }
}
