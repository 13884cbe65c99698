//! Spanning tree, shortest path and ordering producers.
//!
//! Prim and topological sort read the legacy index-based node shape,
//! Bellman-Ford reads a flat arc list, Dijkstra and greedy best-first read
//! the canonical graph directly.

use std::collections::VecDeque;

use algoscope_graph::{Graph, LegacyNode, WeightedEdge};

use crate::step::{OptimizationResult, OptimizationStep};
use crate::stream::{Recorder, StepStream};
use crate::traversal::{adjacency, trace_path};

/// Marker carried by `done` when a run fails.
pub const FAILED: i64 = -1;

/// Prim's minimum spanning tree from node 0, using an O(n²) scan for the
/// cheapest crossing edge. Disconnected graphs yield the tree of node 0's
/// component; `done.node` is the number of nodes it spans.
pub fn prim_mst(nodes: &[LegacyNode]) -> StepStream {
    let mut rec = Recorder::new();
    let n = nodes.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut min_edge: Vec<Option<i64>> = vec![None; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut selected: Vec<WeightedEdge> = Vec::new();

    if n > 0 {
        min_edge[0] = Some(0);
    }

    for _ in 0..n {
        let next = (0..n)
            .filter(|&v| !visited[v])
            .filter_map(|v| min_edge[v].map(|w| (v, w)))
            .fold(None, |best: Option<(usize, i64)>, (v, w)| match best {
                Some((_, bw)) if bw <= w => best,
                _ => Some((v, w)),
            });
        let Some((u, weight)) = next else {
            break;
        };

        visited[u] = true;
        order.push(u);
        rec.emit(OptimizationStep::Visit { node: u, visited: order.clone() });

        if let Some(p) = parent[u] {
            selected.push(WeightedEdge::new(p, u, weight));
            rec.emit(OptimizationStep::EdgeSelect {
                from: p,
                to: u,
                weight,
                selected: selected.clone(),
            });
        }

        for edge in &nodes[u].edges {
            let v = edge.to;
            if v >= n || visited[v] {
                continue;
            }
            rec.emit(OptimizationStep::EdgeConsider { from: u, to: v, weight: edge.weight });
            if min_edge[v].map_or(true, |current| edge.weight < current) {
                min_edge[v] = Some(edge.weight);
                parent[v] = Some(u);
            }
        }
    }

    let total_weight = selected.iter().map(|e| e.weight).sum();
    rec.finish(OptimizationStep::Done {
        node: order.len() as i64,
        result: OptimizationResult::SpanningTree { selected, total_weight },
    })
}

/// Kahn's algorithm over `outgoing`/`incoming`. When the order comes up
/// short of `n` the graph has a cycle and `done.node` is [`FAILED`].
pub fn topological_sort(nodes: &[LegacyNode]) -> StepStream {
    let mut rec = Recorder::new();
    let n = nodes.len();
    let mut in_degree: Vec<usize> = nodes.iter().map(|node| node.incoming.len()).collect();
    let mut queued = vec![false; n];
    let mut queue = VecDeque::new();
    let mut order: Vec<usize> = Vec::with_capacity(n);

    for (i, degree) in in_degree.iter().enumerate() {
        if *degree == 0 {
            queue.push_back(i);
            queued[i] = true;
            rec.emit(OptimizationStep::Visit { node: i, visited: order.clone() });
        }
    }

    while let Some(u) = queue.pop_front() {
        order.push(u);
        rec.emit(OptimizationStep::TopoOrder { node: u, order: order.clone() });

        for &v in &nodes[u].outgoing {
            if v >= n {
                continue;
            }
            let weight = nodes[u].edges.iter().find(|e| e.to == v).map_or(1, |e| e.weight);
            rec.emit(OptimizationStep::EdgeConsider { from: u, to: v, weight });
            in_degree[v] = in_degree[v].saturating_sub(1);
            if in_degree[v] == 0 && !queued[v] {
                queued[v] = true;
                queue.push_back(v);
                rec.emit(OptimizationStep::Visit { node: v, visited: order.clone() });
            }
        }
    }

    let node = if order.len() == n { n as i64 } else { FAILED };
    rec.finish(OptimizationStep::Done {
        node,
        result: OptimizationResult::Order { order },
    })
}

/// Bellman-Ford from `source` over directed arcs.
///
/// All arcs are relaxed once per round, stopping after a round without
/// improvement. One further pass looks for an arc that still improves; if
/// found, the graph has a negative cycle and `done.node` is [`FAILED`].
pub fn bellman_ford(num_nodes: usize, edges: &[WeightedEdge], source: usize) -> StepStream {
    let mut rec = Recorder::new();
    let mut distances: Vec<Option<i64>> = vec![None; num_nodes];

    if source >= num_nodes {
        return rec.finish(OptimizationStep::Done {
            node: FAILED,
            result: OptimizationResult::Distances { distances, path: Vec::new(), found: false },
        });
    }

    distances[source] = Some(0);
    rec.emit(OptimizationStep::Visit { node: source, visited: vec![source] });

    let improves = |distances: &[Option<i64>], e: &WeightedEdge| match (distances[e.from], distances[e.to]) {
        (Some(d), Some(current)) => d + e.weight < current,
        (Some(_), None) => true,
        (None, _) => false,
    };

    let edges: Vec<&WeightedEdge> = edges.iter().filter(|e| e.from < num_nodes && e.to < num_nodes).collect();

    for _ in 1..num_nodes {
        let mut updated = false;
        for edge in &edges {
            rec.emit(OptimizationStep::EdgeConsider { from: edge.from, to: edge.to, weight: edge.weight });
            if improves(&distances, edge) {
                distances[edge.to] = distances[edge.from].map(|d| d + edge.weight);
                updated = true;
                rec.emit(OptimizationStep::Relax {
                    node: edge.to,
                    from: edge.from,
                    weight: edge.weight,
                    distances: distances.clone(),
                });
            }
        }
        if !updated {
            break;
        }
    }

    for edge in &edges {
        rec.emit(OptimizationStep::EdgeConsider { from: edge.from, to: edge.to, weight: edge.weight });
        if improves(&distances, edge) {
            return rec.finish(OptimizationStep::Done {
                node: FAILED,
                result: OptimizationResult::Distances { distances, path: Vec::new(), found: false },
            });
        }
    }

    rec.finish(OptimizationStep::Done {
        node: num_nodes as i64,
        result: OptimizationResult::Distances { distances, path: Vec::new(), found: true },
    })
}

/// Frontier ordered by priority, ties broken by insertion order.
struct Frontier<P> {
    entries: Vec<(P, usize)>,
}

impl<P: Copy> Frontier<P> {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn push(&mut self, priority: P, node: usize) {
        self.entries.push((priority, node));
    }

    fn pop_min(&mut self, cmp: impl Fn(&P, &P) -> std::cmp::Ordering) -> Option<usize> {
        // Stable sort keeps insertion order among equal priorities.
        self.entries.sort_by(|a, b| cmp(&a.0, &b.0));
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0).1)
        }
    }
}

fn settle_result(
    rec: Recorder,
    distances: Vec<Option<i64>>,
    predecessors: &[Option<usize>],
    settled: usize,
    target: Option<usize>,
    reached: bool,
) -> StepStream {
    let (node, path, found) = match target {
        Some(t) if reached => (settled as i64, trace_path(predecessors, t), true),
        Some(_) => (FAILED, Vec::new(), false),
        None => (settled as i64, Vec::new(), true),
    };
    rec.finish(OptimizationStep::Done {
        node,
        result: OptimizationResult::Distances { distances, path, found },
    })
}

/// Dijkstra from `source`, stopping early once `target` is settled.
pub fn dijkstra(graph: &Graph, source: usize, target: Option<usize>) -> StepStream {
    let adj = adjacency(graph);
    let n = adj.len();
    let mut rec = Recorder::new();
    let mut distances: Vec<Option<i64>> = vec![None; n];
    let mut predecessors: Vec<Option<usize>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut visited = Vec::new();

    if source >= n || target.is_some_and(|t| t >= n) {
        return settle_result(rec, distances, &predecessors, 0, target.or(Some(source)), false);
    }

    distances[source] = Some(0);
    let mut frontier = Frontier::new();
    frontier.push(0i64, source);

    while let Some(u) = frontier.pop_min(|a, b| a.cmp(b)) {
        if settled[u] {
            continue;
        }
        settled[u] = true;
        visited.push(u);
        rec.emit(OptimizationStep::Visit { node: u, visited: visited.clone() });
        if Some(u) == target {
            return settle_result(rec, distances, &predecessors, visited.len(), target, true);
        }

        let Some(du) = distances[u] else { continue };
        for &(v, weight) in &adj[u] {
            if settled[v] {
                continue;
            }
            rec.emit(OptimizationStep::EdgeConsider { from: u, to: v, weight });
            let candidate = du + weight;
            if distances[v].map_or(true, |dv| candidate < dv) {
                distances[v] = Some(candidate);
                predecessors[v] = Some(u);
                frontier.push(candidate, v);
                rec.emit(OptimizationStep::Relax {
                    node: v,
                    from: u,
                    weight,
                    distances: distances.clone(),
                });
            }
        }
    }

    let reached = target.is_none();
    settle_result(rec, distances, &predecessors, visited.len(), target, reached)
}

/// Greedy best-first search toward `target`, always expanding the frontier
/// node whose layout position is closest to the target's.
pub fn greedy_best_first(graph: &Graph, source: usize, target: usize) -> StepStream {
    let adj = adjacency(graph);
    let n = adj.len();
    let mut rec = Recorder::new();
    let mut distances: Vec<Option<i64>> = vec![None; n];
    let mut predecessors: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut visited = Vec::new();

    if source >= n || target >= n {
        return settle_result(rec, distances, &predecessors, 0, Some(target), false);
    }

    let position = |i: usize| graph.nodes()[i].position.unwrap_or_default();
    let goal = position(target);
    let heuristic = |i: usize| position(i).distance(&goal);

    distances[source] = Some(0);
    let mut frontier = Frontier::new();
    frontier.push(heuristic(source), source);

    while let Some(u) = frontier.pop_min(|a: &f64, b: &f64| a.total_cmp(b)) {
        if closed[u] {
            continue;
        }
        closed[u] = true;
        visited.push(u);
        rec.emit(OptimizationStep::Visit { node: u, visited: visited.clone() });
        if u == target {
            return settle_result(rec, distances, &predecessors, visited.len(), Some(target), true);
        }

        let du = distances[u].unwrap_or(0);
        for &(v, weight) in &adj[u] {
            if closed[v] {
                continue;
            }
            rec.emit(OptimizationStep::EdgeConsider { from: u, to: v, weight });
            if distances[v].is_none() {
                distances[v] = Some(du + weight);
                predecessors[v] = Some(u);
                frontier.push(heuristic(v), v);
                rec.emit(OptimizationStep::Relax {
                    node: v,
                    from: u,
                    weight,
                    distances: distances.clone(),
                });
            }
        }
    }

    settle_result(rec, distances, &predecessors, visited.len(), Some(target), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use algoscope_graph::{edge_list_to_graph, to_legacy};

    fn done(stream: &StepStream) -> (i64, OptimizationResult) {
        match stream.done() {
            Step::Optimization(OptimizationStep::Done { node, result }) => (*node, result.clone()),
            other => panic!("unexpected terminal step {other:?}"),
        }
    }

    #[test]
    fn bellman_ford_detects_negative_cycle() {
        let edges = [WeightedEdge::new(0, 1, 1), WeightedEdge::new(1, 2, -3), WeightedEdge::new(2, 1, 1)];
        let (node, _) = done(&bellman_ford(3, &edges, 0));
        assert_eq!(node, FAILED);
    }

    #[test]
    fn bellman_ford_shortest_distances() {
        let edges = [
            WeightedEdge::new(0, 1, 4),
            WeightedEdge::new(0, 2, 1),
            WeightedEdge::new(2, 1, 2),
            WeightedEdge::new(1, 3, 1),
        ];
        let (node, result) = done(&bellman_ford(5, &edges, 0));
        assert_eq!(node, 5);
        assert_eq!(
            result,
            OptimizationResult::Distances {
                distances: vec![Some(0), Some(3), Some(1), Some(4), None],
                path: vec![],
                found: true,
            }
        );
    }

    #[test]
    fn bellman_ford_single_node() {
        let stream = bellman_ford(1, &[], 0);
        assert_eq!(stream.len(), 2);
        assert_eq!(done(&stream).0, 1);
    }

    #[test]
    fn prim_picks_cheapest_edges() {
        // triangle with one expensive side
        let edges = [WeightedEdge::new(0, 1, 1), WeightedEdge::new(1, 2, 2), WeightedEdge::new(0, 2, 9)];
        let graph = edge_list_to_graph(3, &edges, false).unwrap();
        let (node, result) = done(&prim_mst(&to_legacy(&graph)));
        assert_eq!(node, 3);
        match result {
            OptimizationResult::SpanningTree { selected, total_weight } => {
                assert_eq!(selected, vec![WeightedEdge::new(0, 1, 1), WeightedEdge::new(1, 2, 2)]);
                assert_eq!(total_weight, 3);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn prim_on_disconnected_graph_is_partial() {
        let graph = edge_list_to_graph(3, &[WeightedEdge::new(0, 1, 5)], false).unwrap();
        assert_eq!(done(&prim_mst(&to_legacy(&graph))).0, 2);
    }

    #[test]
    fn prim_empty_input_terminates() {
        let stream = prim_mst(&[]);
        assert_eq!(stream.len(), 1);
        assert_eq!(done(&stream).0, 0);
    }

    #[test]
    fn topological_order_on_dag() {
        let edges = [WeightedEdge::new(0, 2, 1), WeightedEdge::new(1, 2, 1), WeightedEdge::new(2, 3, 1)];
        let graph = edge_list_to_graph(4, &edges, true).unwrap();
        let (node, result) = done(&topological_sort(&to_legacy(&graph)));
        assert_eq!(node, 4);
        assert_eq!(result, OptimizationResult::Order { order: vec![0, 1, 2, 3] });
    }

    #[test]
    fn topological_sort_reports_cycle() {
        let edges = [WeightedEdge::new(0, 1, 1), WeightedEdge::new(1, 0, 1)];
        let graph = edge_list_to_graph(2, &edges, true).unwrap();
        assert_eq!(done(&topological_sort(&to_legacy(&graph))).0, FAILED);
    }

    #[test]
    fn dijkstra_finds_cheaper_detour() {
        let edges = [WeightedEdge::new(0, 1, 10), WeightedEdge::new(0, 2, 1), WeightedEdge::new(2, 1, 2)];
        let graph = edge_list_to_graph(3, &edges, false).unwrap();
        let (_, result) = done(&dijkstra(&graph, 0, Some(1)));
        match result {
            OptimizationResult::Distances { distances, path, found } => {
                assert!(found);
                assert_eq!(path, vec![0, 2, 1]);
                assert_eq!(distances[1], Some(3));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn dijkstra_unreachable_target_fails_cleanly() {
        let graph = edge_list_to_graph(3, &[WeightedEdge::new(0, 1, 1)], false).unwrap();
        assert_eq!(done(&dijkstra(&graph, 0, Some(2))).0, FAILED);
    }

    #[test]
    fn dijkstra_tie_break_is_insertion_order() {
        let edges = [WeightedEdge::new(0, 2, 1), WeightedEdge::new(0, 1, 1)];
        let graph = edge_list_to_graph(3, &edges, false).unwrap();
        let visits: Vec<usize> = dijkstra(&graph, 0, None)
            .iter()
            .filter_map(|s| match s {
                Step::Optimization(OptimizationStep::Visit { node, .. }) => Some(*node),
                _ => None,
            })
            .collect();
        assert_eq!(visits, vec![0, 2, 1]);
    }

    #[test]
    fn greedy_reaches_target() {
        let edges = [WeightedEdge::new(0, 1, 1), WeightedEdge::new(1, 2, 1), WeightedEdge::new(2, 3, 1)];
        let graph = edge_list_to_graph(4, &edges, false).unwrap();
        let (_, result) = done(&greedy_best_first(&graph, 0, 3));
        match result {
            OptimizationResult::Distances { path, found, .. } => {
                assert!(found);
                assert_eq!(path, vec![0, 1, 2, 3]);
            }
            other => panic!("{other:?}"),
        }
    }
}
