//! Breadth-first and depth-first traversal over the canonical graph.
//!
//! Nodes are addressed by their index in [`Graph::nodes`]. Neighbor order is
//! edge order: directed graphs follow outgoing edges, undirected graphs
//! follow every incident edge.

use std::collections::VecDeque;

use algoscope_graph::Graph;

use crate::step::TraversalStep;
use crate::stream::{Recorder, StepStream};

/// Index-based adjacency lists in edge order.
pub(crate) fn adjacency(graph: &Graph) -> Vec<Vec<(usize, i64)>> {
    graph
        .nodes()
        .iter()
        .map(|node| {
            graph
                .weighted_neighbors(node.id)
                .into_iter()
                .filter_map(|(id, w)| graph.index_of(id).map(|idx| (idx, w)))
                .collect()
        })
        .collect()
}

/// Walk predecessor links back from `node`.
pub(crate) fn trace_path(predecessors: &[Option<usize>], node: usize) -> Vec<usize> {
    let mut path = vec![node];
    let mut current = node;
    while let Some(prev) = predecessors[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Bookkeeping shared by the four producers.
struct Walk {
    rec: Recorder,
    discovered: Vec<bool>,
    visited: Vec<usize>,
    predecessors: Vec<Option<usize>>,
}

impl Walk {
    fn new(n: usize) -> Self {
        Self {
            rec: Recorder::new(),
            discovered: vec![false; n],
            visited: Vec::new(),
            predecessors: vec![None; n],
        }
    }

    fn visit(&mut self, node: usize, frontier: Vec<usize>) {
        self.visited.push(node);
        self.rec.emit(TraversalStep::Visit {
            node,
            visited: self.visited.clone(),
            frontier,
        });
    }

    fn frontier(&mut self, node: usize, frontier: Vec<usize>) {
        self.rec.emit(TraversalStep::Frontier {
            node,
            visited: self.visited.clone(),
            frontier,
        });
    }

    fn found(mut self, node: usize) -> StepStream {
        let path = trace_path(&self.predecessors, node);
        self.rec.emit(TraversalStep::Found { node, path: path.clone() });
        self.rec.finish(TraversalStep::Done {
            found: true,
            order: self.visited,
            path,
        })
    }

    fn not_found(mut self) -> StepStream {
        self.rec.emit(TraversalStep::NotFound);
        self.rec.finish(TraversalStep::Done {
            found: false,
            order: self.visited,
            path: Vec::new(),
        })
    }

    fn complete(self, n: usize) -> StepStream {
        let found = n > 0 && self.visited.len() == n;
        self.rec.finish(TraversalStep::Done {
            found,
            order: self.visited,
            path: Vec::new(),
        })
    }
}

/// Breadth-first search from `start` for `target`. The target is reported as
/// soon as it is discovered.
pub fn bfs_search(graph: &Graph, start: usize, target: usize) -> StepStream {
    let adj = adjacency(graph);
    let n = adj.len();
    let mut walk = Walk::new(n);
    if start >= n || target >= n {
        return walk.not_found();
    }

    let mut queue = VecDeque::from([start]);
    walk.discovered[start] = true;
    walk.frontier(start, vec![start]);

    while let Some(current) = queue.pop_front() {
        walk.visit(current, queue.iter().copied().collect());
        if current == target {
            return walk.found(current);
        }
        for &(next, _) in &adj[current] {
            if walk.discovered[next] {
                continue;
            }
            walk.discovered[next] = true;
            walk.predecessors[next] = Some(current);
            if next == target {
                return walk.found(next);
            }
            queue.push_back(next);
            walk.frontier(next, queue.iter().copied().collect());
        }
    }

    walk.not_found()
}

/// Depth-first search from `start` for `target`. Neighbors are pushed in
/// reverse so they pop in adjacency order.
pub fn dfs_search(graph: &Graph, start: usize, target: usize) -> StepStream {
    let adj = adjacency(graph);
    let n = adj.len();
    let mut walk = Walk::new(n);
    if start >= n || target >= n {
        return walk.not_found();
    }

    let mut stack = vec![start];
    walk.discovered[start] = true;
    walk.frontier(start, stack.clone());

    while let Some(current) = stack.pop() {
        walk.visit(current, stack.clone());
        if current == target {
            return walk.found(current);
        }
        for &(next, _) in adj[current].iter().rev() {
            if walk.discovered[next] {
                continue;
            }
            walk.discovered[next] = true;
            walk.predecessors[next] = Some(current);
            if next == target {
                return walk.found(next);
            }
            stack.push(next);
            walk.frontier(next, stack.clone());
        }
    }

    walk.not_found()
}

/// Breadth-first traversal of everything reachable from `start`.
pub fn bfs_traversal(graph: &Graph, start: usize) -> StepStream {
    let adj = adjacency(graph);
    let n = adj.len();
    let mut walk = Walk::new(n);
    if start >= n {
        return walk.complete(n);
    }

    let mut queue = VecDeque::from([start]);
    walk.discovered[start] = true;
    walk.frontier(start, vec![start]);

    while let Some(current) = queue.pop_front() {
        walk.visit(current, queue.iter().copied().collect());
        for &(next, _) in &adj[current] {
            if !walk.discovered[next] {
                walk.discovered[next] = true;
                walk.predecessors[next] = Some(current);
                queue.push_back(next);
                walk.frontier(next, queue.iter().copied().collect());
            }
        }
    }

    walk.complete(n)
}

/// Depth-first traversal of everything reachable from `start`. A node is
/// visited when popped, so the visit order is a true depth-first preorder.
pub fn dfs_traversal(graph: &Graph, start: usize) -> StepStream {
    let adj = adjacency(graph);
    let n = adj.len();
    let mut walk = Walk::new(n);
    if start >= n {
        return walk.complete(n);
    }

    let mut done = vec![false; n];
    let mut stack = vec![start];
    walk.frontier(start, stack.clone());

    while let Some(current) = stack.pop() {
        if done[current] {
            continue;
        }
        done[current] = true;
        walk.visit(current, stack.clone());
        for &(next, _) in adj[current].iter().rev() {
            if !done[next] {
                stack.push(next);
                walk.frontier(next, stack.clone());
            }
        }
    }

    walk.complete(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Step;
    use algoscope_graph::{edge_list_to_graph, WeightedEdge};

    fn line(n: usize) -> Graph {
        let edges: Vec<_> = (1..n).map(|i| WeightedEdge::new(i - 1, i, 1)).collect();
        edge_list_to_graph(n, &edges, false).unwrap()
    }

    fn visits(stream: &StepStream) -> Vec<usize> {
        stream
            .iter()
            .filter_map(|s| match s {
                Step::Traversal(TraversalStep::Visit { node, .. }) => Some(*node),
                _ => None,
            })
            .collect()
    }

    fn done(stream: &StepStream) -> (bool, Vec<usize>) {
        match stream.done() {
            Step::Traversal(TraversalStep::Done { found, path, .. }) => (*found, path.clone()),
            other => panic!("unexpected terminal step {other:?}"),
        }
    }

    #[test]
    fn bfs_on_line_visits_then_finds() {
        let stream = bfs_search(&line(3), 0, 2);
        assert_eq!(visits(&stream), vec![0, 1]);
        let found = stream.iter().find_map(|s| match s {
            Step::Traversal(TraversalStep::Found { node, path }) => Some((*node, path.clone())),
            _ => None,
        });
        assert_eq!(found, Some((2, vec![0, 1, 2])));
        assert_eq!(done(&stream), (true, vec![0, 1, 2]));
    }

    #[test]
    fn start_equals_target() {
        let stream = bfs_search(&line(3), 1, 1);
        assert_eq!(done(&stream), (true, vec![1]));
        let stream = dfs_search(&line(3), 1, 1);
        assert_eq!(done(&stream), (true, vec![1]));
    }

    #[test]
    fn unreachable_target_is_not_an_error() {
        let graph = edge_list_to_graph(3, &[WeightedEdge::new(0, 1, 1)], false).unwrap();
        let stream = dfs_search(&graph, 0, 2);
        assert!(stream.iter().any(|s| matches!(s, Step::Traversal(TraversalStep::NotFound))));
        assert_eq!(done(&stream), (false, vec![]));
    }

    #[test]
    fn dfs_pops_in_adjacency_order() {
        // star: 0 connected to 1, 2, 3
        let edges = [WeightedEdge::new(0, 1, 1), WeightedEdge::new(0, 2, 1), WeightedEdge::new(0, 3, 1)];
        let graph = edge_list_to_graph(4, &edges, false).unwrap();
        assert_eq!(visits(&dfs_traversal(&graph, 0)), vec![0, 1, 2, 3]);
        assert_eq!(visits(&bfs_traversal(&graph, 0)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn dfs_goes_deep_before_wide() {
        // 0-1, 0-2, 1-3
        let edges = [WeightedEdge::new(0, 1, 1), WeightedEdge::new(0, 2, 1), WeightedEdge::new(1, 3, 1)];
        let graph = edge_list_to_graph(4, &edges, false).unwrap();
        assert_eq!(visits(&dfs_traversal(&graph, 0)), vec![0, 1, 3, 2]);
        assert_eq!(visits(&bfs_traversal(&graph, 0)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn directed_edges_are_one_way() {
        let graph = edge_list_to_graph(2, &[WeightedEdge::new(1, 0, 1)], true).unwrap();
        assert!(!done(&bfs_search(&graph, 0, 1)).0);
        assert!(done(&bfs_search(&graph, 1, 0)).0);
    }

    #[test]
    fn empty_graph_terminates() {
        let graph = Graph::default();
        assert_eq!(bfs_search(&graph, 0, 0).len(), 2);
        assert_eq!(bfs_traversal(&graph, 0).len(), 1);
    }
}
