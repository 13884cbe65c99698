//! Shared fixtures for the cross-crate tests in `tests/`.

use algoscope_graph::{edge_list_to_graph, GeneratorType, Graph, WeightedEdge};
use algoscope_steps::{Step, StepStream};
use algoscope_vis::{GraphRequest, PlaybackConfig, PlaybackSession, Run, RunRequest};

/// Undirected path `0 - 1 - ... - (n-1)` with unit weights.
pub fn line_graph(n: usize) -> Graph {
    let edges: Vec<WeightedEdge> = (1..n).map(|i| WeightedEdge::new(i - 1, i, 1)).collect();
    edge_list_to_graph(n, &edges, false).unwrap_or_default()
}

/// Four nodes where `1 -> 2 -> 3 -> 1` sums to -1.
pub fn negative_cycle_edges() -> Vec<WeightedEdge> {
    vec![
        WeightedEdge::new(0, 1, 4),
        WeightedEdge::new(1, 2, 1),
        WeightedEdge::new(2, 3, -3),
        WeightedEdge::new(3, 1, 1),
    ]
}

pub fn graph_request(algorithm: &str, generator: GeneratorType, num_nodes: usize, seed: u64) -> RunRequest {
    RunRequest::Graph(GraphRequest {
        algorithm: algorithm.to_string(),
        generator,
        num_nodes,
        weighted: None,
        seed: Some(seed),
        start: 0,
        target: None,
    })
}

/// Step tags in order, e.g. `["compare", "swap", ..., "done"]`.
pub fn tags(stream: &StepStream) -> Vec<&'static str> {
    stream.iter().map(Step::tag).collect()
}

/// A paused-at-zero session over `run`.
pub fn session_for(run: Run) -> PlaybackSession {
    let mut session = PlaybackSession::new(PlaybackConfig::default());
    session.load(run.stream, run.initial);
    session
}
