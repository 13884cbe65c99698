//! Turning a user request into a playable stream.
//!
//! Graph-family requests pass the compatibility check before anything is
//! generated; a rejected pairing never reaches a producer. Random inputs
//! (graphs, datasets, starting centroids) are resolved from the request
//! seed, falling back to the server seed, before the producer runs.

use algoscope_graph::{
    ensure_compatible, generate, orient_for_bellman_ford, to_legacy, weighted_edges, GeneratorSpec, GeneratorType,
    Graph, GraphAlgorithm,
};
use algoscope_steps::hash::{self, Entry, HashCommand, HashTable, Strategy, DEFAULT_TABLE_SIZE};
use algoscope_steps::heap::HeapCommand;
use algoscope_steps::list::{ListCommand, ListKind, ListSnapshot};
use algoscope_steps::ml::{self, data, decision_tree, kmeans, knn, regression, Point};
use algoscope_steps::pathfinding::{Grid, GridAlgorithm};
use algoscope_steps::sorting::SortAlgorithm;
use algoscope_steps::tree::{TreeCommand, TreeKind, TreeSnapshot};
use algoscope_steps::{optimization, traversal, HashStep, Step, StepStream, TreeStep};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::display::InitialState;
use crate::error::Result;

fn default_table_size() -> usize {
    DEFAULT_TABLE_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRequest {
    /// Algorithm key, e.g. `bellman-ford`. Unknown keys are rejected.
    pub algorithm: String,
    pub generator: GeneratorType,
    pub num_nodes: usize,
    /// Defaults to the generator's declared weighting.
    #[serde(default)]
    pub weighted: Option<bool>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub start: usize,
    /// Search target; full traversal when absent.
    #[serde(default)]
    pub target: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRequest {
    pub algorithm: GridAlgorithm,
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub walls: Vec<(usize, usize)>,
    pub start: (usize, usize),
    pub goal: (usize, usize),
}

/// Synthetic-data model runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MlRequest {
    LinearRegression { count: usize },
    LogisticRegression { count: usize },
    Knn { count: usize, k: usize, query: Point },
    /// `queries` labeled test points drawn from the training distribution.
    KnnBatch { count: usize, k: usize, queries: usize },
    DecisionTree { count: usize, max_depth: usize, min_samples: usize },
    KMeans { count: usize, k: usize },
}

/// Everything needed to produce one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RunRequest {
    Sorting {
        algorithm: SortAlgorithm,
        input: Vec<i64>,
    },
    Graph(GraphRequest),
    Grid(GridRequest),
    Tree {
        kind: TreeKind,
        /// Values inserted, in order, to form the starting tree.
        #[serde(default)]
        values: Vec<i64>,
        command: TreeCommand,
    },
    Heap {
        #[serde(default)]
        heap: Vec<i64>,
        command: HeapCommand,
    },
    Hash {
        strategy: Strategy,
        #[serde(default = "default_table_size")]
        size: usize,
        #[serde(default)]
        entries: Vec<Entry>,
        command: HashCommand,
    },
    List {
        /// Singly unless asked otherwise.
        #[serde(default)]
        kind: ListKind,
        #[serde(default)]
        values: Vec<i64>,
        command: ListCommand,
    },
    Ml {
        #[serde(flatten)]
        model: MlRequest,
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// A produced stream with the state it starts from.
#[derive(Debug, Clone)]
pub struct Run {
    pub stream: StepStream,
    pub initial: InitialState,
    /// Graph the producer ran on, for graph-family requests.
    pub graph: Option<Graph>,
}

impl Run {
    fn new(stream: StepStream, initial: InitialState) -> Self {
        Self { stream, initial, graph: None }
    }
}

/// Validate, synthesize and produce. `seed` is used when the request has
/// none of its own.
pub fn build(request: &RunRequest, seed: u64) -> Result<Run> {
    let run = match request {
        RunRequest::Sorting { algorithm, input } => {
            Run::new(algorithm.run(input), InitialState::Array { array: input.clone() })
        }
        RunRequest::Graph(req) => graph_run(req, seed)?,
        RunRequest::Grid(req) => grid_run(req),
        RunRequest::Tree { kind, values, command } => tree_run(*kind, values, command),
        RunRequest::Heap { heap, command } => {
            Run::new(command.run(heap), InitialState::Heap { heap: command.initial(heap) })
        }
        RunRequest::Hash { strategy, size, entries, command } => {
            let table = preload(HashTable::new(*size, *strategy), entries);
            Run::new(command.run(&table), InitialState::Hash { table })
        }
        RunRequest::List { kind, values, command } => {
            let list = ListSnapshot::from_values_as(*kind, values);
            Run::new(command.run(&list), InitialState::List { list })
        }
        RunRequest::Ml { model, seed: own } => Run::new(ml_run(model, own.unwrap_or(seed)), InitialState::Ml),
    };
    info!(steps = run.stream.len(), family = ?run.stream.done().family(), "stream produced");
    Ok(run)
}

fn graph_run(req: &GraphRequest, default_seed: u64) -> Result<Run> {
    let algorithm = match ensure_compatible(&req.algorithm, req.generator) {
        Ok(algorithm) => algorithm,
        Err(err) => {
            warn!(algorithm = %req.algorithm, generator = %req.generator, reason = %err, "refusing graph run");
            return Err(err.into());
        }
    };

    let seed = req.seed.unwrap_or(default_seed);
    let weighted = req.weighted.unwrap_or(req.generator.properties().weighted);
    let mut graph = generate(&GeneratorSpec::new(req.generator, req.num_nodes).weighted(weighted).seed(seed));
    if algorithm == GraphAlgorithm::BellmanFord && req.generator == GeneratorType::WeightedRandom {
        graph = orient_for_bellman_ford(&graph, seed)?;
    }

    let n = graph.node_count();
    let stream = match algorithm {
        GraphAlgorithm::BellmanFord => optimization::bellman_ford(n, &weighted_edges(&graph), req.start),
        GraphAlgorithm::PrimMst => optimization::prim_mst(&to_legacy(&graph)),
        GraphAlgorithm::TopologicalSort => optimization::topological_sort(&to_legacy(&graph)),
        GraphAlgorithm::Bfs => match req.target {
            Some(target) => traversal::bfs_search(&graph, req.start, target),
            None => traversal::bfs_traversal(&graph, req.start),
        },
        GraphAlgorithm::Dfs => match req.target {
            Some(target) => traversal::dfs_search(&graph, req.start, target),
            None => traversal::dfs_traversal(&graph, req.start),
        },
        GraphAlgorithm::Greedy => {
            let target = req.target.unwrap_or(n.saturating_sub(1));
            optimization::greedy_best_first(&graph, req.start, target)
        }
        GraphAlgorithm::Dijkstra => optimization::dijkstra(&graph, req.start, req.target),
    };

    Ok(Run {
        stream,
        initial: InitialState::Graph { node_count: n },
        graph: Some(graph),
    })
}

fn grid_run(req: &GridRequest) -> Run {
    let grid = Grid::new(req.rows, req.cols).with_walls(req.walls.iter().copied());
    let start = grid.cell(req.start.0, req.start.1);
    let goal = grid.cell(req.goal.0, req.goal.1);
    let stream = req.algorithm.run(&grid, start, goal);
    Run::new(
        stream,
        InitialState::Grid {
            rows: grid.rows,
            cols: grid.cols,
            walls: grid.walls.iter().copied().collect(),
        },
    )
}

fn tree_run(kind: TreeKind, values: &[i64], command: &TreeCommand) -> Run {
    let tree = match command {
        TreeCommand::Build(_) => TreeSnapshot::default(),
        _ => match kind.run(&TreeSnapshot::default(), &TreeCommand::Build(values.to_vec())).done() {
            Step::Tree(TreeStep::Done { tree, .. }) => tree.clone(),
            _ => TreeSnapshot::default(),
        },
    };
    Run::new(kind.run(&tree, command), InitialState::Tree { tree })
}

/// Insert `entries` in order and keep the resulting table.
fn preload(table: HashTable, entries: &[Entry]) -> HashTable {
    entries.iter().fold(table, |table, entry| {
        match hash::insert(&table, &entry.key, &entry.value).done() {
            Step::Hash(HashStep::Done { table, .. }) => table.clone(),
            _ => table,
        }
    })
}

fn ml_run(model: &MlRequest, seed: u64) -> StepStream {
    match model {
        MlRequest::LinearRegression { count } => ml::linear_regression(
            &data::regression_data(*count, 0.7, 0.15, 0.1, seed),
            regression::LINEAR_LEARNING_RATE,
            regression::LINEAR_ITERATIONS,
        ),
        MlRequest::LogisticRegression { count } => ml::logistic_regression(
            &data::binary_classification_data(*count, 0.15, seed),
            regression::LOGISTIC_LEARNING_RATE,
            regression::LOGISTIC_ITERATIONS,
        ),
        MlRequest::Knn { count, k, query } => knn::knn(&data::classification_data(*count, 3, 0.2, seed), *query, *k),
        MlRequest::KnnBatch { count, k, queries } => knn::knn_batch(
            &data::classification_data(*count, 3, 0.2, seed),
            &data::classification_data(*queries, 3, 0.2, seed.wrapping_add(1)),
            *k,
        ),
        MlRequest::DecisionTree { count, max_depth, min_samples } => {
            decision_tree::decision_tree(&data::classification_data(*count, 3, 0.25, seed), *max_depth, *min_samples)
        }
        MlRequest::KMeans { count, k } => {
            let points = data::uniform_points(*count, seed);
            let centroids = data::initial_centroids(&points, *k, seed);
            kmeans::kmeans(&points, &centroids, kmeans::MAX_ITERATIONS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use algoscope_steps::{ArrayStep, OptimizationStep};

    fn graph_request(algorithm: &str, generator: GeneratorType) -> RunRequest {
        RunRequest::Graph(GraphRequest {
            algorithm: algorithm.to_string(),
            generator,
            num_nodes: 8,
            weighted: None,
            seed: Some(5),
            start: 0,
            target: None,
        })
    }

    #[test]
    fn incompatible_pairing_is_refused() {
        let err = build(&graph_request("topological-sort", GeneratorType::Tree), 42).unwrap_err();
        assert!(matches!(err, Error::Graph(algoscope_graph::Error::Incompatible { .. })));
    }

    #[test]
    fn unknown_algorithm_fails_closed() {
        let err = build(&graph_request("quantum-sort", GeneratorType::Complete), 42).unwrap_err();
        assert!(matches!(err, Error::Graph(algoscope_graph::Error::UnknownAlgorithm(_))));
    }

    #[test]
    fn bellman_ford_on_weighted_random_runs_directed() {
        let run = build(&graph_request("bellman-ford", GeneratorType::WeightedRandom), 42).unwrap();
        assert!(run.graph.as_ref().unwrap().directed);
        assert!(matches!(run.stream.done(), Step::Optimization(OptimizationStep::Done { .. })));
    }

    #[test]
    fn other_pairings_keep_generator_output() {
        let run = build(&graph_request("prim-mst", GeneratorType::WeightedRandom), 42).unwrap();
        assert!(!run.graph.unwrap().directed);
    }

    #[test]
    fn topological_sort_on_dag_covers_every_node() {
        let run = build(&graph_request("topological-sort", GeneratorType::Dag), 42).unwrap();
        match run.stream.done() {
            Step::Optimization(OptimizationStep::Done { node, .. }) => assert_eq!(*node, 8),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn sorting_request_carries_input() {
        let request = RunRequest::Sorting { algorithm: SortAlgorithm::Bubble, input: vec![5, 3, 1] };
        let run = build(&request, 42).unwrap();
        assert_eq!(run.initial, InitialState::Array { array: vec![5, 3, 1] });
        assert_eq!(run.stream.done(), &Step::Array(ArrayStep::Done { array: vec![1, 3, 5] }));
    }

    #[test]
    fn red_black_delete_runs_on_built_tree() {
        let request = RunRequest::Tree {
            kind: TreeKind::RedBlack,
            values: vec![1, 2, 3],
            command: TreeCommand::Delete(2),
        };
        let run = build(&request, 42).unwrap();
        match run.stream.done() {
            Step::Tree(TreeStep::Done { tree, result, .. }) => {
                assert!(result.success);
                assert_eq!(tree.nodes.len(), 2);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn tree_starts_from_built_values() {
        let request = RunRequest::Tree {
            kind: TreeKind::Bst,
            values: vec![2, 1, 3],
            command: TreeCommand::Search(3),
        };
        match build(&request, 42).unwrap().initial {
            InitialState::Tree { tree } => assert_eq!(tree.nodes.len(), 3),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn hash_entries_are_preloaded() {
        let request = RunRequest::Hash {
            strategy: Strategy::Linear,
            size: 7,
            entries: vec![Entry { key: "a".into(), value: "1".into() }],
            command: HashCommand::Search { key: "a".into() },
        };
        match build(&request, 42).unwrap().initial {
            InitialState::Hash { table } => assert_eq!(table.get("a"), Some("1")),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn list_kind_reaches_initial_state() {
        let json = r#"{"category":"list","kind":"doubly","values":[1,2],"command":{"op":"reverse"}}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        match build(&request, 42).unwrap().initial {
            InitialState::List { list } => {
                assert_eq!(list.kind, ListKind::Doubly);
                assert!(list.nodes.iter().any(|n| n.prev.is_some()));
            }
            other => panic!("{other:?}"),
        }

        let json = r#"{"category":"list","values":[1,2],"command":{"op":"reverse"}}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(request, RunRequest::List { kind: ListKind::Singly, .. }));
    }

    #[test]
    fn ml_runs_are_seeded() {
        let request = RunRequest::Ml { model: MlRequest::KMeans { count: 30, k: 3 }, seed: None };
        let a = build(&request, 9).unwrap().stream;
        let b = build(&request, 9).unwrap().stream;
        let c = build(&request, 10).unwrap().stream;
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn knn_batch_request_scores_its_queries() {
        let json = r#"{"category":"ml","model":"knn_batch","count":30,"k":3,"queries":5}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        let stream = build(&request, 4).unwrap().stream;
        let votes = stream.iter().filter(|s| s.tag() == "vote").count();
        assert_eq!(votes, 5);
        match stream.done() {
            Step::Ml(algoscope_steps::MlStep::Done { metrics, .. }) => assert!(metrics.accuracy.is_some()),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn request_json_shape() {
        let json = r#"{"category":"graph","algorithm":"bfs","generator":"tree","num_nodes":6,"target":5}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(&request, RunRequest::Graph(g) if g.target == Some(5) && g.start == 0));

        let json = r#"{"category":"ml","model":"knn","count":20,"k":3,"query":{"x":0.5,"y":0.5}}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(request, RunRequest::Ml { model: MlRequest::Knn { k: 3, .. }, seed: None }));
    }
}
