//! State reconstruction.
//!
//! [`reconstruct`] rebuilds what a renderer draws at a cursor from the
//! initial state and the steps before the cursor. It never looks at an
//! earlier display, so the display at cursor `k` depends on `steps[..k]`
//! alone. Structures are rebuilt by replaying their structural steps from
//! the initial state. A `done` step replaces the replayed structure with the
//! authoritative one it carries.

use algoscope_graph::WeightedEdge;
use algoscope_steps::hash::{HashStats, HashTable};
use algoscope_steps::heap::{self, HeapResult};
use algoscope_steps::list::{ListArena, ListKind, ListNodeId, ListSnapshot, ListStats};
use algoscope_steps::ml::{Metrics, MlParams, Neighbor, Point, Region, VoteCount};
use algoscope_steps::optimization::FAILED;
use algoscope_steps::tree::{TreeArena, TreeNodeId, TreeResult, TreeSnapshot};
use algoscope_steps::{
    ArrayStep, HashStep, HeapStep, ListStep, MlStep, OptimizationResult, OptimizationStep, Step, TraversalStep,
    TreeStep,
};
use serde::{Deserialize, Serialize};

/// Input a stream starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum InitialState {
    Array { array: Vec<i64> },
    /// Graph traversal or optimization over `node_count` indexed nodes.
    Graph { node_count: usize },
    /// Grid pathfinding; cells are `row * cols + col`.
    Grid { rows: usize, cols: usize, walls: Vec<usize> },
    Tree { tree: TreeSnapshot },
    Heap { heap: Vec<i64> },
    Hash { table: HashTable },
    List { list: ListSnapshot },
    Ml,
}

/// Highlight class of a graph node or grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMark {
    Unvisited,
    Frontier,
    Visited,
    Current,
    Path,
    Wall,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArrayDisplay {
    pub array: Vec<i64>,
    /// Indices touched by the latest step.
    pub active: Vec<usize>,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphDisplay {
    /// One mark per node or cell.
    pub marks: Vec<NodeMark>,
    pub current: Option<usize>,
    pub visited: Vec<usize>,
    pub frontier: Vec<usize>,
    pub path: Vec<usize>,
    /// Edge under inspection.
    pub considering: Option<WeightedEdge>,
    pub selected: Vec<WeightedEdge>,
    pub distances: Vec<Option<i64>>,
    pub order: Vec<usize>,
    /// `None` until the run reports its outcome.
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeDisplay {
    pub tree: TreeSnapshot,
    /// Nodes on the current search path.
    pub path: Vec<TreeNodeId>,
    pub active: Option<TreeNodeId>,
    pub result: Option<TreeResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeapDisplay {
    pub heap: Vec<i64>,
    pub active: Vec<usize>,
    pub result: Option<HeapResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashDisplay {
    pub table: HashTable,
    /// Bucket the latest step touched.
    pub active: Option<usize>,
    pub probes: Vec<usize>,
    pub stats: Option<HashStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListDisplay {
    pub kind: ListKind,
    pub list: ListSnapshot,
    pub active: Option<ListNodeId>,
    pub stats: Option<ListStats>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MlDisplay {
    pub params: Option<MlParams>,
    /// Loss after each gradient step so far.
    pub losses: Vec<f64>,
    pub iteration: usize,
    pub neighbors: Vec<Neighbor>,
    pub votes: Vec<VoteCount>,
    pub regions: Vec<Region>,
    pub assignments: Vec<usize>,
    pub centroids: Vec<Point>,
    pub metrics: Option<Metrics>,
}

/// Family-specific snapshot at a cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DisplayState {
    Array(ArrayDisplay),
    Graph(GraphDisplay),
    Tree(TreeDisplay),
    Heap(HeapDisplay),
    Hash(HashDisplay),
    List(ListDisplay),
    Ml(MlDisplay),
}

/// Rebuild the display from `initial` and `steps`. Steps from a family other
/// than the initial state's are skipped.
pub fn reconstruct(initial: &InitialState, steps: &[Step]) -> DisplayState {
    match initial {
        InitialState::Array { array } => DisplayState::Array(array_display(array, steps)),
        InitialState::Graph { node_count } => DisplayState::Graph(graph_display(*node_count, &[], steps)),
        InitialState::Grid { rows, cols, walls } => DisplayState::Graph(graph_display(rows * cols, walls, steps)),
        InitialState::Tree { tree } => DisplayState::Tree(tree_display(tree, steps)),
        InitialState::Heap { heap } => DisplayState::Heap(heap_display(heap, steps)),
        InitialState::Hash { table } => DisplayState::Hash(hash_display(table, steps)),
        InitialState::List { list } => DisplayState::List(list_display(list, steps)),
        InitialState::Ml => DisplayState::Ml(ml_display(steps)),
    }
}

fn array_display(initial: &[i64], steps: &[Step]) -> ArrayDisplay {
    let mut display = ArrayDisplay { array: initial.to_vec(), ..ArrayDisplay::default() };
    for step in steps {
        let Step::Array(step) = step else { continue };
        match step {
            ArrayStep::Compare { i, j } => display.active = vec![*i, *j],
            ArrayStep::Swap { i, j } => {
                if *i < display.array.len() && *j < display.array.len() {
                    display.array.swap(*i, *j);
                }
                display.active = vec![*i, *j];
            }
            ArrayStep::Overwrite { index, value } => {
                if let Some(slot) = display.array.get_mut(*index) {
                    *slot = *value;
                }
                display.active = vec![*index];
            }
            ArrayStep::Done { array } => {
                display.array = array.clone();
                display.active.clear();
                display.finished = true;
            }
        }
    }
    display
}

fn graph_display(node_count: usize, walls: &[usize], steps: &[Step]) -> GraphDisplay {
    let mut display = GraphDisplay::default();
    for step in steps {
        match step {
            Step::Traversal(step) => apply_traversal(&mut display, step),
            Step::Optimization(step) => apply_optimization(&mut display, step),
            _ => {}
        }
    }

    display.marks = (0..node_count)
        .map(|i| {
            if walls.contains(&i) {
                NodeMark::Wall
            } else if display.path.contains(&i) {
                NodeMark::Path
            } else if display.current == Some(i) {
                NodeMark::Current
            } else if display.visited.contains(&i) {
                NodeMark::Visited
            } else if display.frontier.contains(&i) {
                NodeMark::Frontier
            } else {
                NodeMark::Unvisited
            }
        })
        .collect();
    display
}

fn apply_traversal(display: &mut GraphDisplay, step: &TraversalStep) {
    match step {
        TraversalStep::Visit { node, visited, frontier } => {
            display.current = Some(*node);
            display.visited = visited.clone();
            display.frontier = frontier.clone();
        }
        TraversalStep::Frontier { visited, frontier, .. } => {
            display.visited = visited.clone();
            display.frontier = frontier.clone();
        }
        TraversalStep::Found { node, path } => {
            display.current = Some(*node);
            display.path = path.clone();
        }
        TraversalStep::NotFound => display.success = Some(false),
        TraversalStep::Done { found, order, path } => {
            display.current = None;
            display.frontier.clear();
            display.order = order.clone();
            display.path = path.clone();
            display.success = Some(*found);
        }
    }
}

fn apply_optimization(display: &mut GraphDisplay, step: &OptimizationStep) {
    match step {
        OptimizationStep::Visit { node, visited } => {
            display.current = Some(*node);
            display.visited = visited.clone();
        }
        OptimizationStep::EdgeConsider { from, to, weight } => {
            display.considering = Some(WeightedEdge::new(*from, *to, *weight));
        }
        OptimizationStep::EdgeSelect { selected, .. } => {
            display.considering = None;
            display.selected = selected.clone();
        }
        OptimizationStep::Relax { node, distances, .. } => {
            display.current = Some(*node);
            display.distances = distances.clone();
        }
        OptimizationStep::TopoOrder { node, order } => {
            display.current = Some(*node);
            display.order = order.clone();
        }
        OptimizationStep::Done { node, result } => {
            display.current = None;
            display.considering = None;
            display.success = Some(*node != FAILED);
            match result {
                OptimizationResult::SpanningTree { selected, .. } => display.selected = selected.clone(),
                OptimizationResult::Distances { distances, path, .. } => {
                    display.distances = distances.clone();
                    display.path = path.clone();
                }
                OptimizationResult::Order { order } => display.order = order.clone(),
            }
        }
    }
}

fn tree_display(initial: &TreeSnapshot, steps: &[Step]) -> TreeDisplay {
    let mut arena = TreeArena::from_snapshot(initial);
    let mut display = TreeDisplay::default();
    let mut authoritative = None;

    for step in steps {
        let Step::Tree(step) = step else { continue };
        arena.apply(step);
        match step {
            TreeStep::Compare { node, path, .. }
            | TreeStep::Insert { node, path, .. }
            | TreeStep::Delete { node, path, .. } => {
                display.active = Some(*node);
                display.path = path.clone();
            }
            TreeStep::Search { node, path, .. } => {
                display.active = *node;
                display.path = path.clone();
            }
            TreeStep::UpdateHeight { node, .. }
            | TreeStep::BalanceCheck { node, .. }
            | TreeStep::CheckBounds { node, .. }
            | TreeStep::CheckBalance { node, .. }
            | TreeStep::CheckColor { node, .. }
            | TreeStep::RotateLeft { node }
            | TreeStep::RotateRight { node }
            | TreeStep::RotateLeftRight { node }
            | TreeStep::RotateRightLeft { node }
            | TreeStep::Recolor { node, .. } => display.active = Some(*node),
            TreeStep::FixViolation { node, parent, .. } => display.active = node.or(Some(*parent)),
            TreeStep::Done { tree, result, .. } => {
                display.active = None;
                display.result = Some(result.clone());
                authoritative = Some(tree.clone());
            }
        }
    }

    display.tree = authoritative.unwrap_or_else(|| arena.snapshot());
    display
}

fn heap_display(initial: &[i64], steps: &[Step]) -> HeapDisplay {
    let mut display = HeapDisplay { heap: initial.to_vec(), ..HeapDisplay::default() };
    for step in steps {
        let Step::Heap(step) = step else { continue };
        heap::apply(&mut display.heap, step);
        match step {
            HeapStep::Insert { index, .. } => display.active = vec![*index],
            HeapStep::Compare { i, j } | HeapStep::Swap { i, j } => display.active = vec![*i, *j],
            HeapStep::Heapify { index, .. } => display.active = vec![*index],
            HeapStep::Extract { .. } => display.active = vec![0],
            HeapStep::Done { heap, result, .. } => {
                display.heap = heap.clone();
                display.active.clear();
                display.result = Some(result.clone());
            }
        }
    }
    display
}

fn hash_display(initial: &HashTable, steps: &[Step]) -> HashDisplay {
    let mut display = HashDisplay {
        table: initial.clone(),
        active: None,
        probes: Vec::new(),
        stats: None,
    };
    for step in steps {
        let Step::Hash(step) = step else { continue };
        display.table.apply(step);
        match step {
            HashStep::Hash { index, .. } => {
                display.active = Some(*index);
                display.probes.clear();
            }
            HashStep::Collision { index, .. } | HashStep::Insert { index, .. } | HashStep::Delete { index, .. } => {
                display.active = Some(*index);
            }
            HashStep::Probe { indexes, .. } => {
                display.active = indexes.last().copied();
                display.probes = indexes.clone();
            }
            HashStep::Search { index, .. } => display.active = *index,
            HashStep::Done { table, stats, .. } => {
                display.table = table.clone();
                display.stats = Some(stats.clone());
            }
        }
    }
    display
}

fn list_display(initial: &ListSnapshot, steps: &[Step]) -> ListDisplay {
    let mut arena = ListArena::from_snapshot(initial);
    let mut display = ListDisplay { kind: initial.kind, ..ListDisplay::default() };
    let mut authoritative = None;

    for step in steps {
        let Step::List(step) = step else { continue };
        arena.apply(step);
        match step {
            ListStep::Visit { node, .. }
            | ListStep::Compare { node, .. }
            | ListStep::Insert { node, .. }
            | ListStep::Reverse { node, .. }
            | ListStep::SetPrev { node, .. } => display.active = Some(*node),
            ListStep::Delete { prev, .. } => display.active = *prev,
            ListStep::Search { node, .. } => display.active = *node,
            ListStep::Done { list, stats, .. } => {
                display.active = None;
                display.stats = Some(stats.clone());
                authoritative = Some(list.clone());
            }
        }
    }

    display.list = authoritative.unwrap_or_else(|| arena.snapshot());
    display
}

fn ml_display(steps: &[Step]) -> MlDisplay {
    let mut display = MlDisplay::default();
    for step in steps {
        let Step::Ml(step) = step else { continue };
        match step {
            MlStep::Init { params } => {
                if let MlParams::KMeans { centroids, .. } = params {
                    display.centroids = centroids.clone();
                }
                display.params = Some(params.clone());
            }
            MlStep::Gradient { params, loss, iteration } => {
                display.params = Some(params.clone());
                display.losses.push(*loss);
                display.iteration = *iteration;
            }
            MlStep::Distances { neighbors, .. } => display.neighbors = neighbors.clone(),
            MlStep::Vote { votes, .. } => display.votes = votes.clone(),
            MlStep::Split { .. } => {}
            MlStep::Partition { regions } => display.regions = regions.clone(),
            MlStep::Assign { iteration, assignments } => {
                display.iteration = *iteration;
                display.assignments = assignments.clone();
            }
            MlStep::Update { iteration, centroids } => {
                display.iteration = *iteration;
                display.centroids = centroids.clone();
            }
            MlStep::Done { params, metrics } => {
                if let MlParams::KMeans { centroids, .. } = params {
                    display.centroids = centroids.clone();
                }
                display.params = Some(params.clone());
                display.metrics = Some(metrics.clone());
            }
        }
    }
    display
}
