//! Step vocabulary.
//!
//! Every algorithm family has its own closed set of step shapes. [`Step`]
//! wraps the families so that one controller can buffer and replay any of
//! them. Each family has exactly one terminal variant, `Done`, which carries
//! the authoritative final state of the run.
//!
//! On the wire a step is a flat object tagged twice:
//! `{"family": "array", "type": "swap", "i": 0, "j": 1}`.

use algoscope_graph::WeightedEdge;
use serde::{Deserialize, Serialize};

use crate::hash::{HashOperation, HashStats, HashTable};
use crate::heap::{HeapOperation, HeapResult};
use crate::list::{ListNodeId, ListOperation, ListSnapshot, ListStats};
use crate::ml::{Metrics, MlParams, Neighbor, Point, Region, VoteCount};
use crate::tree::{Color, Side, TreeNodeId, TreeOperation, TreeResult, TreeSnapshot};

/// Algorithm families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Array,
    Traversal,
    Optimization,
    Tree,
    Heap,
    Hash,
    List,
    Ml,
}

/// One discrete transition of an algorithm run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Step {
    Array(ArrayStep),
    Traversal(TraversalStep),
    Optimization(OptimizationStep),
    Tree(TreeStep),
    Heap(HeapStep),
    Hash(HashStep),
    List(ListStep),
    Ml(MlStep),
}

impl Step {
    pub fn family(&self) -> Family {
        match self {
            Step::Array(_) => Family::Array,
            Step::Traversal(_) => Family::Traversal,
            Step::Optimization(_) => Family::Optimization,
            Step::Tree(_) => Family::Tree,
            Step::Heap(_) => Family::Heap,
            Step::Hash(_) => Family::Hash,
            Step::List(_) => Family::List,
            Step::Ml(_) => Family::Ml,
        }
    }

    /// Whether this is the terminal step of its stream.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            Step::Array(ArrayStep::Done { .. })
                | Step::Traversal(TraversalStep::Done { .. })
                | Step::Optimization(OptimizationStep::Done { .. })
                | Step::Tree(TreeStep::Done { .. })
                | Step::Heap(HeapStep::Done { .. })
                | Step::Hash(HashStep::Done { .. })
                | Step::List(ListStep::Done { .. })
                | Step::Ml(MlStep::Done { .. })
        )
    }

    /// Wire tag of the inner variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Step::Array(s) => s.tag(),
            Step::Traversal(s) => s.tag(),
            Step::Optimization(s) => s.tag(),
            Step::Tree(s) => s.tag(),
            Step::Heap(s) => s.tag(),
            Step::Hash(s) => s.tag(),
            Step::List(s) => s.tag(),
            Step::Ml(s) => s.tag(),
        }
    }
}

macro_rules! family_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Step {
                fn from(step: $ty) -> Self {
                    Step::$variant(step)
                }
            }
        )*
    };
}

family_from! {
    Array => ArrayStep,
    Traversal => TraversalStep,
    Optimization => OptimizationStep,
    Tree => TreeStep,
    Heap => HeapStep,
    Hash => HashStep,
    List => ListStep,
    Ml => MlStep,
}

/// Sorting over an integer array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArrayStep {
    Compare { i: usize, j: usize },
    Swap { i: usize, j: usize },
    Overwrite { index: usize, value: i64 },
    Done { array: Vec<i64> },
}

impl ArrayStep {
    pub fn tag(&self) -> &'static str {
        match self {
            ArrayStep::Compare { .. } => "compare",
            ArrayStep::Swap { .. } => "swap",
            ArrayStep::Overwrite { .. } => "overwrite",
            ArrayStep::Done { .. } => "done",
        }
    }
}

/// Graph and grid traversal. Nodes are 0-based indices; grid cells are
/// `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraversalStep {
    /// `node` was taken off the frontier.
    Visit {
        node: usize,
        visited: Vec<usize>,
        frontier: Vec<usize>,
    },
    /// `node` was discovered and added to the frontier.
    Frontier {
        node: usize,
        visited: Vec<usize>,
        frontier: Vec<usize>,
    },
    Found { node: usize, path: Vec<usize> },
    NotFound,
    Done {
        found: bool,
        /// Visit order.
        order: Vec<usize>,
        path: Vec<usize>,
    },
}

impl TraversalStep {
    pub fn tag(&self) -> &'static str {
        match self {
            TraversalStep::Visit { .. } => "visit",
            TraversalStep::Frontier { .. } => "frontier",
            TraversalStep::Found { .. } => "found",
            TraversalStep::NotFound => "not_found",
            TraversalStep::Done { .. } => "done",
        }
    }
}

/// Final result carried by an optimization `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizationResult {
    SpanningTree {
        selected: Vec<WeightedEdge>,
        total_weight: i64,
    },
    Distances {
        distances: Vec<Option<i64>>,
        path: Vec<usize>,
        found: bool,
    },
    Order { order: Vec<usize> },
}

/// Spanning trees, shortest paths and orderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizationStep {
    Visit { node: usize, visited: Vec<usize> },
    EdgeConsider { from: usize, to: usize, weight: i64 },
    EdgeSelect {
        from: usize,
        to: usize,
        weight: i64,
        selected: Vec<WeightedEdge>,
    },
    Relax {
        node: usize,
        from: usize,
        weight: i64,
        distances: Vec<Option<i64>>,
    },
    TopoOrder { node: usize, order: Vec<usize> },
    /// `node` is `-1` when the run failed (cycle, negative cycle, unreachable
    /// target) and otherwise the number of nodes the result covers.
    Done { node: i64, result: OptimizationResult },
}

impl OptimizationStep {
    pub fn tag(&self) -> &'static str {
        match self {
            OptimizationStep::Visit { .. } => "visit",
            OptimizationStep::EdgeConsider { .. } => "edge_consider",
            OptimizationStep::EdgeSelect { .. } => "edge_select",
            OptimizationStep::Relax { .. } => "relax",
            OptimizationStep::TopoOrder { .. } => "topo_order",
            OptimizationStep::Done { .. } => "done",
        }
    }
}

/// Binary search tree mutation.
///
/// Structural variants (`insert`, `delete`, `update_height`, `rotate_*`,
/// `recolor`) fully describe their effect, so a tree at any cursor can be
/// rebuilt by applying them to the initial tree in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeStep {
    Compare {
        node: TreeNodeId,
        value: i64,
        path: Vec<TreeNodeId>,
    },
    Insert {
        node: TreeNodeId,
        value: i64,
        parent: Option<TreeNodeId>,
        side: Option<Side>,
        color: Color,
        path: Vec<TreeNodeId>,
    },
    /// Removes `node`; with a `successor`, `node` takes its value and the
    /// successor is removed instead.
    Delete {
        node: TreeNodeId,
        parent: Option<TreeNodeId>,
        successor: Option<TreeNodeId>,
        path: Vec<TreeNodeId>,
    },
    Search {
        node: Option<TreeNodeId>,
        found: bool,
        path: Vec<TreeNodeId>,
    },
    UpdateHeight {
        node: TreeNodeId,
        old_height: i32,
        new_height: i32,
    },
    BalanceCheck {
        node: TreeNodeId,
        balance: i32,
        needs_rotation: bool,
    },
    CheckBounds {
        node: TreeNodeId,
        min: Option<i64>,
        max: Option<i64>,
        valid: bool,
    },
    /// AVL check of one node, children first.
    CheckBalance {
        node: TreeNodeId,
        balance: i32,
        stored_height: i32,
        actual_height: i32,
        valid: bool,
    },
    /// Red-black check of one node, children first. `black_height` is
    /// counted through the left subtree.
    CheckColor {
        node: TreeNodeId,
        color: Color,
        black_height: usize,
        valid: bool,
    },
    RotateLeft { node: TreeNodeId },
    RotateRight { node: TreeNodeId },
    RotateLeftRight { node: TreeNodeId },
    RotateRightLeft { node: TreeNodeId },
    Recolor { node: TreeNodeId, color: Color },
    /// One round of red-black repair. Inserts name the red `node` and its
    /// `uncle`; deletes name the doubly-black position (`None` for an empty
    /// leaf) and its `sibling`.
    FixViolation {
        node: Option<TreeNodeId>,
        parent: TreeNodeId,
        #[serde(default)]
        uncle: Option<TreeNodeId>,
        #[serde(default)]
        sibling: Option<TreeNodeId>,
    },
    Done {
        tree: TreeSnapshot,
        operation: TreeOperation,
        result: TreeResult,
    },
}

impl TreeStep {
    pub fn tag(&self) -> &'static str {
        match self {
            TreeStep::Compare { .. } => "compare",
            TreeStep::Insert { .. } => "insert",
            TreeStep::Delete { .. } => "delete",
            TreeStep::Search { .. } => "search",
            TreeStep::UpdateHeight { .. } => "update_height",
            TreeStep::BalanceCheck { .. } => "balance_check",
            TreeStep::CheckBounds { .. } => "check_bounds",
            TreeStep::CheckBalance { .. } => "check_balance",
            TreeStep::CheckColor { .. } => "check_color",
            TreeStep::RotateLeft { .. } => "rotate_left",
            TreeStep::RotateRight { .. } => "rotate_right",
            TreeStep::RotateLeftRight { .. } => "rotate_left_right",
            TreeStep::RotateRightLeft { .. } => "rotate_right_left",
            TreeStep::Recolor { .. } => "recolor",
            TreeStep::FixViolation { .. } => "fix_violation",
            TreeStep::Done { .. } => "done",
        }
    }
}

/// Array-backed max-heap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeapStep {
    /// Push `value` at the end of the heap (`index == len`).
    Insert { index: usize, value: i64 },
    Compare { i: usize, j: usize },
    Swap { i: usize, j: usize },
    /// Sift-down starts at `index`.
    Heapify { index: usize, value: i64 },
    /// Remove the root; the last element moves into its place.
    Extract { value: i64 },
    Done {
        heap: Vec<i64>,
        operation: HeapOperation,
        result: HeapResult,
    },
}

impl HeapStep {
    pub fn tag(&self) -> &'static str {
        match self {
            HeapStep::Insert { .. } => "insert",
            HeapStep::Compare { .. } => "compare",
            HeapStep::Swap { .. } => "swap",
            HeapStep::Heapify { .. } => "heapify",
            HeapStep::Extract { .. } => "extract",
            HeapStep::Done { .. } => "done",
        }
    }
}

/// Hash table operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HashStep {
    Hash { key: String, index: usize },
    Collision { key: String, index: usize },
    Probe { key: String, indexes: Vec<usize> },
    Insert { key: String, value: String, index: usize },
    Search {
        key: String,
        index: Option<usize>,
        found: bool,
    },
    Delete { key: String, index: usize },
    Done {
        table: HashTable,
        operation: HashOperation,
        stats: HashStats,
    },
}

impl HashStep {
    pub fn tag(&self) -> &'static str {
        match self {
            HashStep::Hash { .. } => "hash",
            HashStep::Collision { .. } => "collision",
            HashStep::Probe { .. } => "probe",
            HashStep::Insert { .. } => "insert",
            HashStep::Search { .. } => "search",
            HashStep::Delete { .. } => "delete",
            HashStep::Done { .. } => "done",
        }
    }
}

/// Singly and doubly linked list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListStep {
    /// Pointer walk reached `node` at position `index`.
    Visit { node: ListNodeId, index: usize },
    Compare {
        node: ListNodeId,
        value: i64,
        target: i64,
    },
    /// Link a new node after `after`, or at the head.
    Insert {
        node: ListNodeId,
        value: i64,
        after: Option<ListNodeId>,
        index: usize,
    },
    /// Unlink `node`, whose predecessor is `prev`.
    Delete {
        node: ListNodeId,
        prev: Option<ListNodeId>,
        index: usize,
    },
    Search {
        node: Option<ListNodeId>,
        index: Option<usize>,
        found: bool,
    },
    /// Point `node` at `next` and make it the head of the reversed prefix.
    Reverse { node: ListNodeId, next: Option<ListNodeId> },
    /// Repoint the backward link of `node` (doubly linked lists only).
    SetPrev { node: ListNodeId, prev: Option<ListNodeId> },
    Done {
        list: ListSnapshot,
        operation: ListOperation,
        stats: ListStats,
    },
}

impl ListStep {
    pub fn tag(&self) -> &'static str {
        match self {
            ListStep::Visit { .. } => "visit",
            ListStep::Compare { .. } => "compare",
            ListStep::Insert { .. } => "insert",
            ListStep::Delete { .. } => "delete",
            ListStep::Search { .. } => "search",
            ListStep::Reverse { .. } => "reverse",
            ListStep::SetPrev { .. } => "set_prev",
            ListStep::Done { .. } => "done",
        }
    }
}

/// Iterative model fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MlStep {
    Init { params: MlParams },
    Gradient {
        params: MlParams,
        loss: f64,
        iteration: usize,
    },
    Distances { query: Point, neighbors: Vec<Neighbor> },
    Vote {
        votes: Vec<VoteCount>,
        prediction: u32,
        confidence: f64,
    },
    Split {
        depth: usize,
        feature: usize,
        threshold: f64,
        gain: f64,
        samples: usize,
    },
    Partition { regions: Vec<Region> },
    Assign { iteration: usize, assignments: Vec<usize> },
    Update { iteration: usize, centroids: Vec<Point> },
    Done { params: MlParams, metrics: Metrics },
}

impl MlStep {
    pub fn tag(&self) -> &'static str {
        match self {
            MlStep::Init { .. } => "init",
            MlStep::Gradient { .. } => "gradient",
            MlStep::Distances { .. } => "distances",
            MlStep::Vote { .. } => "vote",
            MlStep::Split { .. } => "split",
            MlStep::Partition { .. } => "partition",
            MlStep::Assign { .. } => "assign",
            MlStep::Update { .. } => "update",
            MlStep::Done { .. } => "done",
        }
    }
}
