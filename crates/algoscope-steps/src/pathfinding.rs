//! Shortest-path search on a rectangular grid with walls.
//!
//! Cells are addressed as `row * cols + col` and emitted through the
//! traversal family. Moves are 4-directional in the fixed order down, up,
//! right, left.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::step::TraversalStep;
use crate::stream::{Recorder, StepStream};
use crate::traversal::trace_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    /// Blocked cell indexes.
    #[serde(default)]
    pub walls: BTreeSet<usize>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, walls: BTreeSet::new() }
    }

    pub fn with_walls(mut self, walls: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let cols = self.cols;
        self.walls.extend(walls.into_iter().map(|(r, c)| r * cols + c));
        self
    }

    pub fn cell(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn coords(&self, cell: usize) -> (usize, usize) {
        (cell / self.cols.max(1), cell % self.cols.max(1))
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_open(&self, cell: usize) -> bool {
        cell < self.len() && !self.walls.contains(&cell)
    }

    /// Open neighbors of `cell` in move order.
    pub fn neighbors(&self, cell: usize) -> Vec<usize> {
        let (r, c) = self.coords(cell);
        let mut out = Vec::with_capacity(4);
        if r + 1 < self.rows {
            out.push(self.cell(r + 1, c));
        }
        if r > 0 {
            out.push(self.cell(r - 1, c));
        }
        if c + 1 < self.cols {
            out.push(self.cell(r, c + 1));
        }
        if c > 0 {
            out.push(self.cell(r, c - 1));
        }
        out.retain(|&n| self.is_open(n));
        out
    }

    pub fn manhattan(&self, a: usize, b: usize) -> usize {
        let (ar, ac) = self.coords(a);
        let (br, bc) = self.coords(b);
        ar.abs_diff(br) + ac.abs_diff(bc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridAlgorithm {
    Bfs,
    Dfs,
    Dijkstra,
    AStar,
    Greedy,
}

impl GridAlgorithm {
    pub const ALL: [GridAlgorithm; 5] = [
        GridAlgorithm::Bfs,
        GridAlgorithm::Dfs,
        GridAlgorithm::Dijkstra,
        GridAlgorithm::AStar,
        GridAlgorithm::Greedy,
    ];

    pub fn run(&self, grid: &Grid, start: usize, goal: usize) -> StepStream {
        match self {
            GridAlgorithm::Bfs => grid_bfs(grid, start, goal),
            GridAlgorithm::Dfs => grid_dfs(grid, start, goal),
            GridAlgorithm::Dijkstra => grid_dijkstra(grid, start, goal),
            GridAlgorithm::AStar => grid_astar(grid, start, goal),
            GridAlgorithm::Greedy => grid_greedy(grid, start, goal),
        }
    }
}

struct Search {
    rec: Recorder,
    closed: Vec<bool>,
    order: Vec<usize>,
    predecessors: Vec<Option<usize>>,
    reached: Vec<bool>,
}

impl Search {
    fn new(len: usize) -> Self {
        Self {
            rec: Recorder::new(),
            closed: vec![false; len],
            order: Vec::new(),
            predecessors: vec![None; len],
            reached: vec![false; len],
        }
    }

    /// Close `cell`; false if it was already closed.
    fn close(&mut self, cell: usize, frontier: Vec<usize>) -> bool {
        if self.closed[cell] {
            return false;
        }
        self.closed[cell] = true;
        self.order.push(cell);
        self.rec.emit(TraversalStep::Visit {
            node: cell,
            visited: self.order.clone(),
            frontier,
        });
        true
    }

    fn found(mut self, goal: usize) -> StepStream {
        let path = trace_path(&self.predecessors, goal);
        self.rec.emit(TraversalStep::Found { node: goal, path: path.clone() });
        self.rec.finish(TraversalStep::Done { found: true, order: self.order, path })
    }

    fn not_found(mut self) -> StepStream {
        self.rec.emit(TraversalStep::NotFound);
        self.rec.finish(TraversalStep::Done {
            found: false,
            order: self.order,
            path: Vec::new(),
        })
    }
}

fn endpoints_open(grid: &Grid, start: usize, goal: usize) -> bool {
    grid.is_open(start) && goal < grid.len()
}

pub fn grid_bfs(grid: &Grid, start: usize, goal: usize) -> StepStream {
    let mut search = Search::new(grid.len());
    if !endpoints_open(grid, start, goal) {
        return search.not_found();
    }
    let mut queue = VecDeque::from([start]);
    search.reached[start] = true;

    while let Some(cell) = queue.pop_front() {
        search.close(cell, queue.iter().copied().collect());
        if cell == goal {
            return search.found(goal);
        }
        for next in grid.neighbors(cell) {
            if !search.reached[next] {
                search.reached[next] = true;
                search.predecessors[next] = Some(cell);
                queue.push_back(next);
            }
        }
    }
    search.not_found()
}

/// Depth-first search. Neighbors are pushed in reverse so they pop in move
/// order; a cell's parent is fixed by whichever cell pushed it first.
pub fn grid_dfs(grid: &Grid, start: usize, goal: usize) -> StepStream {
    let mut search = Search::new(grid.len());
    if !endpoints_open(grid, start, goal) {
        return search.not_found();
    }
    let mut stack = vec![start];
    search.reached[start] = true;

    while let Some(cell) = stack.pop() {
        if !search.close(cell, stack.clone()) {
            continue;
        }
        if cell == goal {
            return search.found(goal);
        }
        for next in grid.neighbors(cell).into_iter().rev() {
            if !search.closed[next] && !search.reached[next] {
                search.reached[next] = true;
                search.predecessors[next] = Some(cell);
                stack.push(next);
            }
        }
    }
    search.not_found()
}

/// Best-first search keyed by `priority(g, cell)`. With `improve_only`
/// a cell is re-queued whenever a cheaper path is found; otherwise only its
/// first discovery counts.
fn best_first(
    grid: &Grid,
    start: usize,
    goal: usize,
    improve_only: bool,
    priority: impl Fn(usize, usize) -> usize,
) -> StepStream {
    let mut search = Search::new(grid.len());
    if !endpoints_open(grid, start, goal) {
        return search.not_found();
    }
    let mut g_score: Vec<Option<usize>> = vec![None; grid.len()];
    g_score[start] = Some(0);
    search.reached[start] = true;
    let mut open: Vec<(usize, usize, usize)> = vec![(priority(0, start), 0, start)];

    while !open.is_empty() {
        // Stable: equal priorities keep insertion order.
        open.sort_by_key(|&(p, _, _)| p);
        let (_, g, cell) = open.remove(0);
        if !search.close(cell, open.iter().map(|&(_, _, c)| c).collect()) {
            continue;
        }
        if cell == goal {
            return search.found(goal);
        }
        for next in grid.neighbors(cell) {
            if search.closed[next] {
                continue;
            }
            let tentative = g + 1;
            let better = if improve_only {
                g_score[next].map_or(true, |best| tentative < best)
            } else {
                !search.reached[next]
            };
            if !better {
                continue;
            }
            g_score[next] = Some(tentative);
            search.reached[next] = true;
            search.predecessors[next] = Some(cell);
            open.push((priority(tentative, next), tentative, next));
        }
    }
    search.not_found()
}

/// Dijkstra with unit step cost.
pub fn grid_dijkstra(grid: &Grid, start: usize, goal: usize) -> StepStream {
    best_first(grid, start, goal, true, |g, _| g)
}

/// A* with the Manhattan heuristic.
pub fn grid_astar(grid: &Grid, start: usize, goal: usize) -> StepStream {
    best_first(grid, start, goal, true, |g, cell| g + grid.manhattan(cell, goal))
}

/// Greedy best-first with the Manhattan heuristic; ignores path cost.
pub fn grid_greedy(grid: &Grid, start: usize, goal: usize) -> StepStream {
    best_first(grid, start, goal, false, |_, cell| grid.manhattan(cell, goal))
}
