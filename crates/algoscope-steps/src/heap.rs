//! Array-backed binary max-heap.
//!
//! Node `i` has children `2i + 1` and `2i + 2`. Every producer works on a
//! private copy of its input; the heap at any cursor is the input with the
//! recorded `insert`, `swap` and `extract` steps applied in order.

use serde::{Deserialize, Serialize};

use crate::step::HeapStep;
use crate::stream::{Recorder, StepStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeapOperation {
    Insert,
    Extract,
    Build,
    Sort,
    Validate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapResult {
    pub success: bool,
    /// Inserted or extracted value.
    pub value: Option<i64>,
    pub size: usize,
    /// Ascending output of a heap sort.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sorted: Vec<i64>,
    /// Parent index of the first ordering violation found by validate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_at: Option<usize>,
}

/// One requested heap operation. `build` and `sort` ignore the current heap
/// and start from `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HeapCommand {
    Insert { value: i64 },
    Extract,
    Build { values: Vec<i64> },
    Sort { values: Vec<i64> },
    Validate,
}

impl HeapCommand {
    pub fn run(&self, heap: &[i64]) -> StepStream {
        match self {
            HeapCommand::Insert { value } => insert(heap, *value),
            HeapCommand::Extract => extract_max(heap),
            HeapCommand::Build { values } => build(values),
            HeapCommand::Sort { values } => sort(values),
            HeapCommand::Validate => validate(heap),
        }
    }

    /// Heap the stream starts from.
    pub fn initial(&self, heap: &[i64]) -> Vec<i64> {
        match self {
            HeapCommand::Build { values } | HeapCommand::Sort { values } => values.clone(),
            _ => heap.to_vec(),
        }
    }
}

/// Apply a heap step to `heap`. Non-structural steps are ignored.
pub fn apply(heap: &mut Vec<i64>, step: &HeapStep) {
    match step {
        HeapStep::Insert { value, .. } => heap.push(*value),
        HeapStep::Swap { i, j } => {
            if *i < heap.len() && *j < heap.len() {
                heap.swap(*i, *j);
            }
        }
        HeapStep::Extract { .. } => {
            if let Some(last) = heap.pop() {
                if let Some(root) = heap.first_mut() {
                    *root = last;
                }
            }
        }
        HeapStep::Compare { .. } | HeapStep::Heapify { .. } | HeapStep::Done { .. } => {}
    }
}

struct HeapRun {
    heap: Vec<i64>,
    rec: Recorder,
}

impl HeapRun {
    fn new(heap: &[i64]) -> Self {
        Self { heap: heap.to_vec(), rec: Recorder::new() }
    }

    fn commit(&mut self, step: HeapStep) {
        apply(&mut self.heap, &step);
        self.rec.emit(step);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            self.rec.emit(HeapStep::Compare { i, j: parent });
            if self.heap[i] <= self.heap[parent] {
                break;
            }
            self.commit(HeapStep::Swap { i, j: parent });
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let (l, r) = (2 * i + 1, 2 * i + 2);
            let mut largest = i;
            if l < n {
                self.rec.emit(HeapStep::Compare { i: largest, j: l });
                if self.heap[l] > self.heap[largest] {
                    largest = l;
                }
            }
            if r < n {
                self.rec.emit(HeapStep::Compare { i: largest, j: r });
                if self.heap[r] > self.heap[largest] {
                    largest = r;
                }
            }
            if largest == i {
                break;
            }
            self.commit(HeapStep::Swap { i, j: largest });
            i = largest;
        }
    }

    /// Floyd's bottom-up construction.
    fn heapify_all(&mut self) {
        for i in (0..self.heap.len() / 2).rev() {
            self.rec.emit(HeapStep::Heapify { index: i, value: self.heap[i] });
            self.sift_down(i);
        }
    }

    fn extract_max(&mut self) -> Option<i64> {
        let max = *self.heap.first()?;
        self.commit(HeapStep::Extract { value: max });
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(max)
    }

    fn finish(self, operation: HeapOperation, result: HeapResult) -> StepStream {
        self.rec.finish(HeapStep::Done { heap: self.heap, operation, result })
    }
}

pub fn insert(heap: &[i64], value: i64) -> StepStream {
    let mut run = HeapRun::new(heap);
    let index = run.heap.len();
    run.commit(HeapStep::Insert { index, value });
    run.sift_up(index);
    let size = run.heap.len();
    run.finish(
        HeapOperation::Insert,
        HeapResult { success: true, value: Some(value), size, ..HeapResult::default() },
    )
}

/// Remove the maximum. An empty heap yields an unsuccessful `done`.
pub fn extract_max(heap: &[i64]) -> StepStream {
    let mut run = HeapRun::new(heap);
    let value = run.extract_max();
    let size = run.heap.len();
    run.finish(
        HeapOperation::Extract,
        HeapResult { success: value.is_some(), value, size, ..HeapResult::default() },
    )
}

pub fn build(values: &[i64]) -> StepStream {
    let mut run = HeapRun::new(values);
    run.heapify_all();
    let size = run.heap.len();
    run.finish(HeapOperation::Build, HeapResult { success: true, size, ..HeapResult::default() })
}

/// Build a heap, then extract until empty.
pub fn sort(values: &[i64]) -> StepStream {
    let mut run = HeapRun::new(values);
    run.heapify_all();
    let mut sorted = Vec::with_capacity(values.len());
    while let Some(max) = run.extract_max() {
        sorted.push(max);
    }
    sorted.reverse();
    run.finish(
        HeapOperation::Sort,
        HeapResult { success: true, size: 0, sorted, ..HeapResult::default() },
    )
}

/// Compare every parent with its children, stopping at the first violation.
pub fn validate(heap: &[i64]) -> StepStream {
    let mut run = HeapRun::new(heap);
    let n = run.heap.len();
    let mut violation_at = None;
    'outer: for i in 0..n / 2 {
        for child in [2 * i + 1, 2 * i + 2] {
            if child >= n {
                continue;
            }
            run.rec.emit(HeapStep::Compare { i, j: child });
            if run.heap[child] > run.heap[i] {
                violation_at = Some(i);
                break 'outer;
            }
        }
    }
    run.finish(
        HeapOperation::Validate,
        HeapResult {
            success: violation_at.is_none(),
            size: n,
            violation_at,
            ..HeapResult::default()
        },
    )
}

pub fn is_max_heap(heap: &[i64]) -> bool {
    (1..heap.len()).all(|i| heap[i] <= heap[(i - 1) / 2])
}
