//! Sorting producers.
//!
//! Each takes the input array by reference, sorts a private copy and records
//! every comparison and write against that copy.

use crate::step::ArrayStep;
use crate::stream::{Recorder, StepStream};

/// Sorting algorithm keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortAlgorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 6] = [
        SortAlgorithm::Bubble,
        SortAlgorithm::Selection,
        SortAlgorithm::Insertion,
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
        SortAlgorithm::Heap,
    ];

    pub fn run(&self, input: &[i64]) -> StepStream {
        match self {
            SortAlgorithm::Bubble => bubble_sort(input),
            SortAlgorithm::Selection => selection_sort(input),
            SortAlgorithm::Insertion => insertion_sort(input),
            SortAlgorithm::Merge => merge_sort(input),
            SortAlgorithm::Quick => quick_sort(input),
            SortAlgorithm::Heap => heap_sort(input),
        }
    }
}

fn swap(arr: &mut [i64], rec: &mut Recorder, i: usize, j: usize) {
    arr.swap(i, j);
    rec.emit(ArrayStep::Swap { i, j });
}

fn overwrite(arr: &mut [i64], rec: &mut Recorder, index: usize, value: i64) {
    arr[index] = value;
    rec.emit(ArrayStep::Overwrite { index, value });
}

/// Bubble sort with early exit after a pass without swaps.
pub fn bubble_sort(input: &[i64]) -> StepStream {
    let mut arr = input.to_vec();
    let mut rec = Recorder::new();
    let n = arr.len();

    for pass in 0..n.saturating_sub(1) {
        let mut swapped = false;
        for j in 0..n - pass - 1 {
            rec.emit(ArrayStep::Compare { i: j, j: j + 1 });
            if arr[j] > arr[j + 1] {
                swap(&mut arr, &mut rec, j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }

    rec.finish(ArrayStep::Done { array: arr })
}

pub fn selection_sort(input: &[i64]) -> StepStream {
    let mut arr = input.to_vec();
    let mut rec = Recorder::new();
    let n = arr.len();

    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        for j in (i + 1)..n {
            rec.emit(ArrayStep::Compare { i: min, j });
            if arr[j] < arr[min] {
                min = j;
            }
        }
        if min != i {
            swap(&mut arr, &mut rec, i, min);
        }
    }

    rec.finish(ArrayStep::Done { array: arr })
}

/// Insertion sort. Shifting stops at the first element `<=` the key, so
/// equal keys keep their input order.
pub fn insertion_sort(input: &[i64]) -> StepStream {
    let mut arr = input.to_vec();
    let mut rec = Recorder::new();

    for i in 1..arr.len() {
        let key = arr[i];
        let mut hole = i;
        while hole > 0 {
            let j = hole - 1;
            rec.emit(ArrayStep::Compare { i: j, j: i });
            if arr[j] <= key {
                break;
            }
            let shifted = arr[j];
            overwrite(&mut arr, &mut rec, hole, shifted);
            hole = j;
        }
        if hole != i {
            overwrite(&mut arr, &mut rec, hole, key);
        }
    }

    rec.finish(ArrayStep::Done { array: arr })
}

/// Bottom-up merge sort. Ties take from the left run.
pub fn merge_sort(input: &[i64]) -> StepStream {
    let mut arr = input.to_vec();
    let mut rec = Recorder::new();
    let n = arr.len();
    let mut width = 1;

    while width < n {
        let mut lo = 0;
        while lo + width < n {
            let mid = lo + width;
            let hi = (lo + 2 * width).min(n);
            let aux = arr[lo..hi].to_vec();
            let (mut i, mut j, mut k) = (lo, mid, lo);

            while i < mid && j < hi {
                rec.emit(ArrayStep::Compare { i, j });
                let (left, right) = (aux[i - lo], aux[j - lo]);
                if left <= right {
                    overwrite(&mut arr, &mut rec, k, left);
                    i += 1;
                } else {
                    overwrite(&mut arr, &mut rec, k, right);
                    j += 1;
                }
                k += 1;
            }
            while i < mid {
                overwrite(&mut arr, &mut rec, k, aux[i - lo]);
                i += 1;
                k += 1;
            }
            while j < hi {
                overwrite(&mut arr, &mut rec, k, aux[j - lo]);
                j += 1;
                k += 1;
            }
            lo = hi;
        }
        width *= 2;
    }

    rec.finish(ArrayStep::Done { array: arr })
}

/// Quicksort with an explicit range stack and Lomuto partitioning around the
/// last element.
pub fn quick_sort(input: &[i64]) -> StepStream {
    let mut arr = input.to_vec();
    let mut rec = Recorder::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    if arr.len() > 1 {
        stack.push((0, arr.len() - 1));
    }

    while let Some((left, right)) = stack.pop() {
        if left >= right {
            continue;
        }
        let pivot = arr[right];
        let mut store = left;
        for i in left..right {
            rec.emit(ArrayStep::Compare { i, j: right });
            if arr[i] < pivot {
                swap(&mut arr, &mut rec, i, store);
                store += 1;
            }
        }
        swap(&mut arr, &mut rec, store, right);

        if store > left {
            stack.push((left, store - 1));
        }
        stack.push((store + 1, right));
    }

    rec.finish(ArrayStep::Done { array: arr })
}

/// Heap sort: sift-up heap construction, then repeated root extraction with
/// sift-down.
pub fn heap_sort(input: &[i64]) -> StepStream {
    let mut arr = input.to_vec();
    let mut rec = Recorder::new();
    let n = arr.len();
    let parent = |i: usize| (i - 1) / 2;

    for i in 1..n {
        let mut child = i;
        while child > 0 {
            let p = parent(child);
            rec.emit(ArrayStep::Compare { i: child, j: p });
            if arr[child] <= arr[p] {
                break;
            }
            swap(&mut arr, &mut rec, child, p);
            child = p;
        }
    }

    for end in (1..n).rev() {
        swap(&mut arr, &mut rec, 0, end);
        let mut root = 0;
        loop {
            let (l, r) = (2 * root + 1, 2 * root + 2);
            let mut largest = root;
            if l < end {
                rec.emit(ArrayStep::Compare { i: largest, j: l });
                if arr[l] > arr[largest] {
                    largest = l;
                }
            }
            if r < end {
                rec.emit(ArrayStep::Compare { i: largest, j: r });
                if arr[r] > arr[largest] {
                    largest = r;
                }
            }
            if largest == root {
                break;
            }
            swap(&mut arr, &mut rec, root, largest);
            root = largest;
        }
    }

    rec.finish(ArrayStep::Done { array: arr })
}
