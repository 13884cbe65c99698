//! Algoscope Steps
//!
//! Step vocabulary and deterministic step producers for algorithm playback.
//!
//! # Contract
//!
//! A producer is a plain function from inputs to a [`StepStream`]. It never
//! reads a clock or an ambient RNG, so the same inputs always yield the same
//! stream. Every stream is non-empty and ends in exactly one `done` step,
//! including runs on empty or degenerate input. Negative outcomes (target not
//! found, cycle, negative cycle, empty structure) are reported through the
//! `done` payload, never as errors.
//!
//! # Families
//!
//! - [`sorting`]: array steps over an `i64` slice
//! - [`traversal`], [`pathfinding`]: graph and grid search
//! - [`optimization`]: spanning trees, shortest paths, topological order
//! - [`tree`]: BST, AVL and red-black trees on an id-indexed arena
//! - [`heap`], [`hash`], [`list`]: classic data structures
//! - [`ml`]: iterative model fitting

pub mod hash;
pub mod heap;
pub mod list;
pub mod ml;
pub mod optimization;
pub mod pathfinding;
pub mod sorting;
pub mod step;
pub mod stream;
pub mod traversal;
pub mod tree;

pub use step::{
    ArrayStep, Family, HashStep, HeapStep, ListStep, MlStep, OptimizationResult, OptimizationStep, Step,
    TraversalStep, TreeStep,
};
pub use stream::{Recorder, StepStream, StreamError};
