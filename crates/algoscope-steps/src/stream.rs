//! Materialized step streams.
//!
//! A [`StepStream`] is non-empty and its last element is the only `done`
//! step. Producers build streams through a [`Recorder`], which can only be
//! closed by supplying the terminal step, so every producer-built stream
//! satisfies that shape. Streams arriving from elsewhere (JSON, tests) go
//! through [`StepStream::from_steps`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::Step;

/// Violations of the stream shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("step stream is empty")]
    Empty,

    #[error("step stream does not end in a done step")]
    MissingDone,

    #[error("step {index} follows a done step")]
    StepAfterDone { index: usize },
}

/// Ordered, immutable, fully drained sequence of steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StepStream {
    steps: Vec<Step>,
}

impl StepStream {
    /// Validate an externally built step list.
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, StreamError> {
        let Some(last) = steps.last() else {
            return Err(StreamError::Empty);
        };
        if let Some(index) = steps.iter().position(Step::is_done) {
            if index + 1 != steps.len() {
                return Err(StreamError::StepAfterDone { index: index + 1 });
            }
        }
        if !last.is_done() {
            return Err(StreamError::MissingDone);
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true for a validated stream.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// The terminal step.
    pub fn done(&self) -> &Step {
        // Non-empty by construction.
        &self.steps[self.steps.len() - 1]
    }

    /// Steps `[0..end)`, clamped to the stream length.
    pub fn prefix(&self, end: usize) -> &[Step] {
        &self.steps[..end.min(self.steps.len())]
    }
}

impl<'de> Deserialize<'de> for StepStream {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let steps = Vec::<Step>::deserialize(deserializer)?;
        StepStream::from_steps(steps).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a StepStream {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Append-only step buffer used by producers.
#[derive(Debug, Default)]
pub struct Recorder {
    steps: Vec<Step>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a non-terminal step. Terminal steps belong in [`finish`](Self::finish).
    pub fn emit(&mut self, step: impl Into<Step>) {
        let step = step.into();
        debug_assert!(!step.is_done(), "done steps must go through Recorder::finish");
        self.steps.push(step);
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Close the stream with its terminal step.
    pub fn finish(mut self, done: impl Into<Step>) -> StepStream {
        let done = done.into();
        debug_assert!(done.is_done(), "Recorder::finish requires a done step");
        self.steps.push(done);
        StepStream { steps: self.steps }
    }
}
