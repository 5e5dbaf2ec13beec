// src/plan/mod.rs

//! Plan construction.
//!
//! - [`tree`] resolves the dependency subtree rooted at one final step,
//!   rejecting self-dependencies and cycles.
//! - [`layers`] partitions the union of resolved trees into ordered,
//!   parallel-safe step sets.

pub mod layers;
pub mod tree;

pub use tree::StepTree;

use std::sync::Arc;

use crate::step::StepClass;

/// An ordered sequence of step sets.
///
/// Set `i` contains only steps whose dependencies are produced by steps in
/// sets `0..i`. Within a set, execution order is unobservable; classes are
/// sorted by name for reproducibility. Across sets, ordering is strict: a
/// set begins only after every step of the previous set was run or skipped.
#[derive(Debug, Clone)]
pub struct Plan {
    sets: Vec<Vec<Arc<StepClass>>>,
}

impl Plan {
    pub(crate) fn from_sets(sets: Vec<Vec<Arc<StepClass>>>) -> Self {
        Self { sets }
    }

    pub fn sets(&self) -> &[Vec<Arc<StepClass>>] {
        &self.sets
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Total number of steps across all sets.
    pub fn step_count(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
