// src/step/mod.rs

//! The step capability: the contract user-authored steps satisfy, and how
//! candidate classes are described and discovered.
//!
//! - [`Step`] is the instance contract (`run` plus the two post-run
//!   observables).
//! - [`class`] holds [`StepClass`], the catalog entry describing a class:
//!   its dependencies, productions, init arguments and factory.
//! - [`registry`] provides the pluggable [`StepEnumerator`] discovery
//!   interface and the [`StepRegistry`] default implementation.

pub mod class;
pub mod registry;

pub use class::{Descriptor, StepClass, StepClassBuilder, StepFactory};
pub use registry::{Candidate, StepEnumerator, StepRegistry};

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::logging::Logger;
use crate::types::RunTimestamp;

/// A user-authored unit of work.
///
/// Instances are built by the coordinator from config and upstream
/// productions (see [`crate::run::RunData::make_step_object`]), then either
/// skipped (when up to date) or run. After `run()` returns, the two
/// observables must be consistent: `last_run_time` reflects the completed
/// run and `productions` contains a value for every declared production.
pub trait Step: Send {
    /// Perform the step's side effects.
    fn run(&mut self) -> anyhow::Result<()>;

    /// When this step last ran, or `None` if it never has.
    fn last_run_time(&self) -> Option<RunTimestamp>;

    /// The values this step makes available, by production name.
    ///
    /// Values must survive a serialization round trip; live handles
    /// (connections, file descriptors) are a user error. Encode credentials
    /// instead and reconnect downstream.
    fn productions(&self) -> BTreeMap<String, Value>;
}

impl fmt::Debug for dyn Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("last_run_time", &self.last_run_time())
            .field("productions", &self.productions())
            .finish()
    }
}

/// Named constructor arguments handed to a step factory.
///
/// Keys are init-argument names: config entries projected by name, overlaid
/// with upstream productions for every declared dependency.
pub struct StepArgs {
    pub values: BTreeMap<String, Value>,
    pub logger: Logger,
}

impl StepArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Fetch a required argument, failing with the argument's name.
    pub fn require(&self, name: &str) -> anyhow::Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("missing required init argument '{name}'"))
    }
}

impl fmt::Debug for StepArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepArgs")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
