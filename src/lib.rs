// src/lib.rs

//! `stepdag` — a dependency-driven step runner.
//!
//! Applications author *step classes*: units of work declaring the named
//! values they require (**dependencies**) and the named values they supply
//! (**productions**), plus a last-run timestamp observable. Given a set of
//! final steps, the planner:
//!
//! - discovers and validates the classes under the configured namespaces,
//! - resolves each dependency to its producing class,
//! - partitions the resulting DAG into ordered, parallel-safe step sets,
//! - executes the sets in order, skipping steps whose own timestamp is
//!   newer than everything they consume, fanning independent steps out to
//!   a bounded worker pool when `jobs > 1`.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use stepdag::{Planner, RunRequest, StepRegistry};
//!
//! # async fn demo(registry: StepRegistry) -> stepdag::Result<()> {
//! let planner = Planner::builder()
//!     .step_namespaces(["app::steps"])
//!     .jobs(4)
//!     .enumerator(registry)
//!     .build()?;
//!
//! planner
//!     .run(RunRequest {
//!         final_steps: vec!["app::steps::Publish".to_string()],
//!         config: BTreeMap::new(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod plan;
pub mod planner;
pub mod run;
pub mod step;
pub mod types;

pub use catalog::{ProductionMap, StepCatalog};
pub use errors::{Result, StepdagError};
pub use exec::{Executor, WorkerReport};
pub use logging::{default_logger, init_logging, LogSink, Logger, TracingSink};
pub use plan::{Plan, StepTree};
pub use planner::{Planner, PlannerBuilder, RunRequest};
pub use run::RunData;
pub use step::{
    Candidate, Descriptor, Step, StepArgs, StepClass, StepClassBuilder, StepEnumerator,
    StepRegistry,
};
pub use types::{current_timestamp, RunTimestamp, ValueKind};
