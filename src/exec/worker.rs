// src/exec/worker.rs

//! Worker-side execution and report marshalling.
//!
//! A worker owns a transient copy of its assigned step, runs it, and hands
//! back only the serialized observables. The step object itself never
//! crosses back to the coordinator.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;

use crate::step::Step;
use crate::types::RunTimestamp;

/// What a worker reports on success: the two post-run observables.
///
/// The report crosses the worker boundary as JSON bytes; productions must
/// survive this round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    pub last_run_time: Option<RunTimestamp>,
    pub productions: BTreeMap<String, Value>,
}

impl WorkerReport {
    pub fn from_step(step: &dyn Step) -> Self {
        Self {
            last_run_time: step.last_run_time(),
            productions: step.productions(),
        }
    }

    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Terminal state of one worker, as seen by the coordinator.
pub(crate) struct WorkerExit {
    pub worker: u64,
    pub class: String,
    pub outcome: std::result::Result<Vec<u8>, String>,
}

/// Hand `step` to a fresh worker.
///
/// The worker runs the step synchronously on the blocking pool, encodes its
/// report, and exits. Panics inside the step are converted into a failed
/// outcome so the coordinator can attribute them to the worker and class.
pub(crate) fn dispatch(
    workers: &mut JoinSet<WorkerExit>,
    worker: u64,
    class: String,
    mut step: Box<dyn Step>,
) {
    workers.spawn_blocking(move || {
        let outcome = catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<Vec<u8>> {
            step.run()?;
            WorkerReport::from_step(step.as_ref()).encode()
        }));

        let outcome = match outcome {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(err)) => Err(format!("{err:#}")),
            Err(_) => Err("step panicked in worker".to_string()),
        };

        WorkerExit {
            worker,
            class,
            outcome,
        }
    });
}
