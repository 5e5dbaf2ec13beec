// src/exec/mod.rs

//! Plan execution.
//!
//! The executor processes a [`Plan`] set by set. For each step it builds an
//! instance in the coordinator (construction needs the accumulated
//! productions), then either records the instance's observables in place
//! (up-to-date skip) or runs it:
//!
//! - sequentially, in set order, when `jobs == 1`;
//! - on a pool of at most `jobs` workers otherwise, with the serialized
//!   report of each worker merged back as it finishes.
//!
//! The coordinator blocks in exactly two places: when dispatching would
//! exceed `jobs` in-flight workers, and at each set boundary until the set
//! drains. On the first worker failure it stops dispatching, lets in-flight
//! workers of the set finish, discards their reports, and aborts the run.

pub mod worker;

pub use worker::WorkerReport;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::errors::{Result, StepdagError};
use crate::logging::Logger;
use crate::plan::Plan;
use crate::run::RunData;
use crate::step::StepClass;

use worker::{dispatch, WorkerExit};

/// First failure observed in a step set: (worker, class, message).
type Failure = Option<(u64, String, String)>;

/// Drives a plan to completion against fresh [`RunData`].
pub struct Executor {
    jobs: usize,
    logger: Logger,
}

impl Executor {
    pub fn new(jobs: usize, logger: Logger) -> Self {
        Self { jobs, logger }
    }

    /// Process every step set of `plan` in order and return the final run
    /// state. Fails on the first step or worker failure.
    pub async fn run_plan(&self, plan: &Plan, config: &BTreeMap<String, Value>) -> Result<RunData> {
        let mut run_data = RunData::new(Arc::clone(&self.logger));
        let mut worker_seq: u64 = 0;

        for (index, set) in plan.sets().iter().enumerate() {
            debug!(set = index, steps = set.len(), "starting step set");
            run_data.start_step_set();

            if self.jobs <= 1 {
                self.run_set_sequential(set, &mut run_data, config)?;
            } else {
                self.run_set_parallel(set, &mut run_data, config, &mut worker_seq)
                    .await?;
            }
        }

        Ok(run_data)
    }

    fn run_set_sequential(
        &self,
        set: &[Arc<StepClass>],
        run_data: &mut RunData,
        config: &BTreeMap<String, Value>,
    ) -> Result<()> {
        for class in set {
            let mut step = run_data.make_step_object(class, config)?;

            if run_data.step_is_up_to_date(step.as_ref()) {
                self.logger
                    .info(&format!("{} is up to date. Skipping.", class.name()));
                run_data.record_run_time(step.last_run_time());
                run_data.record_productions(class, step.productions());
                continue;
            }

            self.logger.info(&format!("Running {}", class.name()));
            step.run().map_err(|source| StepdagError::StepFailed {
                class: class.name().to_string(),
                source,
            })?;

            run_data.record_run_time(step.last_run_time());
            run_data.record_productions(class, step.productions());
        }

        Ok(())
    }

    async fn run_set_parallel(
        &self,
        set: &[Arc<StepClass>],
        run_data: &mut RunData,
        config: &BTreeMap<String, Value>,
        worker_seq: &mut u64,
    ) -> Result<()> {
        let classes_by_name: BTreeMap<String, Arc<StepClass>> = set
            .iter()
            .map(|class| (class.name().to_string(), Arc::clone(class)))
            .collect();

        let mut workers: JoinSet<WorkerExit> = JoinSet::new();
        let mut failure: Failure = None;

        for class in set {
            if failure.is_some() {
                break;
            }

            let step = run_data.make_step_object(class, config)?;

            if run_data.step_is_up_to_date(step.as_ref()) {
                self.logger
                    .info(&format!("{} is up to date. Skipping.", class.name()));
                run_data.record_run_time(step.last_run_time());
                run_data.record_productions(class, step.productions());
                continue;
            }

            while workers.len() >= self.jobs && failure.is_none() {
                self.reap_one(&mut workers, run_data, &classes_by_name, &mut failure)
                    .await;
            }
            if failure.is_some() {
                break;
            }

            *worker_seq += 1;
            let worker = *worker_seq;
            self.logger
                .info(&format!("Running {} on worker {}", class.name(), worker));
            dispatch(&mut workers, worker, class.name().to_string(), step);
        }

        // Set boundary: every in-flight worker drains before the next set
        // may begin, failure or not.
        while !workers.is_empty() {
            self.reap_one(&mut workers, run_data, &classes_by_name, &mut failure)
                .await;
        }

        match failure {
            Some((worker, class, message)) => Err(StepdagError::WorkerFailure {
                worker,
                class,
                message,
            }),
            None => Ok(()),
        }
    }

    /// Wait for one worker and fold its exit into the run state.
    ///
    /// After a failure has been observed, reports from draining workers are
    /// discarded rather than merged.
    async fn reap_one(
        &self,
        workers: &mut JoinSet<WorkerExit>,
        run_data: &mut RunData,
        classes: &BTreeMap<String, Arc<StepClass>>,
        failure: &mut Failure,
    ) {
        let Some(joined) = workers.join_next().await else {
            return;
        };

        let exit = match joined {
            Ok(exit) => exit,
            Err(err) => {
                error!(error = %err, "worker task failed to join");
                if failure.is_none() {
                    *failure = Some((0, "<unknown>".to_string(), err.to_string()));
                }
                return;
            }
        };

        match exit.outcome {
            Ok(report_bytes) => {
                if failure.is_some() {
                    debug!(
                        worker = exit.worker,
                        step = %exit.class,
                        "discarding report from draining worker after failure"
                    );
                    return;
                }

                match WorkerReport::decode(&report_bytes) {
                    Ok(report) => {
                        run_data.record_run_time(report.last_run_time);
                        match classes.get(&exit.class) {
                            Some(class) => {
                                run_data.record_productions(class, report.productions);
                            }
                            None => {
                                warn!(step = %exit.class, "worker reported an unknown step class");
                            }
                        }
                        self.logger
                            .debug(&format!("worker {} finished {}", exit.worker, exit.class));
                    }
                    Err(err) => {
                        self.logger.error(&format!(
                            "worker {} returned an unreadable report for {}",
                            exit.worker, exit.class
                        ));
                        *failure = Some((
                            exit.worker,
                            exit.class,
                            format!("unreadable worker report: {err:#}"),
                        ));
                    }
                }
            }
            Err(message) => {
                self.logger.error(&format!(
                    "worker {} failed running step '{}': {message}",
                    exit.worker, exit.class
                ));
                if failure.is_none() {
                    *failure = Some((exit.worker, exit.class, message));
                }
            }
        }
    }
}
