// src/run/mod.rs

//! Per-run coordinator state.
//!
//! [`RunData`] exists for the duration of one `run()` call. It accumulates
//! productions as steps complete, tracks the timestamps observed in the
//! current step set, and folds them into a prior-set maximum at each set
//! boundary. The up-to-date predicate compares a step's own timestamp
//! against that maximum.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, StepdagError};
use crate::logging::Logger;
use crate::step::{Step, StepArgs, StepClass};
use crate::types::RunTimestamp;

/// Mutable state for a single run.
pub struct RunData {
    productions: BTreeMap<String, Value>,
    current_set_times: Vec<RunTimestamp>,
    current_set_complete: bool,
    previous_max: Option<RunTimestamp>,
    previous_complete: bool,
    logger: Logger,
}

impl RunData {
    pub fn new(logger: Logger) -> Self {
        Self {
            productions: BTreeMap::new(),
            current_set_times: Vec::new(),
            current_set_complete: true,
            previous_max: None,
            previous_complete: true,
            logger,
        }
    }

    /// Enter a new step set: fold the current set's timestamps into the
    /// prior-set maximum and reset the per-set state.
    pub fn start_step_set(&mut self) {
        if let Some(max) = self.current_set_times.iter().copied().max() {
            self.previous_max = Some(match self.previous_max {
                Some(prev) => prev.max(max),
                None => max,
            });
        }
        self.previous_complete &= self.current_set_complete;

        self.current_set_times.clear();
        self.current_set_complete = true;
    }

    /// Build an instance of `class`: project from `config` every key naming
    /// one of the class's init arguments, overlay the upstream production
    /// for each declared dependency (productions override config), and
    /// inject the logger.
    ///
    /// A missing production here means plan-time checks were bypassed;
    /// `MissingProductionAtConstruct` reports it rather than panicking.
    pub fn make_step_object(
        &self,
        class: &StepClass,
        config: &BTreeMap<String, Value>,
    ) -> Result<Box<dyn Step>> {
        let mut values: BTreeMap<String, Value> = BTreeMap::new();

        for arg in class.init_args() {
            if let Some(value) = config.get(arg) {
                values.insert(arg.clone(), value.clone());
            }
        }

        for dep in class.dependencies() {
            let value = self.productions.get(&dep.name).ok_or_else(|| {
                StepdagError::MissingProductionAtConstruct {
                    class: class.name().to_string(),
                    production: dep.name.clone(),
                }
            })?;
            values.insert(dep.name.clone(), value.clone());
        }

        class
            .construct(StepArgs {
                values,
                logger: Arc::clone(&self.logger),
            })
            .map_err(|err| {
                StepdagError::ArgumentInvalid(format!(
                    "constructing step '{}': {err:#}",
                    class.name()
                ))
            })
    }

    /// Plan-collapsed up-to-date predicate.
    ///
    /// A step is up to date iff its own timestamp is defined, every step in
    /// prior sets reported a timestamp, and its own timestamp strictly
    /// exceeds the prior-set maximum (vacuously true when there is none).
    /// Equal timestamps count as stale.
    pub fn step_is_up_to_date(&self, step: &dyn Step) -> bool {
        let Some(own) = step.last_run_time() else {
            return false;
        };

        if !self.previous_complete {
            return false;
        }

        match self.previous_max {
            None => true,
            Some(max) => own > max,
        }
    }

    /// Record a completed step's timestamp for the current set. An absent
    /// timestamp marks the set incomplete, which keeps every later step
    /// from being considered up to date.
    pub fn record_run_time(&mut self, time: Option<RunTimestamp>) {
        match time {
            Some(t) => self.current_set_times.push(t),
            None => {
                debug!("step reported no last-run time; marking current set incomplete");
                self.current_set_complete = false;
            }
        }
    }

    /// Merge a completed step's productions. Later writes win within a run;
    /// a valid plan never produces colliding names.
    pub fn record_productions(&mut self, class: &StepClass, produced: BTreeMap<String, Value>) {
        for (name, value) in produced {
            match class.production_kind(&name) {
                Some(kind) if !kind.matches(&value) => {
                    warn!(
                        step = %class.name(),
                        production = %name,
                        expected = kind.name(),
                        "production value does not match its declared kind"
                    );
                }
                None => {
                    warn!(
                        step = %class.name(),
                        production = %name,
                        "step reported a production it does not declare"
                    );
                }
                Some(_) => {}
            }
            self.productions.insert(name, value);
        }
    }

    /// Productions accumulated so far, by name.
    pub fn productions(&self) -> &BTreeMap<String, Value> {
        &self.productions
    }

    pub fn previous_max(&self) -> Option<RunTimestamp> {
        self.previous_max
    }
}

impl fmt::Debug for RunData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunData")
            .field("productions", &self.productions)
            .field("current_set_times", &self.current_set_times)
            .field("current_set_complete", &self.current_set_complete)
            .field("previous_max", &self.previous_max)
            .field("previous_complete", &self.previous_complete)
            .finish_non_exhaustive()
    }
}
