// src/planner.rs

//! The public planner surface.
//!
//! A [`Planner`] owns the step catalog (built once, at construction) and
//! drives runs: each `run()` call resolves a fresh tree per final step,
//! partitions the union into a [`Plan`], and hands the plan to the
//! executor. Plan and run state live only for the duration of the call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::StepCatalog;
use crate::errors::{Result, StepdagError};
use crate::exec::Executor;
use crate::logging::{default_logger, Logger};
use crate::plan::{layers, Plan, StepTree};
use crate::step::StepEnumerator;

/// One run request: which final steps to drive, with what config.
///
/// Config keys are projected into step constructors by init-argument name;
/// upstream productions override config where both name the same argument.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub final_steps: Vec<String>,
    pub config: BTreeMap<String, Value>,
}

/// Plans and executes dependency-driven step runs.
pub struct Planner {
    catalog: StepCatalog,
    jobs: usize,
    logger: Logger,
}

impl Planner {
    pub fn builder() -> PlannerBuilder {
        PlannerBuilder {
            namespaces: Vec::new(),
            jobs: 1,
            logger: None,
            enumerator: None,
        }
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Build the execution plan for `final_steps` without executing it.
    pub fn plan(&self, final_steps: &[String]) -> Result<Plan> {
        if final_steps.is_empty() {
            return Err(StepdagError::ArgumentInvalid(
                "final_steps must name at least one step".to_string(),
            ));
        }

        let mut trees = Vec::with_capacity(final_steps.len());
        for name in final_steps {
            let class = self.catalog.get(name).ok_or_else(|| {
                StepdagError::ArgumentInvalid(format!("unknown final step '{name}'"))
            })?;
            trees.push(StepTree::build(Arc::clone(class), self.catalog.classes())?);
        }

        let plan = layers::partition(&trees)?;
        debug!(
            sets = plan.num_sets(),
            steps = plan.step_count(),
            "built execution plan"
        );
        Ok(plan)
    }

    /// Drive `final_steps` to completion. Side effects only; all failures
    /// surface through the returned error.
    pub async fn run(&self, request: RunRequest) -> Result<()> {
        let plan = self.plan(&request.final_steps)?;

        info!(
            final_steps = ?request.final_steps,
            jobs = self.jobs,
            sets = plan.num_sets(),
            "starting run"
        );

        let executor = Executor::new(self.jobs, Arc::clone(&self.logger));
        executor.run_plan(&plan, &request.config).await?;

        info!("run complete");
        Ok(())
    }
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("catalog", &self.catalog)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Planner`]. Catalog discovery and validation happen in
/// [`build`](PlannerBuilder::build).
pub struct PlannerBuilder {
    namespaces: Vec<String>,
    jobs: usize,
    logger: Option<Logger>,
    enumerator: Option<Box<dyn StepEnumerator>>,
}

impl PlannerBuilder {
    /// Namespace prefixes to discover steps under, in precedence order.
    pub fn step_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// Worker-pool width; 1 (the default) selects the sequential executor.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn enumerator(mut self, enumerator: impl StepEnumerator + 'static) -> Self {
        self.enumerator = Some(Box::new(enumerator));
        self
    }

    pub fn build(self) -> Result<Planner> {
        if self.namespaces.is_empty() {
            return Err(StepdagError::ArgumentInvalid(
                "at least one step namespace is required".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(StepdagError::ArgumentInvalid(
                "jobs must be >= 1".to_string(),
            ));
        }
        let enumerator = self.enumerator.ok_or_else(|| {
            StepdagError::ArgumentInvalid(
                "an enumerator (e.g. StepRegistry) is required".to_string(),
            )
        })?;

        let catalog = StepCatalog::discover(&self.namespaces, enumerator.as_ref())?;

        Ok(Planner {
            catalog,
            jobs: self.jobs,
            logger: self.logger.unwrap_or_else(default_logger),
        })
    }
}
