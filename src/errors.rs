// src/errors.rs

//! Crate-wide error types and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StepdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A candidate class under a step namespace does not satisfy the step
    /// contract.
    #[error("class '{class}' under step namespace '{namespace}' does not satisfy the step contract: {reason}")]
    CatalogMalformed {
        namespace: String,
        class: String,
        reason: String,
    },

    /// A declared dependency has no producer among the remaining candidate
    /// classes. Cycles also surface here, because the ancestor that would
    /// close the loop is excluded from the candidate set.
    #[error("cannot resolve a dependency of '{class}': nothing produces '{dependency}'. Do you have a cyclic dependency?")]
    UnresolvedDependency { class: String, dependency: String },

    #[error("a dependency of '{class}' resolved to the step itself: '{dependency}'")]
    SelfDependency { class: String, dependency: String },

    /// Plan-time checks should make this unreachable; raised if an upstream
    /// production is absent when an instance is built.
    #[error("no production '{production}' available while constructing '{class}'")]
    MissingProductionAtConstruct { class: String, production: String },

    /// A parallel worker failed. The run aborts after in-flight workers of
    /// the same step set have drained.
    #[error("worker {worker} failed running step '{class}': {message}")]
    WorkerFailure {
        worker: u64,
        class: String,
        message: String,
    },

    /// A step's `run()` failed in the sequential executor.
    #[error("step '{class}' failed: {source}")]
    StepFailed {
        class: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid argument: {0}")]
    ArgumentInvalid(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StepdagError>;
