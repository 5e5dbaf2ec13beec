// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::planner::RunRequest;

/// Top-level configuration as read from a TOML file:
///
/// ```toml
/// [runner]
/// namespaces = ["app::steps"]
/// jobs = 4
///
/// [run]
/// final_steps = ["app::steps::Publish"]
///
/// [run.config]
/// out_dir = "/tmp/out"
/// ```
///
/// Both sections are optional at parse time; validation decides what a
/// usable config must contain.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Step namespace prefixes, in precedence order.
    #[serde(default)]
    pub namespaces: Vec<String>,

    /// Worker-pool width; 1 means sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_jobs() -> usize {
    1
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            namespaces: Vec::new(),
            jobs: default_jobs(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunSection {
    /// Fully qualified names of the final steps to drive.
    #[serde(default)]
    pub final_steps: Vec<String>,

    /// Config entries projected into step constructors by name.
    #[serde(default)]
    pub config: toml::Table,
}

/// Validated configuration, with TOML values converted for step
/// constructors.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub namespaces: Vec<String>,
    pub jobs: usize,
    pub final_steps: Vec<String>,
    pub config: BTreeMap<String, Value>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        let config = raw
            .run
            .config
            .into_iter()
            .map(|(key, value)| (key, toml_value_to_json(value)))
            .collect();

        Self {
            namespaces: raw.runner.namespaces,
            jobs: raw.runner.jobs,
            final_steps: raw.run.final_steps,
            config,
        }
    }

    /// The run request described by the `[run]` section.
    pub fn run_request(&self) -> RunRequest {
        RunRequest {
            final_steps: self.final_steps.clone(),
            config: self.config.clone(),
        }
    }
}

fn toml_value_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(toml_value_to_json).collect())
        }
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_value_to_json(value)))
                .collect(),
        ),
    }
}
