// src/step/class.rs

//! Catalog entries: the static description of a step class.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::types::ValueKind;

use super::{Step, StepArgs};

/// Builds a step instance from named constructor arguments.
pub type StepFactory = Arc<dyn Fn(StepArgs) -> anyhow::Result<Box<dyn Step>> + Send + Sync>;

/// A named dependency or production slot, with its declared value shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub kind: ValueKind,
}

impl Descriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Any,
        }
    }

    pub fn with_kind(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A catalog entry: everything the planner needs to know about a step class
/// without constructing it.
///
/// Identity is the fully qualified, `::`-separated name
/// (e.g. `"app::steps::BuildIndex"`); the leading segments are the class's
/// namespace. Dependency names double as init-argument names; `init_arg` on
/// the builder declares config-only parameters.
#[derive(Clone)]
pub struct StepClass {
    name: String,
    dependencies: Vec<Descriptor>,
    productions: Vec<Descriptor>,
    init_args: Vec<String>,
    factory: Option<StepFactory>,
}

impl StepClass {
    pub fn builder(name: impl Into<String>) -> StepClassBuilder {
        StepClassBuilder {
            name: name.into(),
            dependencies: Vec::new(),
            productions: Vec::new(),
            init_args: Vec::new(),
            factory: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered dependency descriptors, as declared.
    pub fn dependencies(&self) -> &[Descriptor] {
        &self.dependencies
    }

    /// Ordered production descriptors, as declared.
    pub fn productions(&self) -> &[Descriptor] {
        &self.productions
    }

    /// Init-argument names: every dependency name plus declared config-only
    /// parameters.
    pub fn init_args(&self) -> &[String] {
        &self.init_args
    }

    pub fn produces(&self, name: &str) -> bool {
        self.productions.iter().any(|p| p.name == name)
    }

    pub fn production_kind(&self, name: &str) -> Option<ValueKind> {
        self.productions
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.kind)
    }

    /// Build an instance. Callers go through
    /// [`crate::run::RunData::make_step_object`], which assembles the args.
    pub(crate) fn construct(&self, args: StepArgs) -> anyhow::Result<Box<dyn Step>> {
        match &self.factory {
            Some(factory) => factory(args),
            None => Err(anyhow::anyhow!(
                "class '{}' has no constructor registered",
                self.name
            )),
        }
    }

    /// Check that this entry satisfies the step contract. The catalog wraps
    /// the returned reason into a `CatalogMalformed` error naming the class.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.name.is_empty() {
            return Err("class name is empty".to_string());
        }
        if self.factory.is_none() {
            return Err("no constructor registered".to_string());
        }

        let mut seen = BTreeSet::new();
        for dep in &self.dependencies {
            if !seen.insert(dep.name.as_str()) {
                return Err(format!("dependency '{}' is declared twice", dep.name));
            }
        }

        let mut seen = BTreeSet::new();
        for prod in &self.productions {
            if !seen.insert(prod.name.as_str()) {
                return Err(format!("production '{}' is declared twice", prod.name));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for StepClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepClass")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("productions", &self.productions)
            .field("init_args", &self.init_args)
            .finish_non_exhaustive()
    }
}

/// Fluent construction for [`StepClass`].
pub struct StepClassBuilder {
    name: String,
    dependencies: Vec<Descriptor>,
    productions: Vec<Descriptor>,
    init_args: Vec<String>,
    factory: Option<StepFactory>,
}

impl StepClassBuilder {
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(Descriptor::new(name));
        self
    }

    pub fn dependency_with_kind(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.dependencies.push(Descriptor::with_kind(name, kind));
        self
    }

    pub fn production(mut self, name: impl Into<String>) -> Self {
        self.productions.push(Descriptor::new(name));
        self
    }

    pub fn production_with_kind(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.productions.push(Descriptor::with_kind(name, kind));
        self
    }

    /// Declare a config-only init argument (dependency names are implied).
    pub fn init_arg(mut self, name: impl Into<String>) -> Self {
        self.init_args.push(name.into());
        self
    }

    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(StepArgs) -> anyhow::Result<Box<dyn Step>> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn build(self) -> StepClass {
        let mut init_args = self.init_args;
        for dep in &self.dependencies {
            if !init_args.contains(&dep.name) {
                init_args.push(dep.name.clone());
            }
        }

        StepClass {
            name: self.name,
            dependencies: self.dependencies,
            productions: self.productions,
            init_args,
            factory: self.factory,
        }
    }
}
