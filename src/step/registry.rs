// src/step/registry.rs

//! Pluggable class discovery.
//!
//! The catalog talks to a [`StepEnumerator`] instead of a concrete
//! container. This keeps namespace-scanning mechanics out of the core and
//! makes it easy to substitute a purpose-built enumerator in tests or in
//! applications with their own plugin story.
//!
//! - [`StepRegistry`] is the default implementation: applications register
//!   their classes up front, keyed by fully qualified name.
//! - [`Candidate`] distinguishes concrete classes from namespace-shaped
//!   entries that cannot be constructed (discarded during discovery).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::StepClass;

/// A candidate found under a step namespace.
#[derive(Clone)]
pub enum Candidate {
    /// A concrete class with an attached step description.
    Class(Arc<StepClass>),
    /// An interface-shaped entry with no constructible class behind it.
    /// The catalog skips these.
    Marker(String),
}

impl Candidate {
    pub fn name(&self) -> &str {
        match self {
            Candidate::Class(class) => class.name(),
            Candidate::Marker(name) => name,
        }
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Class(class) => f.debug_tuple("Class").field(&class.name()).finish(),
            Candidate::Marker(name) => f.debug_tuple("Marker").field(name).finish(),
        }
    }
}

/// Enumerates candidate classes under namespace prefixes.
///
/// Implementations may return candidates in any order; the catalog re-sorts
/// by class name within each namespace, so discovery stays reproducible even
/// for non-deterministic enumerators.
pub trait StepEnumerator: Send + Sync {
    /// All candidates whose fully qualified name lies under `namespace`
    /// (i.e. starts with `"{namespace}::"`).
    fn candidates_under(&self, namespace: &str) -> Vec<Candidate>;
}

/// Default enumerator: a map of registered entries keyed by name.
#[derive(Debug, Default)]
pub struct StepRegistry {
    entries: BTreeMap<String, Candidate>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a concrete class under its fully qualified name. Later
    /// registrations under the same name replace earlier ones.
    pub fn register(&mut self, class: StepClass) -> &mut Self {
        let name = class.name().to_string();
        self.entries.insert(name, Candidate::Class(Arc::new(class)));
        self
    }

    /// Register a non-class entry (e.g. a shared interface living in a step
    /// namespace). Discovery will skip it.
    pub fn register_marker(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.entries.insert(name.clone(), Candidate::Marker(name));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StepEnumerator for StepRegistry {
    fn candidates_under(&self, namespace: &str) -> Vec<Candidate> {
        let prefix = format!("{namespace}::");
        self.entries
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }
}
