// src/catalog/mod.rs

//! Step discovery and the production map.
//!
//! - [`StepCatalog`] enumerates and validates the classes under the declared
//!   namespaces and fixes their total order.
//! - [`production_map`] resolves production names to the single class that
//!   supplies each of them.

pub mod production_map;

pub use production_map::ProductionMap;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, StepdagError};
use crate::step::{Candidate, StepClass, StepEnumerator};

/// The ordered set of known step classes.
///
/// Order is (namespace-prefix index, fully qualified class name ascending).
/// Namespace order makes duplicate-production precedence deterministic and
/// user-controllable; alphabetic order within a namespace keeps discovery
/// reproducible across enumerator implementations.
#[derive(Debug, Clone)]
pub struct StepCatalog {
    classes: Vec<Arc<StepClass>>,
}

impl StepCatalog {
    /// Discover and validate every class under `namespaces`, in declared
    /// order.
    ///
    /// Non-class entries are skipped. A class that fails validation is a
    /// hard error naming the offending class.
    pub fn discover(namespaces: &[String], enumerator: &dyn StepEnumerator) -> Result<Self> {
        let mut classes: Vec<Arc<StepClass>> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for namespace in namespaces {
            let mut found: Vec<Arc<StepClass>> = Vec::new();

            for candidate in enumerator.candidates_under(namespace) {
                match candidate {
                    Candidate::Marker(name) => {
                        debug!(namespace = %namespace, entry = %name, "skipping non-class entry");
                    }
                    Candidate::Class(class) => {
                        class
                            .validate()
                            .map_err(|reason| StepdagError::CatalogMalformed {
                                namespace: namespace.clone(),
                                class: class.name().to_string(),
                                reason,
                            })?;
                        found.push(class);
                    }
                }
            }

            found.sort_by(|a, b| a.name().cmp(b.name()));

            for class in found {
                // Overlapping namespace prefixes can surface a class twice;
                // the first (earlier-namespace) occurrence wins.
                if seen.insert(class.name().to_string()) {
                    classes.push(class);
                }
            }
        }

        debug!(classes = classes.len(), "catalog discovery complete");
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[Arc<StepClass>] {
        &self.classes
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StepClass>> {
        self.classes.iter().find(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
