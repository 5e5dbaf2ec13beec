// src/plan/tree.rs

//! Recursive dependency resolution rooted at a final step.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::ProductionMap;
use crate::errors::{Result, StepdagError};
use crate::step::StepClass;

/// One node of the resolved dependency DAG for a final step.
///
/// Children are resolved against a candidate set that excludes the node's
/// class and, transitively, every ancestor. Stripping ancestors makes
/// self-cycles and back-edges impossible to resolve: a true cycle therefore
/// surfaces as an unresolvable dependency rather than a detected back-edge,
/// and the error message asks about a possible cycle.
#[derive(Debug, Clone)]
pub struct StepTree {
    class: Arc<StepClass>,
    children: Vec<StepTree>,
}

impl StepTree {
    /// Resolve the subtree for `class` against `candidates`.
    ///
    /// Fails with `UnresolvedDependency` when nothing in the restricted
    /// candidate set produces a declared dependency, and with
    /// `SelfDependency` when a dependency would resolve to `class` itself.
    pub fn build(class: Arc<StepClass>, candidates: &[Arc<StepClass>]) -> Result<Self> {
        let remaining: Vec<Arc<StepClass>> = candidates
            .iter()
            .filter(|c| c.name() != class.name())
            .cloned()
            .collect();

        let production_map = ProductionMap::new(&remaining);
        let mut children: Vec<StepTree> = Vec::new();

        for dep in class.dependencies() {
            if class.produces(&dep.name) {
                return Err(StepdagError::SelfDependency {
                    class: class.name().to_string(),
                    dependency: dep.name.clone(),
                });
            }

            let producer = production_map.producer_of(&dep.name).ok_or_else(|| {
                StepdagError::UnresolvedDependency {
                    class: class.name().to_string(),
                    dependency: dep.name.clone(),
                }
            })?;

            // `remaining` excludes `class`, so this cannot resolve back to
            // it; kept as a guard on the invariant.
            if producer.name() == class.name() {
                return Err(StepdagError::SelfDependency {
                    class: class.name().to_string(),
                    dependency: dep.name.clone(),
                });
            }

            // Two dependency names satisfied by the same producer collapse
            // into one child.
            if children.iter().any(|c| c.class.name() == producer.name()) {
                debug!(
                    class = %class.name(),
                    dependency = %dep.name,
                    producer = %producer.name(),
                    "dependency satisfied by an existing child; deduplicating"
                );
                continue;
            }

            children.push(StepTree::build(Arc::clone(producer), &remaining)?);
        }

        children.sort_by(|a, b| a.class.name().cmp(b.class.name()));

        Ok(Self { class, children })
    }

    pub fn class(&self) -> &Arc<StepClass> {
        &self.class
    }

    pub fn children(&self) -> &[StepTree] {
        &self.children
    }

    /// Post-order traversal: every child's traversal completes before the
    /// callback runs for the parent.
    pub fn traverse<'a, F>(&'a self, callback: &mut F)
    where
        F: FnMut(&'a StepTree),
    {
        for child in &self.children {
            child.traverse(callback);
        }
        callback(self);
    }
}
