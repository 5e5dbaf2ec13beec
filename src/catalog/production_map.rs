// src/catalog/production_map.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::step::StepClass;

/// Maps each production name to the single class that supplies it.
///
/// Built by walking a class list once: the first class declaring a
/// production wins, so catalog order (namespace order, then class name)
/// decides precedence for duplicates.
#[derive(Debug, Clone)]
pub struct ProductionMap {
    producers: BTreeMap<String, Arc<StepClass>>,
}

impl ProductionMap {
    pub fn new(classes: &[Arc<StepClass>]) -> Self {
        let mut producers: BTreeMap<String, Arc<StepClass>> = BTreeMap::new();

        for class in classes {
            for production in class.productions() {
                producers
                    .entry(production.name.clone())
                    .or_insert_with(|| Arc::clone(class));
            }
        }

        Self { producers }
    }

    /// The class producing `production`, if any.
    pub fn producer_of(&self, production: &str) -> Option<&Arc<StepClass>> {
        self.producers.get(production)
    }

    pub fn contains(&self, production: &str) -> bool {
        self.producers.contains_key(production)
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}
