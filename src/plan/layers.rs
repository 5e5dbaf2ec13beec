// src/plan/layers.rs

//! Layered topological partition of resolved step trees.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::errors::{Result, StepdagError};
use crate::plan::{Plan, StepTree};
use crate::step::StepClass;

/// Partition the union of `trees` into ordered step sets.
///
/// Layer assignment: a class with no producers sits in layer 0; otherwise
/// `1 + max(layer of each producer)`. Classes sharing a layer have no edge
/// between them (an edge would push the consumer a layer higher), so each
/// layer is parallel-safe. A class reachable from several final steps is
/// emitted once, at its highest layer, which keeps all of its producers in
/// earlier sets.
pub fn partition(trees: &[StepTree]) -> Result<Plan> {
    let mut classes: HashMap<&str, &Arc<StepClass>> = HashMap::new();
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for tree in trees {
        tree.traverse(&mut |node| {
            let name = node.class().name();
            classes.entry(name).or_insert_with(|| node.class());
            graph.add_node(name);
            for child in node.children() {
                // Edge direction: producer -> consumer.
                graph.add_edge(child.class().name(), name, ());
            }
        });
    }

    // Tree construction already rejected cycles; a failure here means the
    // resolved trees disagree with their own edges.
    let order = toposort(&graph, None).map_err(|cycle| {
        StepdagError::Other(anyhow!(
            "resolved dependency graph contains a cycle involving '{}'",
            cycle.node_id()
        ))
    })?;

    let mut layer_of: HashMap<&str, usize> = HashMap::new();
    let mut num_layers = 0usize;

    for name in order {
        let layer = graph
            .neighbors_directed(name, Direction::Incoming)
            .map(|producer| layer_of[producer] + 1)
            .max()
            .unwrap_or(0);
        layer_of.insert(name, layer);
        num_layers = num_layers.max(layer + 1);
    }

    let mut sets: Vec<Vec<Arc<StepClass>>> = vec![Vec::new(); num_layers];
    for (name, layer) in &layer_of {
        sets[*layer].push(Arc::clone(classes[name]));
    }
    for set in &mut sets {
        set.sort_by(|a, b| a.name().cmp(b.name()));
    }

    Ok(Plan::from_sets(sets))
}
