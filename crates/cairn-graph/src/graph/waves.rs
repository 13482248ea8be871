//! Deploy waves: units grouped into parallel layers.
//!
//! Wave 0 holds every buildable unit without dependencies. Wave `k` holds the
//! units whose dependencies all sit in waves `< k`. Units in one wave do not
//! depend on each other and can be deployed concurrently.
//!
//! Each wave is sorted by name, so concatenating the waves gives a valid
//! build order, though not necessarily the lexicographically smallest one
//! produced by [`build_order`](crate::graph::order::build_order).

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::build::DependencyGraph;

/// Group the units not in `excluded` into deploy waves.
///
/// Exclusion behaves as in [`build_order`](crate::graph::order::build_order):
/// a unit that can never become ready is left out of every wave.
#[must_use]
#[instrument(skip(graph, excluded), fields(nodes = graph.node_count()))]
pub fn deploy_waves(graph: &DependencyGraph, excluded: &HashSet<NodeIndex>) -> Vec<Vec<String>> {
    let n = graph.node_count();
    let mut pending: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.dependencies(idx).len())
        .collect();
    let mut dependents: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    for idx in graph.node_indices() {
        for &dep in graph.dependencies(idx) {
            dependents[dep.index()].push(idx);
        }
    }

    let mut ready: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|idx| pending[idx.index()] == 0 && !excluded.contains(idx))
        .collect();

    let mut waves: Vec<Vec<String>> = Vec::new();
    while !ready.is_empty() {
        let current = std::mem::take(&mut ready);

        for &idx in &current {
            for &dependent in &dependents[idx.index()] {
                let slot = &mut pending[dependent.index()];
                *slot = slot.saturating_sub(1);
                if *slot == 0 && !excluded.contains(&dependent) {
                    ready.push(dependent);
                }
            }
        }

        let mut wave: Vec<String> = current
            .into_iter()
            .map(|idx| graph.name(idx).to_string())
            .collect();
        wave.sort_unstable();
        waves.push(wave);
    }

    debug!(waves = waves.len(), "deploy waves computed");
    waves
}
