//! Deterministic build ordering.
//!
//! [`build_order`] is Kahn's algorithm with a min-heap keyed on unit name:
//! whenever several units are ready, the lexicographically smallest one is
//! emitted next. The result is the smallest valid topological order, which
//! makes it independent of declaration order and stable across runs.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::build::DependencyGraph;

/// Compute the build order of every unit not in `excluded`.
///
/// Each unit appears after all of its dependencies. A unit that depends on
/// an excluded unit, directly or through other units, is never ready and is
/// left out, as is any unit on a cycle. Pass the cyclic units together with
/// [`blocked_by_cycles`](crate::graph::cycles::blocked_by_cycles) to get the
/// full buildable set.
#[must_use]
#[instrument(skip(graph, excluded), fields(nodes = graph.node_count(), excluded = excluded.len()))]
pub fn build_order(graph: &DependencyGraph, excluded: &HashSet<NodeIndex>) -> Vec<String> {
    let n = graph.node_count();
    // Dependencies not yet emitted, per vertex.
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

    let mut ready: BinaryHeap<Reverse<(&str, NodeIndex)>> = graph
        .node_indices()
        .filter(|idx| pending[idx.index()] == 0 && !excluded.contains(idx))
        .map(|idx| Reverse((graph.name(idx), idx)))
        .collect();

    let mut order = Vec::with_capacity(n.saturating_sub(excluded.len()));
    while let Some(Reverse((name, idx))) = ready.pop() {
        order.push(name.to_string());
        for &dependent in &dependents[idx.index()] {
            let slot = &mut pending[dependent.index()];
            *slot = slot.saturating_sub(1);
            if *slot == 0 && !excluded.contains(&dependent) {
                ready.push(Reverse((graph.name(dependent), dependent)));
            }
        }
    }

    debug!(ordered = order.len(), "build order computed");
    order
}
