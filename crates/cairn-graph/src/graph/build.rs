//! Graph construction from a validated unit registry.
//!
//! # Overview
//!
//! [`build`] converts a [`UnitRegistry`] into a [`DependencyGraph`] backed by
//! a [`petgraph`] directed graph. Vertices are added in registry order, so a
//! unit's declaration position *is* its `NodeIndex`; traversal state in the
//! other graph modules is therefore kept in plain `Vec`s indexed by
//! `NodeIndex::index()`.
//!
//! ## Dangling References
//!
//! A dependency naming a unit that is not in the registry produces a
//! [`ValidationError`] of kind [`ValidationErrorKind::UndefinedDependency`]
//! and the edge is omitted. The declaring unit is still a vertex. Errors are
//! emitted in registry order, then dependency declaration order.
//!
//! ## Cache Invalidation
//!
//! [`DependencyGraph::content_hash`] is a BLAKE3 hash of the vertex list and
//! the validated edge list. Callers that cache reports can key on it.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use cairn_core::UnitRegistry;
use petgraph::Direction;
use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    /// A declared dependency has no corresponding unit.
    UndefinedDependency,
}

/// A problem found while building the graph. The offending edge is dropped
/// and analysis continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("unit '{unit}' depends on undeclared unit '{missing_name}'")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub unit: String,
    pub missing_name: String,
}

impl ValidationError {
    #[must_use]
    pub fn undefined_dependency(unit: &str, missing_name: &str) -> Self {
        Self {
            kind: ValidationErrorKind::UndefinedDependency,
            unit: unit.to_string(),
            missing_name: missing_name.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// A directed dependency graph over the units of one project.
///
/// Nodes are unit names. An edge `u → v` means "u depends on v". Every edge
/// endpoint is a registered unit.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    /// Outgoing edges per vertex, in dependency declaration order.
    adjacency: Vec<Vec<NodeIndex>>,
    /// BLAKE3 content hash of the vertex and edge lists.
    pub content_hash: String,
}

impl DependencyGraph {
    /// Return the number of vertices (units).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of validated dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the `NodeIndex` for a unit name.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    /// Return the unit name for a vertex, or `""` for an unknown index.
    #[must_use]
    pub fn name(&self, idx: NodeIndex) -> &str {
        self.graph.node_weight(idx).map_or("", String::as_str)
    }

    /// Vertices in registry order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Direct dependencies of `idx`, in declaration order.
    #[must_use]
    pub fn dependencies(&self, idx: NodeIndex) -> &[NodeIndex] {
        match self.adjacency.get(idx.index()) {
            Some(deps) => deps,
            None => &[],
        }
    }

    /// Units that directly depend on `idx`, in registry order.
    #[must_use]
    pub fn dependents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut dependents: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        dependents.sort_unstable();
        dependents
    }

    /// All edges as `(dependent, dependency)` name pairs, in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(from, deps)| {
            let from = self.name(NodeIndex::new(from));
            deps.iter().map(move |&to| (from, self.name(to)))
        })
    }

    /// Number of weakly connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Ratio of edges to the maximum possible `n * (n - 1)`.
    #[must_use]
    pub fn density(&self) -> f64 {
        compute_density(self.node_count(), self.edge_count())
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build a [`DependencyGraph`] from `registry`.
///
/// Returns the graph together with one [`ValidationError`] per dependency
/// that names an unregistered unit. The registry is not modified, and
/// repeated calls produce identical graphs and error lists.
#[must_use]
#[instrument(skip(registry), fields(units = registry.len()))]
pub fn build(registry: &UnitRegistry) -> (DependencyGraph, Vec<ValidationError>) {
    let mut graph = DiGraph::<String, ()>::with_capacity(registry.len(), registry.len());
    let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(registry.len());

    for unit in registry {
        let idx = graph.add_node(unit.name.clone());
        node_map.insert(unit.name.clone(), idx);
    }

    let mut adjacency: Vec<Vec<NodeIndex>> = vec![Vec::new(); registry.len()];
    let mut errors = Vec::new();

    for (pos, unit) in registry.iter().enumerate() {
        let from = NodeIndex::new(pos);
        // The registry already collapsed duplicate dependency names, so each
        // edge is added at most once.
        for dep in &unit.depends_on {
            if let Some(&to) = node_map.get(dep) {
                graph.add_edge(from, to, ());
                adjacency[pos].push(to);
            } else {
                errors.push(ValidationError::undefined_dependency(&unit.name, dep));
            }
        }
    }

    let content_hash = compute_content_hash(&graph, &adjacency);

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dangling = errors.len(),
        "built dependency graph"
    );

    (
        DependencyGraph {
            graph,
            node_map,
            adjacency,
            content_hash,
        },
        errors,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// BLAKE3 over the vertex names followed by the edge list.
fn compute_content_hash(graph: &DiGraph<String, ()>, adjacency: &[Vec<NodeIndex>]) -> String {
    let mut hasher = blake3::Hasher::new();
    for name in graph.node_weights() {
        hasher.update(name.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for (from, deps) in adjacency.iter().enumerate() {
        for to in deps {
            hasher.update(graph[NodeIndex::new(from)].as_bytes());
            hasher.update(b"\x00");
            hasher.update(graph[*to].as_bytes());
            hasher.update(b"\x00");
        }
    }
    format!("blake3:{}", hasher.finalize())
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let max_edges = node_count * (node_count - 1);
    edge_count as f64 / max_edges as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
