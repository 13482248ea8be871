//! Cycle detection for the dependency graph.
//!
//! # Overview
//!
//! A cycle makes every unit on it unbuildable: each waits on another in the
//! loop. [`find_cycles`] runs a depth-first search from every unvisited
//! vertex in registry order, colouring vertices white (unvisited), gray (on
//! the current DFS path) and black (finished). An edge into a gray vertex is
//! a back edge; the cycle it closes is the slice of the current path from
//! that vertex to the top, in traversal order.
//!
//! # Design
//!
//! - **Iterative**: an explicit frame stack replaces recursion, so long
//!   dependency chains cannot overflow the call stack.
//! - **Fixed-size state**: colours and path positions live in `Vec`s indexed
//!   by `NodeIndex::index()`.
//! - **Deterministic**: start vertices follow registry order and neighbours
//!   follow dependency declaration order, so the same input always reports
//!   the same cycles in the same order.
//! - **O(V+E)**: every vertex is entered once and every edge inspected once.
//!
//! A self-dependency is reported as a one-element cycle the moment its edge
//! is inspected.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashSet, VecDeque};
use std::fmt;

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::graph::build::DependencyGraph;

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

/// A dependency cycle, in traversal order.
///
/// Each member depends on the next one and the last depends on the first.
/// For a self-dependency the cycle has a single member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    nodes: Vec<NodeIndex>,
    /// Unit names, parallel to the vertex list.
    pub members: Vec<String>,
}

impl Cycle {
    fn from_path(graph: &DependencyGraph, path: &[NodeIndex]) -> Self {
        Self {
            nodes: path.to_vec(),
            members: path.iter().map(|&idx| graph.name(idx).to_string()).collect(),
        }
    }

    /// Vertices on the cycle.
    #[must_use]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Number of distinct units in the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The back edge that closed the cycle, as `(dependent, dependency)`.
    ///
    /// Removing this one declared dependency breaks the cycle.
    #[must_use]
    pub fn closing_edge(&self) -> Option<(&str, &str)> {
        let last = self.members.last()?;
        let first = self.members.first()?;
        Some((last.as_str(), first.as_str()))
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.members.as_slice() {
            [] => f.write_str("empty cycle"),
            [only] => write!(f, "cycle: '{only}' depends on itself"),
            [first, ..] => write!(
                f,
                "cycle ({} units): {} → {first}",
                self.len(),
                self.members.join(" → ")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Core detection
// ---------------------------------------------------------------------------

/// DFS colours for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// Currently on the DFS path (in progress).
    Gray,
    /// Fully processed (all dependencies visited).
    Black,
}

/// Find every cycle closed by a DFS back edge in `graph`.
///
/// Cycles are returned in discovery order. Each cycle lists its members in
/// traversal order, starting at the vertex the back edge points to.
#[must_use]
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let n = graph.node_count();
    let mut color = vec![Color::White; n];
    // Position of each gray vertex on `path`, for O(1) slice extraction.
    let mut path_pos = vec![usize::MAX; n];
    let mut path: Vec<NodeIndex> = Vec::new();
    // Each frame: (vertex, index of the next dependency to inspect).
    let mut frames: Vec<(NodeIndex, usize)> = Vec::new();
    let mut cycles = Vec::new();

    for start in graph.node_indices() {
        if color[start.index()] != Color::White {
            continue;
        }

        color[start.index()] = Color::Gray;
        path_pos[start.index()] = path.len();
        path.push(start);
        frames.push((start, 0));

        while let Some(frame) = frames.last_mut() {
            let current = frame.0;
            let Some(&dep) = graph.dependencies(current).get(frame.1) else {
                // All dependencies inspected: finish this vertex.
                frames.pop();
                path.pop();
                color[current.index()] = Color::Black;
                path_pos[current.index()] = usize::MAX;
                continue;
            };
            frame.1 += 1;

            match color[dep.index()] {
                Color::White => {
                    color[dep.index()] = Color::Gray;
                    path_pos[dep.index()] = path.len();
                    path.push(dep);
                    frames.push((dep, 0));
                }
                Color::Gray => {
                    let from = path_pos[dep.index()];
                    cycles.push(Cycle::from_path(graph, &path[from..]));
                }
                Color::Black => {}
            }
        }
    }

    debug!(cycles = cycles.len(), "cycle detection finished");
    cycles
}

/// Union of the vertices of every cycle in `cycles`.
#[must_use]
pub fn cyclic_nodes(cycles: &[Cycle]) -> HashSet<NodeIndex> {
    cycles
        .iter()
        .flat_map(|cycle| cycle.nodes().iter().copied())
        .collect()
}

/// Vertices outside `cyclic` that depend, directly or transitively, on a
/// vertex in `cyclic`. Returned in registry order.
///
/// Such units can never be built because one of their dependencies never
/// will be.
#[must_use]
pub fn blocked_by_cycles(graph: &DependencyGraph, cyclic: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
    let mut reached = vec![false; graph.node_count()];
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();

    for &idx in cyclic {
        if let Some(slot) = reached.get_mut(idx.index()) {
            *slot = true;
            queue.push_back(idx);
        }
    }

    while let Some(current) = queue.pop_front() {
        for dependent in graph.dependents(current) {
            if !reached[dependent.index()] {
                reached[dependent.index()] = true;
                queue.push_back(dependent);
            }
        }
    }

    graph
        .node_indices()
        .filter(|idx| reached[idx.index()] && !cyclic.contains(idx))
        .collect()
}
