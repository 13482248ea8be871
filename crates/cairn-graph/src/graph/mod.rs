//! Dependency graph module for project analysis.
//!
//! # Overview
//!
//! This module turns a validated [`UnitRegistry`] into a directed dependency
//! graph and runs the ordering algorithms over it. Every stage is pure and
//! single-threaded; each analysis call owns its graph exclusively.
//!
//! ## Pipeline
//!
//! ```text
//! UnitRegistry (declaration order)
//!        ↓  build::build()
//! DependencyGraph + Vec<ValidationError>   (dangling references dropped)
//!        ↓  cycles::find_cycles()
//! Vec<Cycle>                               (DFS back edges, incl. self-loops)
//!        ↓  cycles::blocked_by_cycles()
//! excluded = cyclic ∪ blocked
//!        ├─ order::build_order()   → Vec<String>       (lexicographic Kahn)
//!        └─ waves::deploy_waves()  → Vec<Vec<String>>  (parallel layers)
//! ```
//!
//! ## Edge Direction
//!
//! An edge `u → v` means "u depends on v": `v` must be built before `u`.
//! This is the reverse of the "blocker → blocked" convention; dependencies
//! are stored the way the manifest declares them.
//!
//! [`UnitRegistry`]: cairn_core::UnitRegistry

pub mod build;
pub mod cycles;
pub mod order;
pub mod waves;

// Re-export primary types at module level for convenience.
pub use build::{DependencyGraph, ValidationError, ValidationErrorKind, build};
pub use cycles::{Cycle, blocked_by_cycles, cyclic_nodes, find_cycles};
pub use order::build_order;
pub use waves::deploy_waves;
