#![forbid(unsafe_code)]
//! cairn-graph library.
//!
//! Builds the inter-canister dependency graph, finds cycles, and computes the
//! deterministic build order and deploy waves that make up an
//! [`AnalysisReport`].
//!
//! # Conventions
//!
//! - **Errors**: recoverable findings live in the report; only
//!   [`cairn_core::MalformedInput`] aborts an analysis.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod analyze;
pub mod graph;

pub use analyze::{
    AnalysisReport, Edge, Finding, Summary, UnitEntry, Warning, WarningKind, analyze,
    analyze_registry,
};
pub use graph::{Cycle, DependencyGraph, ValidationError};
