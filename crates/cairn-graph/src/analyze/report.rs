//! The serialized analysis report.
//!
//! Every collection in the report is ordered (registry order, discovery
//! order, or name order), so serializing the same input twice yields
//! byte-identical JSON.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use cairn_core::UnitKind;
use serde::Serialize;

/// The complete result of analyzing one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Every unit, in declaration order.
    pub units: Vec<UnitEntry>,
    /// Validated dependency edges, in declaration order.
    pub edges: Vec<Edge>,
    /// Undefined dependencies first, then cycles.
    pub errors: Vec<Finding>,
    pub warnings: Vec<Warning>,
    /// Each cycle's members, in traversal order.
    pub cycles: Vec<Vec<String>>,
    pub build_order: Vec<String>,
    /// Non-cyclic units excluded because they depend on a cycle.
    pub blocked: Vec<String>,
    pub deploy_waves: Vec<Vec<String>>,
    pub summary: Summary,
    pub content_hash: String,
}

impl AnalysisReport {
    /// A project is deployable when the analysis found no errors.
    #[must_use]
    pub fn is_deployable(&self) -> bool {
        self.errors.is_empty()
    }

    /// Findings of kind [`Finding::Cycle`], in discovery order.
    pub fn cycle_findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .filter(|finding| matches!(finding, Finding::Cycle { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitEntry {
    pub name: String,
    pub kind: UnitKind,
    /// Source line count, when statistics were gathered for this unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,
}

/// A dependency edge: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// An error-level finding. Any finding makes the project undeployable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Finding {
    /// `unit` declares a dependency on `missing_name`, which does not exist.
    #[serde(rename_all = "camelCase")]
    UndefinedDependency {
        unit: String,
        missing_name: String,
        detail: String,
    },
    /// The members depend on each other in a loop.
    #[serde(rename_all = "camelCase")]
    Cycle {
        members: Vec<String>,
        /// Removing this edge breaks the cycle.
        suggested_break: Edge,
        detail: String,
    },
}

impl Finding {
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::UndefinedDependency { detail, .. } | Self::Cycle { detail, .. } => detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    BlockedByCycle,
}

/// A warning-level finding. Warnings do not affect deployability on their
/// own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub unit: String,
    pub detail: String,
}

impl Warning {
    #[must_use]
    pub fn blocked_by_cycle(unit: &str) -> Self {
        Self {
            kind: WarningKind::BlockedByCycle,
            unit: unit.to_string(),
            detail: format!("unit '{unit}' depends on a dependency cycle and cannot be built"),
        }
    }
}

/// Aggregate counts over the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub unit_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub kind_counts: BTreeMap<UnitKind, usize>,
    /// Total source lines, when statistics were gathered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lines: Option<usize>,
    pub density: f64,
    pub component_count: usize,
}
