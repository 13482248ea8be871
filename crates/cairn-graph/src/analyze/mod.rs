//! Project analysis: from unit declarations to an [`AnalysisReport`].
//!
//! [`analyze`] validates the declarations, builds the graph, detects cycles,
//! excludes cyclic units and everything that depends on them, and computes
//! the build order and deploy waves. Findings never abort the analysis; only
//! malformed declarations do.

mod report;

pub use report::{AnalysisReport, Edge, Finding, Summary, UnitEntry, Warning, WarningKind};

use cairn_core::{MalformedInput, UnitDecl, UnitRegistry, UnitStats};
use tracing::{debug, info, instrument};

use crate::graph::{
    DependencyGraph, blocked_by_cycles, build, build_order, cyclic_nodes, deploy_waves,
    find_cycles,
};

/// Analyze a list of unit declarations.
///
/// `stats` supplies optional per-unit line counts; pass an empty
/// [`UnitStats`] to skip them.
///
/// # Errors
///
/// Returns [`MalformedInput`] if a declaration has an empty name, a name is
/// declared twice, or a dependency name is empty.
#[instrument(skip_all)]
pub fn analyze<I>(decls: I, stats: &UnitStats) -> Result<AnalysisReport, MalformedInput>
where
    I: IntoIterator<Item = UnitDecl>,
{
    let registry = UnitRegistry::from_decls(decls)?;
    debug!(units = registry.len(), "validated unit registry");
    Ok(analyze_registry(&registry, stats))
}

/// Analyze an already validated registry. Infallible and deterministic.
#[must_use]
#[instrument(skip_all, fields(units = registry.len()))]
pub fn analyze_registry(registry: &UnitRegistry, stats: &UnitStats) -> AnalysisReport {
    let (graph, validation_errors) = build(registry);

    let cycles = find_cycles(&graph);
    let mut excluded = cyclic_nodes(&cycles);
    let cyclic = excluded.len();
    let blocked = blocked_by_cycles(&graph, &excluded);
    excluded.extend(blocked.iter().copied());
    debug!(
        cycles = cycles.len(),
        cyclic,
        blocked = blocked.len(),
        "cycle detection finished"
    );

    let order = build_order(&graph, &excluded);
    let waves = deploy_waves(&graph, &excluded);
    debug!(ordered = order.len(), waves = waves.len(), "ordering finished");

    let mut errors: Vec<Finding> = validation_errors
        .iter()
        .map(|err| Finding::UndefinedDependency {
            unit: err.unit.clone(),
            missing_name: err.missing_name.clone(),
            detail: err.to_string(),
        })
        .collect();
    errors.extend(cycles.iter().filter_map(|cycle| {
        let (from, to) = cycle.closing_edge()?;
        Some(Finding::Cycle {
            members: cycle.members.clone(),
            suggested_break: Edge::new(from, to),
            detail: cycle.to_string(),
        })
    }));

    let warnings: Vec<Warning> = blocked
        .iter()
        .map(|&idx| Warning::blocked_by_cycle(graph.name(idx)))
        .collect();

    let units: Vec<UnitEntry> = registry
        .iter()
        .map(|unit| UnitEntry {
            name: unit.name.clone(),
            kind: unit.kind,
            lines: stats.lines(&unit.name),
        })
        .collect();

    let summary = summarize(registry, &graph, stats, &errors, &warnings, cycles.len());

    info!(
        units = summary.unit_count,
        edges = summary.edge_count,
        cycles = summary.cycle_count,
        errors = summary.error_count,
        warnings = summary.warning_count,
        deployable = errors.is_empty(),
        "analysis complete"
    );

    AnalysisReport {
        units,
        edges: graph.edges().map(|(from, to)| Edge::new(from, to)).collect(),
        errors,
        warnings,
        cycles: cycles.into_iter().map(|cycle| cycle.members).collect(),
        build_order: order,
        blocked: blocked
            .iter()
            .map(|&idx| graph.name(idx).to_string())
            .collect(),
        deploy_waves: waves,
        summary,
        content_hash: graph.content_hash,
    }
}

fn summarize(
    registry: &UnitRegistry,
    graph: &DependencyGraph,
    stats: &UnitStats,
    errors: &[Finding],
    warnings: &[Warning],
    cycle_count: usize,
) -> Summary {
    // Only count lines for registered units.
    let registered: UnitStats = registry
        .iter()
        .filter_map(|unit| Some((unit.name.clone(), stats.lines(&unit.name)?)))
        .collect();

    Summary {
        unit_count: registry.len(),
        edge_count: graph.edge_count(),
        cycle_count,
        error_count: errors.len(),
        warning_count: warnings.len(),
        kind_counts: registry.kind_counts(),
        total_lines: registered.total_lines(),
        density: graph.density(),
        component_count: graph.component_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::UnitKind;

    fn decl(name: &str, deps: &[&str]) -> UnitDecl {
        UnitDecl::new(name, UnitKind::Motoko).depends_on(deps.iter().copied())
    }

    fn run(decls: Vec<UnitDecl>) -> AnalysisReport {
        analyze(decls, &UnitStats::new()).expect("well-formed input")
    }

    #[test]
    fn empty_project_is_deployable() {
        let report = run(vec![]);
        assert!(report.is_deployable());
        assert!(report.build_order.is_empty());
        assert!(report.deploy_waves.is_empty());
        assert_eq!(report.summary.unit_count, 0);
        assert_eq!(report.summary.total_lines, None);
    }

    #[test]
    fn malformed_input_aborts() {
        let err = analyze(vec![decl("a", &[]), decl("a", &[])], &UnitStats::new())
            .expect_err("duplicate name");
        assert!(matches!(err, MalformedInput::DuplicateName { .. }));
    }

    #[test]
    fn errors_list_undefined_dependencies_before_cycles() {
        let report = run(vec![decl("a", &["b"]), decl("b", &["a", "ghost"])]);

        assert_eq!(report.errors.len(), 2);
        assert!(matches!(
            &report.errors[0],
            Finding::UndefinedDependency { unit, missing_name, .. }
                if unit == "b" && missing_name == "ghost"
        ));
        assert!(matches!(&report.errors[1], Finding::Cycle { .. }));
        assert_eq!(report.cycle_findings().count(), 1);
        assert!(!report.is_deployable());
    }

    #[test]
    fn cycle_finding_suggests_closing_edge() {
        let report = run(vec![decl("a", &["b"]), decl("b", &["c"]), decl("c", &["a"])]);

        let Some(Finding::Cycle {
            members,
            suggested_break,
            ..
        }) = report.errors.first()
        else {
            panic!("expected a cycle finding, got {:?}", report.errors);
        };
        assert_eq!(members, &vec!["a", "b", "c"]);
        assert_eq!(suggested_break, &Edge::new("c", "a"));
    }

    #[test]
    fn blocked_units_are_warnings_not_errors() {
        let report = run(vec![
            decl("x", &["y"]),
            decl("y", &["x"]),
            decl("app", &["x"]),
            decl("lib", &[]),
        ]);

        assert_eq!(report.blocked, vec!["app"]);
        assert_eq!(report.warnings, vec![Warning::blocked_by_cycle("app")]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.build_order, vec!["lib"]);
        assert_eq!(report.deploy_waves, vec![vec!["lib".to_string()]]);
        assert_eq!(report.summary.warning_count, 1);
    }

    #[test]
    fn line_counts_flow_into_units_and_summary() {
        let mut stats = UnitStats::new();
        stats.insert("a", 120);
        stats.insert("b", 30);
        stats.insert("unrelated", 999);

        let report = analyze(vec![decl("a", &[]), decl("b", &["a"])], &stats).expect("valid");

        assert_eq!(report.units[0].lines, Some(120));
        assert_eq!(report.units[1].lines, Some(30));
        assert_eq!(report.summary.total_lines, Some(150));
    }

    #[test]
    fn line_counts_for_unknown_units_only_leave_total_absent() {
        let mut stats = UnitStats::new();
        stats.insert("retired", 400);

        let report = analyze(vec![decl("a", &[])], &stats).expect("valid");

        assert_eq!(report.units[0].lines, None);
        assert_eq!(report.summary.total_lines, None);
    }

    #[test]
    fn summary_counts_kinds() {
        let report = run(vec![
            UnitDecl::new("backend", UnitKind::Rust),
            UnitDecl::new("frontend", UnitKind::Assets).depends_on(["backend"]),
            UnitDecl::new("index", UnitKind::Rust),
        ]);

        assert_eq!(report.summary.kind_counts.get(&UnitKind::Rust), Some(&2));
        assert_eq!(report.summary.kind_counts.get(&UnitKind::Assets), Some(&1));
        assert_eq!(report.summary.edge_count, 1);
        assert_eq!(report.summary.component_count, 2);
    }

    #[test]
    fn content_hash_matches_graph() {
        let report = run(vec![decl("a", &[]), decl("b", &["a"])]);
        assert!(report.content_hash.starts_with("blake3:"));
    }
}
