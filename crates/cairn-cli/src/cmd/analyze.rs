//! `cairn analyze`: full dependency report for a project manifest.

use std::io::Write;
use std::path::Path;

use cairn_core::ErrorCode;
use cairn_core::config::ProjectConfig;
use cairn_graph::{AnalysisReport, Finding};
use clap::Args;

use super::{ManifestArgs, fail, load_report};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `cairn analyze`.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Skip per-unit source line counts.
    #[arg(long)]
    pub no_lines: bool,

    /// Exit non-zero when the project is not deployable.
    #[arg(long)]
    pub strict: bool,
}

/// Execute `cairn analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    output: OutputMode,
    project_root: &Path,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let manifest_path = args.manifest.resolve(project_root, config);
    let count_lines = config.analyze.count_lines && !args.no_lines;
    let report = load_report(&manifest_path, count_lines, output)?;

    render_mode(output, &report, render_analyze_text, render_analyze_pretty)?;

    if (args.strict || config.analyze.strict) && !report.is_deployable() {
        return Err(fail(
            output,
            ErrorCode::NotDeployable,
            &format!(
                "{} error(s) found in {}",
                report.errors.len(),
                manifest_path.display()
            ),
        ));
    }
    Ok(())
}

fn finding_code(finding: &Finding) -> ErrorCode {
    match finding {
        Finding::UndefinedDependency { .. } => ErrorCode::UndefinedDependency,
        Finding::Cycle { .. } => ErrorCode::CycleDetected,
    }
}

fn render_analyze_text(report: &AnalysisReport, w: &mut dyn Write) -> std::io::Result<()> {
    let status = if report.is_deployable() { "ok" } else { "errors" };
    writeln!(
        w,
        "status={status} units={} edges={} cycles={} errors={} warnings={}",
        report.summary.unit_count,
        report.summary.edge_count,
        report.summary.cycle_count,
        report.summary.error_count,
        report.summary.warning_count,
    )?;
    writeln!(w, "order {}", report.build_order.join(" "))?;
    for finding in &report.errors {
        writeln!(w, "error {} {}", finding_code(finding), finding.detail())?;
    }
    for warning in &report.warnings {
        writeln!(w, "warning {}", warning.detail)?;
    }
    Ok(())
}

fn render_analyze_pretty(report: &AnalysisReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Project analysis")?;
    pretty_kv(w, "Units", report.summary.unit_count.to_string())?;
    pretty_kv(w, "Edges", report.summary.edge_count.to_string())?;
    if let Some(total) = report.summary.total_lines {
        pretty_kv(w, "Lines", total.to_string())?;
    }
    pretty_kv(
        w,
        "Status",
        if report.is_deployable() {
            "deployable"
        } else {
            "not deployable"
        },
    )?;

    writeln!(w)?;
    pretty_section(w, "Unit kinds")?;
    for (kind, count) in &report.summary.kind_counts {
        writeln!(w, "  {kind:<8} {count:>3}  {}", kind.description())?;
    }

    writeln!(w)?;
    pretty_section(w, "Build order")?;
    if report.build_order.is_empty() {
        writeln!(w, "(nothing buildable)")?;
    }
    for (idx, name) in report.build_order.iter().enumerate() {
        writeln!(w, "{:>3}. {name}", idx + 1)?;
    }

    if !report.errors.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Errors ({})", report.errors.len()))?;
        for finding in &report.errors {
            writeln!(w, "  [{}] {}", finding_code(finding), finding.detail())?;
            if let Finding::Cycle {
                suggested_break, ..
            } = finding
            {
                writeln!(
                    w,
                    "        suggestion: remove {} → {}",
                    suggested_break.from, suggested_break.to
                )?;
            }
        }
    }

    if !report.warnings.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Warnings ({})", report.warnings.len()))?;
        for warning in &report.warnings {
            writeln!(w, "  {}", warning.detail)?;
        }
    }

    Ok(())
}
