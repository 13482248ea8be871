//! `cairn order`: the deterministic build order.

use std::io::Write;
use std::path::Path;

use cairn_core::config::ProjectConfig;
use cairn_graph::AnalysisReport;
use clap::Args;
use serde::Serialize;

use super::{ManifestArgs, load_report};
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `cairn order`.
#[derive(Args, Debug, Default)]
pub struct OrderArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderOutput {
    build_order: Vec<String>,
    /// Units left out because they sit on or depend on a cycle.
    excluded: Vec<String>,
}

impl OrderOutput {
    fn from_report(report: AnalysisReport) -> Self {
        let mut excluded: Vec<String> = report.cycles.into_iter().flatten().collect();
        excluded.extend(report.blocked);
        excluded.sort_unstable();
        excluded.dedup();
        Self {
            build_order: report.build_order,
            excluded,
        }
    }
}

/// Execute `cairn order`.
pub fn run_order(
    args: &OrderArgs,
    output: OutputMode,
    project_root: &Path,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let manifest_path = args.manifest.resolve(project_root, config);
    let report = load_report(&manifest_path, false, output)?;
    let payload = OrderOutput::from_report(report);

    render_mode(output, &payload, render_order_text, render_order_pretty)
}

fn render_order_text(payload: &OrderOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for name in &payload.build_order {
        writeln!(w, "{name}")?;
    }
    Ok(())
}

fn render_order_pretty(payload: &OrderOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Build order ({} units)", payload.build_order.len()))?;
    for (idx, name) in payload.build_order.iter().enumerate() {
        writeln!(w, "{:>3}. {name}", idx + 1)?;
    }
    if !payload.excluded.is_empty() {
        writeln!(w, "\nExcluded (cycle): {}", payload.excluded.join(", "))?;
    }
    Ok(())
}
