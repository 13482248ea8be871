//! `cairn cycles`: list dependency cycles with a suggested edge to break.

use std::io::Write;
use std::path::Path;

use cairn_core::config::ProjectConfig;
use cairn_graph::{AnalysisReport, Edge, Finding};
use clap::Args;
use serde::Serialize;

use super::{ManifestArgs, load_report};
use crate::output::{OutputMode, render_mode};

/// Arguments for `cairn cycles`.
#[derive(Args, Debug, Default)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<CycleEntry>,
    blocked: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CycleEntry {
    members: Vec<String>,
    suggested_break: Edge,
}

impl CyclesOutput {
    fn from_report(report: AnalysisReport) -> Self {
        let cycles = report
            .cycle_findings()
            .filter_map(|finding| match finding {
                Finding::Cycle {
                    members,
                    suggested_break,
                    ..
                } => Some(CycleEntry {
                    members: members.clone(),
                    suggested_break: suggested_break.clone(),
                }),
                Finding::UndefinedDependency { .. } => None,
            })
            .collect();
        Self {
            cycles,
            blocked: report.blocked,
        }
    }
}

/// Execute `cairn cycles`.
pub fn run_cycles(
    args: &CyclesArgs,
    output: OutputMode,
    project_root: &Path,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let manifest_path = args.manifest.resolve(project_root, config);
    let report = load_report(&manifest_path, false, output)?;
    let payload = CyclesOutput::from_report(report);

    render_mode(output, &payload, render_cycles_text, render_cycles_human)
}

fn render_cycles_text(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for cycle in &payload.cycles {
        writeln!(
            w,
            "{}  break={}->{}",
            cycle.members.join(" "),
            cycle.suggested_break.from,
            cycle.suggested_break.to
        )?;
    }
    Ok(())
}

fn render_cycles_human(payload: &CyclesOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Dependency cycles ({})", payload.cycles.len())?;

    for (idx, cycle) in payload.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for name in &cycle.members {
            writeln!(w, "  - {name}")?;
        }
        writeln!(
            w,
            "  break: remove {} → {}",
            cycle.suggested_break.from, cycle.suggested_break.to
        )?;
    }

    if !payload.blocked.is_empty() {
        writeln!(w, "\nBlocked by cycles: {}", payload.blocked.join(", "))?;
    }

    Ok(())
}
