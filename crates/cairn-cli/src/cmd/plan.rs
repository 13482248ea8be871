//! `cairn plan`: deploy waves of units that can be built in parallel.

use std::io::Write;
use std::path::Path;

use cairn_core::config::ProjectConfig;
use cairn_graph::AnalysisReport;
use clap::Args;
use serde::Serialize;

use super::{ManifestArgs, load_report};
use crate::output::{OutputMode, render_mode};

/// Arguments for `cairn plan`.
#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    waves: Vec<Vec<String>>,
    blocked: Vec<String>,
    deployable: bool,
}

impl From<AnalysisReport> for PlanOutput {
    fn from(report: AnalysisReport) -> Self {
        let deployable = report.is_deployable();
        Self {
            waves: report.deploy_waves,
            blocked: report.blocked,
            deployable,
        }
    }
}

/// Execute `cairn plan`.
pub fn run_plan(
    args: &PlanArgs,
    output: OutputMode,
    project_root: &Path,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let manifest_path = args.manifest.resolve(project_root, config);
    let report = load_report(&manifest_path, false, output)?;
    let payload = PlanOutput::from(report);

    render_mode(output, &payload, render_plan_text, render_plan_human)
}

fn render_plan_text(payload: &PlanOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (idx, wave) in payload.waves.iter().enumerate() {
        writeln!(w, "{idx} {}", wave.join(" "))?;
    }
    Ok(())
}

fn render_plan_human(payload: &PlanOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "Deploy plan")?;

    if payload.waves.is_empty() {
        writeln!(w, "(no deployable units)")?;
    }

    for (idx, wave) in payload.waves.iter().enumerate() {
        let noun = if wave.len() == 1 { "unit" } else { "units" };
        writeln!(w, "\nWave {} ({} {noun}):", idx + 1, wave.len())?;
        for name in wave {
            writeln!(w, "  - {name}")?;
        }
    }

    if !payload.deployable {
        writeln!(w, "\nnote: the manifest has errors; run `cairn analyze` for details")?;
    }

    Ok(())
}
