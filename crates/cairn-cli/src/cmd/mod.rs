//! Command handlers.
//!
//! Every analysis command goes through [`load_report`]: read the manifest,
//! validate it into a registry, optionally count source lines, and run the
//! analyzer. Failures are rendered through the shared output layer before
//! being returned, so handlers only need `?`.

pub mod analyze;
pub mod completions;
pub mod cycles;
pub mod order;
pub mod plan;

use std::path::{Path, PathBuf};

use cairn_core::config::ProjectConfig;
use cairn_core::{ErrorCode, UnitRegistry, UnitStats, collect_line_counts, load_manifest};
use cairn_graph::{AnalysisReport, analyze_registry};
use clap::Args;
use tracing::{debug, warn};

use crate::output::{CliError, OutputMode, render_error};

/// Manifest selection shared by every analysis command.
#[derive(Args, Debug, Default, Clone)]
pub struct ManifestArgs {
    /// Path to the project manifest (default: `analyze.manifest` from
    /// `.cairn/config.toml`, else `dfx.json`). Relative paths resolve
    /// against the project root.
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

impl ManifestArgs {
    /// The manifest path to read, resolved against `project_root`.
    pub fn resolve(&self, project_root: &Path, config: &ProjectConfig) -> PathBuf {
        let path = self.manifest.as_ref().unwrap_or(&config.analyze.manifest);
        if path.is_absolute() {
            path.clone()
        } else {
            project_root.join(path)
        }
    }
}

/// Load the manifest and analyze it.
///
/// When `count_lines` is set, source paths are resolved against the
/// manifest's directory.
///
/// # Errors
///
/// Returns an error (already rendered to stderr) if the manifest cannot be
/// read or parsed, or declares malformed units.
pub fn load_report(
    manifest_path: &Path,
    count_lines: bool,
    output: OutputMode,
) -> anyhow::Result<AnalysisReport> {
    let decls = match load_manifest(manifest_path) {
        Ok(decls) => decls,
        Err(err) => return Err(fail(output, err.error_code(), &err)),
    };

    let registry = match UnitRegistry::from_decls(decls) {
        Ok(registry) => registry,
        Err(err) => return Err(fail(output, ErrorCode::MalformedInput, &err)),
    };

    let stats = if count_lines {
        let root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let stats = collect_line_counts(root, &registry);
        let declares_sources = registry.iter().any(|unit| !unit.sources.is_empty());
        if stats.is_empty() && declares_sources {
            warn!(
                code = %ErrorCode::StatsUnavailable,
                root = %root.display(),
                "no declared source could be read; line counts omitted"
            );
        }
        stats
    } else {
        debug!("line counting disabled");
        UnitStats::new()
    };

    Ok(analyze_registry(&registry, &stats))
}

/// Render `err` with its stable code and turn it into an `anyhow` error.
pub fn fail(output: OutputMode, code: ErrorCode, err: &dyn std::fmt::Display) -> anyhow::Error {
    let message = err.to_string();
    if let Err(render_err) = render_error(output, &CliError::from_code(code, message.clone())) {
        return render_err;
    }
    anyhow::anyhow!("{code}: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "canisters": {
            "backend": { "type": "motoko", "main": "src/backend/main.mo" },
            "frontend": { "type": "assets", "dependencies": ["backend"], "source": ["dist"] }
        }
    }"#;

    #[test]
    fn manifest_flag_overrides_config() {
        let args = ManifestArgs {
            manifest: Some(PathBuf::from("other/dfx.json")),
        };
        let resolved = args.resolve(Path::new("/proj"), &ProjectConfig::default());
        assert_eq!(resolved, PathBuf::from("/proj/other/dfx.json"));
    }

    #[test]
    fn config_manifest_is_default() {
        let resolved = ManifestArgs::default().resolve(Path::new("/proj"), &ProjectConfig::default());
        assert_eq!(resolved, PathBuf::from("/proj/dfx.json"));
    }

    #[test]
    fn absolute_manifest_is_kept() {
        let args = ManifestArgs {
            manifest: Some(PathBuf::from("/elsewhere/dfx.json")),
        };
        let resolved = args.resolve(Path::new("/proj"), &ProjectConfig::default());
        assert_eq!(resolved, PathBuf::from("/elsewhere/dfx.json"));
    }

    #[test]
    fn load_report_counts_lines_relative_to_manifest() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("dfx.json"), MANIFEST).expect("write manifest");
        fs::create_dir_all(dir.path().join("src/backend")).expect("mkdir");
        fs::write(dir.path().join("src/backend/main.mo"), "actor {\n}\n").expect("write");

        let report =
            load_report(&dir.path().join("dfx.json"), true, OutputMode::Json).expect("report");

        assert_eq!(report.build_order, vec!["backend", "frontend"]);
        assert_eq!(report.units[0].lines, Some(2));
        assert_eq!(report.units[1].lines, None);
    }

    #[test]
    fn load_report_without_lines() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("dfx.json"), MANIFEST).expect("write manifest");

        let report =
            load_report(&dir.path().join("dfx.json"), false, OutputMode::Json).expect("report");
        assert!(report.units.iter().all(|unit| unit.lines.is_none()));
        assert_eq!(report.summary.total_lines, None);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_report(&dir.path().join("dfx.json"), false, OutputMode::Json)
            .expect_err("missing manifest");
        assert!(err.to_string().starts_with("E1001"));
    }
}
