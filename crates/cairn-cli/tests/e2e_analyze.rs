//! E2E tests for the analysis commands.
//!
//! Each test writes a `dfx.json` into a temp directory and runs the `cairn`
//! binary against it, checking JSON on stdout and error envelopes on stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cairn_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cairn"));
    cmd.current_dir(dir);
    cmd.env("CAIRN_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".xdg"));
    cmd.env_remove("FORMAT");
    cmd
}

fn project(manifest: &Value) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("dfx.json"),
        serde_json::to_string_pretty(manifest).expect("manifest json"),
    )
    .expect("write manifest");
    dir
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = cairn_cmd(dir)
        .arg("--json")
        .args(args)
        .output()
        .expect("cairn should not crash");
    assert!(
        output.status.success(),
        "cairn {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn linear() -> Value {
    json!({
        "canisters": {
            "A": { "type": "motoko" },
            "B": { "type": "rust", "dependencies": ["A"] },
            "C": { "type": "assets", "dependencies": ["A", "B"] }
        }
    })
}

fn mutual() -> Value {
    json!({
        "canisters": {
            "A": { "type": "motoko", "dependencies": ["B"] },
            "B": { "type": "motoko", "dependencies": ["A"] }
        }
    })
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_linear_project() {
    let dir = project(&linear());
    let report = run_json(dir.path(), &["analyze"]);

    assert_eq!(report["buildOrder"], json!(["A", "B", "C"]));
    assert_eq!(report["cycles"], json!([]));
    assert_eq!(report["errors"], json!([]));
    assert_eq!(report["deployWaves"], json!([["A"], ["B"], ["C"]]));
    assert_eq!(report["summary"]["unitCount"], 3);
    assert!(
        report["contentHash"]
            .as_str()
            .expect("hash")
            .starts_with("blake3:")
    );
}

#[test]
fn analyze_cycle_succeeds_without_strict() {
    let dir = project(&mutual());
    let report = run_json(dir.path(), &["analyze"]);

    assert_eq!(report["cycles"], json!([["A", "B"]]));
    assert_eq!(report["buildOrder"], json!([]));
    assert_eq!(report["errors"][0]["kind"], "Cycle");
}

#[test]
fn analyze_strict_fails_when_not_deployable() {
    let dir = project(&mutual());
    cairn_cmd(dir.path())
        .args(["--json", "analyze", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"buildOrder\""))
        .stderr(predicate::str::contains("E2004"));
}

#[test]
fn analyze_strict_passes_when_deployable() {
    let dir = project(&linear());
    cairn_cmd(dir.path())
        .args(["--json", "analyze", "--strict"])
        .assert()
        .success();
}

#[test]
fn analyze_undeclared_dependency() {
    let dir = project(&json!({
        "canisters": { "A": { "type": "custom", "dependencies": ["Z"] } }
    }));
    let report = run_json(dir.path(), &["analyze"]);

    assert_eq!(report["edges"], json!([]));
    assert_eq!(report["buildOrder"], json!(["A"]));
    assert_eq!(report["errors"][0]["kind"], "UndefinedDependency");
    assert_eq!(report["errors"][0]["unit"], "A");
    assert_eq!(report["errors"][0]["missingName"], "Z");
}

#[test]
fn analyze_counts_source_lines() {
    let dir = project(&json!({
        "canisters": {
            "backend": { "type": "motoko", "main": "src/main.mo" }
        }
    }));
    fs::create_dir_all(dir.path().join("src")).expect("mkdir");
    fs::write(dir.path().join("src/main.mo"), "actor {\n  public func f() {};\n}\n")
        .expect("write source");

    let report = run_json(dir.path(), &["analyze"]);
    assert_eq!(report["units"][0]["lines"], 3);
    assert_eq!(report["summary"]["totalLines"], 3);

    let without = run_json(dir.path(), &["analyze", "--no-lines"]);
    assert!(without["units"][0].get("lines").is_none());
}

#[test]
fn analyze_is_byte_identical_across_runs() {
    let dir = project(&json!({
        "canisters": {
            "web": { "type": "assets", "dependencies": ["api", "ghost"] },
            "api": { "type": "rust", "dependencies": ["db", "cache"] },
            "cache": { "type": "rust", "dependencies": ["api"] },
            "db": { "type": "motoko" }
        }
    }));

    let first = cairn_cmd(dir.path())
        .args(["--json", "analyze"])
        .output()
        .expect("first run");
    let second = cairn_cmd(dir.path())
        .args(["--json", "analyze"])
        .output()
        .expect("second run");

    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn analyze_text_output() {
    let dir = project(&linear());
    cairn_cmd(dir.path())
        .args(["--format", "text", "analyze"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("status=ok units=3"))
        .stdout(predicate::str::contains("order A B C"));
}

#[test]
fn analyze_pretty_output_via_env() {
    let dir = project(&mutual());
    cairn_cmd(dir.path())
        .env("FORMAT", "pretty")
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project analysis"))
        .stdout(predicate::str::contains("not deployable"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_manifest_reports_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let output = cairn_cmd(dir.path())
        .args(["--json", "analyze"])
        .output()
        .expect("run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.find('{').expect("json error envelope");
    let end = stderr.rfind("}\n").expect("end of envelope") + 1;
    let envelope: Value = serde_json::from_str(&stderr[start..end]).expect("valid json");
    assert_eq!(envelope["error"]["error_code"], "E1001");
}

#[test]
fn unknown_kind_is_malformed_input() {
    let dir = project(&json!({
        "canisters": { "A": { "type": "cobol" } }
    }));
    cairn_cmd(dir.path())
        .args(["analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"))
        .stderr(predicate::str::contains("cobol"));
}

#[test]
fn invalid_json_is_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("dfx.json"), "{ not json").expect("write");
    cairn_cmd(dir.path())
        .args(["analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

#[test]
fn invalid_project_config_is_reported() {
    let dir = project(&linear());
    fs::create_dir_all(dir.path().join(".cairn")).expect("mkdir");
    fs::write(dir.path().join(".cairn/config.toml"), "[analyze\n").expect("write");

    cairn_cmd(dir.path())
        .args(["analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1003"));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn project_config_selects_manifest_and_strictness() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("canisters.json"),
        serde_json::to_string(&mutual()).expect("json"),
    )
    .expect("write manifest");
    fs::create_dir_all(dir.path().join(".cairn")).expect("mkdir");
    fs::write(
        dir.path().join(".cairn/config.toml"),
        "[analyze]\nmanifest = \"canisters.json\"\nstrict = true\n",
    )
    .expect("write config");

    cairn_cmd(dir.path())
        .args(["--json", "analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2004"));
}

#[test]
fn manifest_flag_and_root_flag() {
    let dir = TempDir::new().expect("tempdir");
    let nested = dir.path().join("app");
    fs::create_dir_all(&nested).expect("mkdir");
    fs::write(
        nested.join("deploy.json"),
        serde_json::to_string(&linear()).expect("json"),
    )
    .expect("write manifest");

    let root = nested.to_str().expect("utf8 path");
    let report = run_json(
        dir.path(),
        &["--root", root, "order", "--manifest", "deploy.json"],
    );
    assert_eq!(report["buildOrder"], json!(["A", "B", "C"]));
}

#[test]
fn user_config_sets_output_mode() {
    let dir = project(&linear());
    let config_dir = dir.path().join(".xdg/cairn");
    fs::create_dir_all(&config_dir).expect("mkdir");
    fs::write(config_dir.join("config.toml"), "output = \"json\"\n").expect("write");

    let output = cairn_cmd(dir.path())
        .arg("order")
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).expect("json from user config");
    assert_eq!(value["buildOrder"], json!(["A", "B", "C"]));
}

// ---------------------------------------------------------------------------
// order / cycles / plan
// ---------------------------------------------------------------------------

#[test]
fn order_text_is_one_unit_per_line() {
    let dir = project(&linear());
    cairn_cmd(dir.path())
        .args(["--format", "text", "order"])
        .assert()
        .success()
        .stdout("A\nB\nC\n");
}

#[test]
fn order_json_lists_excluded_units() {
    let dir = project(&json!({
        "canisters": {
            "A": { "type": "motoko", "dependencies": ["B"] },
            "B": { "type": "motoko", "dependencies": ["A"] },
            "C": { "type": "assets", "dependencies": ["A"] },
            "D": { "type": "rust" }
        }
    }));
    let value = run_json(dir.path(), &["order"]);
    assert_eq!(value["buildOrder"], json!(["D"]));
    assert_eq!(value["excluded"], json!(["A", "B", "C"]));
}

#[test]
fn cycles_json_has_suggested_break() {
    let dir = project(&mutual());
    let value = run_json(dir.path(), &["cycles"]);

    assert_eq!(value["cycles"][0]["members"], json!(["A", "B"]));
    assert_eq!(
        value["cycles"][0]["suggestedBreak"],
        json!({"from": "B", "to": "A"})
    );
}

#[test]
fn cycles_pretty_when_none() {
    let dir = project(&linear());
    cairn_cmd(dir.path())
        .args(["--format", "pretty", "cycles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependency cycles found."));
}

#[test]
fn plan_json_groups_waves() {
    let dir = project(&json!({
        "canisters": {
            "frontend": { "type": "assets", "dependencies": ["backend", "identity"] },
            "backend": { "type": "rust", "dependencies": ["ledger"] },
            "ledger": { "type": "custom" },
            "identity": { "type": "custom" }
        }
    }));
    let value = run_json(dir.path(), &["plan"]);

    assert_eq!(
        value["waves"],
        json!([["identity", "ledger"], ["backend"], ["frontend"]])
    );
    assert_eq!(value["deployable"], true);
}

#[test]
fn completions_bash() {
    let dir = TempDir::new().expect("tempdir");
    cairn_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cairn"));
}
