use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PLAN: &str = r#"[
  { "id": "cluster", "action": { "type": "createCluster" }, "idempotent": true },
  { "id": "namespace", "dependsOn": ["cluster"],
    "action": { "type": "applyManifest", "path": "k8s/namespace.yaml" }, "idempotent": true },
  { "id": "database", "dependsOn": ["namespace"],
    "action": { "type": "applyManifest", "path": "k8s/postgres.yaml" },
    "readiness": { "selector": "app=postgres", "timeoutSeconds": 30 }, "idempotent": true },
  { "id": "backend", "dependsOn": ["database"],
    "action": { "type": "applyManifest", "path": "k8s/backend.yaml" },
    "readiness": { "selector": "app=backend", "timeoutSeconds": 30 } }
]"#;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

fn write_plan(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("plan.json");
    std::fs::write(&path, contents).expect("Failed to write plan file");
    path
}

/// Helper function to create a Command with --no-color and a private cache
/// directory for testing
fn stagehand_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stagehand").expect("Failed to find stagehand binary");
    cmd.arg("--no-color")
        .arg("--cache-dir")
        .arg(dir.join("cache"))
        .env_remove("STAGEHAND_CLUSTER")
        .env_remove("STAGEHAND_NAMESPACE");
    cmd
}

#[test]
fn test_cli_plan_shows_rounds() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    stagehand_cmd(temp_dir.path())
        .arg("plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Deployment plan"))
        .stdout(predicate::str::contains("4 step(s) in 4 round(s)."))
        .stdout(predicate::str::contains("## Round 4"))
        .stdout(predicate::str::contains("- Waits for: pod 'app=backend' Ready within 30s"));
}

#[test]
fn test_cli_plan_json_lists_round_ids() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    let output = stagehand_cmd(temp_dir.path())
        .args(["--json", "plan"])
        .arg(&plan)
        .output()
        .unwrap();

    assert!(output.status.success());
    let rounds: Vec<Vec<String>> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        rounds,
        vec![
            vec!["cluster".to_string()],
            vec!["namespace".to_string()],
            vec!["database".to_string()],
            vec!["backend".to_string()],
        ]
    );
}

#[test]
fn test_cli_plan_rejects_cycle() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        r#"[
          { "id": "a", "dependsOn": ["b"], "action": { "type": "createCluster" } },
          { "id": "b", "dependsOn": ["a"], "action": { "type": "createCluster" } }
        ]"#,
    );

    stagehand_cmd(temp_dir.path())
        .arg("plan")
        .arg(&plan)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Dependency cycle detected: a -> b -> a"));
}

#[test]
fn test_cli_run_rejects_unknown_dependency_before_running() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        r#"[
          { "id": "backend", "dependsOn": ["database"],
            "action": { "type": "applyManifest", "path": "k8s/backend.yaml" } }
        ]"#,
    );

    stagehand_cmd(temp_dir.path())
        .args(["--dry-run", "run"])
        .arg(&plan)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Deployment run").not())
        .stderr(predicate::str::contains(
            "Step 'backend' depends on unknown step 'database'",
        ));
}

#[test]
fn test_cli_run_missing_plan_file() {
    let temp_dir = create_cli_test_environment();

    stagehand_cmd(temp_dir.path())
        .args(["--dry-run", "run"])
        .arg(temp_dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load plan"));
}

#[test]
fn test_cli_dry_run_succeeds() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    stagehand_cmd(temp_dir.path())
        .args(["--dry-run", "--poll-interval-ms", "10", "run"])
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Deployment run (✓ Succeeded)"))
        .stdout(predicate::str::contains("- Steps: 4 succeeded, 0 failed, 0 skipped"))
        .stdout(predicate::str::contains("### database (✓ Succeeded)"));
}

#[test]
fn test_cli_dry_run_json_report() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    let output = stagehand_cmd(temp_dir.path())
        .args(["--dry-run", "--json", "--concurrency", "2", "run"])
        .arg(&plan)
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = report["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["stepId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["cluster", "namespace", "database", "backend"]);
    assert!(report["results"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["outcome"] == "succeeded"));
}

#[test]
fn test_cli_rejects_zero_concurrency() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), PLAN);

    stagehand_cmd(temp_dir.path())
        .args(["--dry-run", "--concurrency", "0", "run"])
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency"));
}

#[test]
fn test_cli_teardown_is_idempotent() {
    let temp_dir = create_cli_test_environment();

    for _ in 0..2 {
        stagehand_cmd(temp_dir.path())
            .args(["--dry-run", "teardown"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Success: teardown:workload completed"));
    }
}

#[test]
fn test_cli_dry_run_teardown_all_keeps_real_cache() {
    let temp_dir = create_cli_test_environment();
    let cache = temp_dir.path().join("cache");
    std::fs::create_dir_all(cache.join("keep")).unwrap();
    std::fs::write(cache.join("keep").join("file.txt"), "user data").unwrap();

    stagehand_cmd(temp_dir.path())
        .args(["--dry-run", "teardown", "--scope", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success: teardown:all completed"));

    assert!(cache.join("keep").join("file.txt").exists());
}

#[test]
fn test_cli_teardown_rejects_unknown_scope() {
    let temp_dir = create_cli_test_environment();

    stagehand_cmd(temp_dir.path())
        .args(["teardown", "--scope", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'everything'"));
}

#[test]
fn test_cli_schema_describes_plan_format() {
    let temp_dir = create_cli_test_environment();

    let output = stagehand_cmd(temp_dir.path())
        .arg("schema")
        .output()
        .unwrap();

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["type"], "array");
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("applyManifest"));
    assert!(text.contains("timeoutSeconds"));
}
