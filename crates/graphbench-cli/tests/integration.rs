//! Integration tests for the graphbench CLI
//!
//! These tests run full commands that need no database binaries: graph
//! generation, the in-memory baseline and configuration handling. Each test
//! runs in its own temporary working and home directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// graphbench command isolated in `temp`
#[allow(deprecated)]
fn graphbench(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("graphbench").expect("Failed to find graphbench binary");
    cmd.current_dir(temp.path())
        .env("HOME", temp.path().join("home"))
        .env_remove("GRAPHBENCH_CONFIG")
        .env_remove("GRAPHBENCH_DATA_DIR")
        .env_remove("GRAPHBENCH_BACKEND")
        .env_remove("GRAPHBENCH_PORT");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is not JSON")
}

// ============================================================================
// Generate Command
// ============================================================================

#[test]
fn test_generate_caches_graph() {
    let temp = TempDir::new().unwrap();

    let first = json_stdout(graphbench(&temp).args([
        "--data-dir",
        "data",
        "generate",
        "--nodes",
        "40",
        "--degree",
        "4",
        "--features",
        "3",
        "--graph-seed",
        "7",
        "--json",
    ]));
    assert_eq!(first["database_name"], "Fake_N40_D4_F3");
    assert_eq!(first["feature_dim"], 3);
    assert!(temp.path().join("data/graphs/N40.D4.F3.json").is_file());

    // Second run reads the cache, even with another seed
    let second = json_stdout(graphbench(&temp).args([
        "--data-dir",
        "data",
        "generate",
        "--nodes",
        "40",
        "--degree",
        "4",
        "--features",
        "3",
        "--graph-seed",
        "8",
        "--json",
    ]));
    assert_eq!(first["num_nodes"], second["num_nodes"]);
    assert_eq!(first["num_edges"], second["num_edges"]);
}

#[test]
fn test_generate_rejects_degree_above_nodes() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args(["generate", "--nodes", "4", "--degree", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("avg_degree"));
}

// ============================================================================
// Baseline Command
// ============================================================================

#[test]
fn test_baseline_reports_statistics() {
    let temp = TempDir::new().unwrap();

    let report = json_stdout(graphbench(&temp).args([
        "--data-dir",
        "data",
        "baseline",
        "--nodes",
        "30",
        "--degree",
        "4",
        "--features",
        "2",
        "--trials",
        "4",
        "--num-seeds",
        "3",
        "--fan-out",
        "2,2",
        "--fetch-features",
        "--seed",
        "1",
        "--json",
    ]));
    assert_eq!(report["backend"], "memory");
    assert_eq!(report["plan"]["trials"], 4);
    assert_eq!(report["plan"]["fan_out"], serde_json::json!([2, 2]));
    assert_eq!(report["timings"].as_array().unwrap().len(), 4);
    assert_eq!(report["stats"]["count"], 4);
}

#[test]
fn test_baseline_text_output() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args([
            "--data-dir",
            "data",
            "baseline",
            "--nodes",
            "20",
            "--degree",
            "2",
            "-n",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("memory: 2 trials"))
        .stdout(predicate::str::contains("TIME (in seconds)"));
}

#[test]
fn test_baseline_rejects_zero_trials() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args(["--data-dir", "data", "baseline", "--trials", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trials"));
}

// ============================================================================
// Database Commands
// ============================================================================

#[test]
fn test_placeholder_backend_is_unsupported() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args(["--data-dir", "data", "--backend", "neo4j", "delete", "db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neo4j driver does not support"));
}

#[test]
fn test_missing_binaries_reported() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args(["--data-dir", "data", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("create_db binary not found"));
}

// ============================================================================
// Config Command
// ============================================================================

#[test]
fn test_config_init_and_show() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args(["config", "init"])
        .assert()
        .success();
    let path = temp.path().join(".graphbench/config.toml");
    assert!(path.is_file());

    std::fs::write(&path, "[server]\nport = 9100\n\n[benchmark]\ntrials = 3\n").unwrap();

    let config = json_stdout(graphbench(&temp).args(["config", "show", "--json"]));
    assert_eq!(config["server"]["port"], 9100);
    assert_eq!(config["benchmark"]["trials"], 3);
    assert_eq!(config["benchmark"]["num_seeds"], 64);

    // Flags override files
    let config = json_stdout(graphbench(&temp).args([
        "--port", "9200", "config", "show", "--json",
    ]));
    assert_eq!(config["server"]["port"], 9200);
}

#[test]
fn test_config_show_toml() {
    let temp = TempDir::new().unwrap();

    graphbench(&temp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[server]"))
        .stdout(predicate::str::contains("port = 8080"));
}

#[test]
fn test_explicit_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bench.toml");
    std::fs::write(&path, "[backend]\nkind = \"arangodb\"\n").unwrap();

    let config = json_stdout(graphbench(&temp).args([
        "--config",
        path.to_str().unwrap(),
        "config",
        "show",
        "--json",
    ]));
    assert_eq!(config["backend"]["kind"], "arangodb");
}

#[test]
fn test_config_path() {
    let temp = TempDir::new().unwrap();

    let paths = json_stdout(graphbench(&temp).args(["config", "path", "--json"]));
    assert_eq!(paths["local_exists"], false);
    assert!(paths["local"]
        .as_str()
        .unwrap()
        .ends_with(".graphbench/config.toml"));
}
