//! End-to-end tests for the `nr` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STAR_GML: &str = r#"graph [
  node [ id 1 label "hub" ]
  node [ id 2 label "a" ]
  node [ id 3 label "b" ]
  node [ id 4 label "c" ]
  edge [ source 1 target 2 weight 5 ]
  edge [ source 1 target 3 weight 1 ]
  edge [ source 1 target 4 weight 1 ]
]
"#;

fn nr_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nr"));
    cmd.current_dir(dir);
    cmd.env("NETRANK_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("nr should not crash");
    assert!(
        output.status.success(),
        "nr failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn star(dir: &Path) {
    fs::write(dir.join("star.gml"), STAR_GML).unwrap();
}

#[test]
fn ops_lists_every_operation() {
    let dir = TempDir::new().unwrap();
    let output = nr_cmd(dir.path())
        .args(["ops", "--format", "text"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 16);
    assert!(stdout.contains("create.degree_rank_list\t"));
    assert!(stdout.contains("playground.tm_dash.viz_data_query\t"));

    let ops = json_stdout(nr_cmd(dir.path()).args(["ops", "--prefix", "create.", "--json"]));
    assert_eq!(ops.as_array().unwrap().len(), 5);
}

#[test]
fn describe_shows_schema() {
    let dir = TempDir::new().unwrap();
    let described = json_stdout(nr_cmd(dir.path()).args([
        "describe",
        "create.eigenvector_rank_list",
        "--json",
    ]));
    assert_eq!(described["name"], "create.eigenvector_rank_list");
    let inputs = described["inputs"].as_array().unwrap();
    let iterations = inputs.iter().find(|f| f["name"] == "iterations").unwrap();
    assert_eq!(iterations["type"], "integer");
    assert_eq!(iterations["default"], 1000);

    nr_cmd(dir.path())
        .args(["describe", "get.network_info", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inputs"))
        .stdout(predicate::str::contains("graph_type:"));
}

#[test]
fn unknown_operation_reports_code_and_hint() {
    let dir = TempDir::new().unwrap();
    nr_cmd(dir.path())
        .args(["describe", "create.pagerank_list", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2003]"))
        .stderr(predicate::str::contains("suggestion: Run `nr ops`"));

    let output = nr_cmd(dir.path())
        .args(["run", "create.pagerank_list", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["error_code"], "E2003");
}

#[test]
fn degree_ranking_from_gml() {
    let dir = TempDir::new().unwrap();
    star(dir.path());
    let result = json_stdout(nr_cmd(dir.path()).args([
        "run",
        "create.degree_rank_list",
        "-i",
        "network_data=star.gml",
        "-i",
        "weighted=true",
        "--json",
    ]));
    assert_eq!(result["operation"], "create.degree_rank_list");
    let table = &result["outputs"]["network_result"];
    assert_eq!(table["type"], "table");
    assert_eq!(
        table["columns"],
        serde_json::json!(["Rank", "Node", "Score", "Weighted Score"])
    );
    let first = &table["rows"][0];
    assert_eq!(first["Rank"], 1);
    assert_eq!(first["Node"], "hub");
    assert_eq!(first["Score"], 3);
    assert_eq!(first["Weighted Score"], 7.0);

    let network = &result["outputs"]["centrality_network"];
    assert_eq!(network["type"], "network");
    assert_eq!(network["nodes"], 4);
    assert!(network["content_hash"].as_str().unwrap().starts_with("blake3:"));
}

#[test]
fn project_config_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    star(dir.path());
    fs::create_dir_all(dir.path().join(".netrank")).unwrap();
    fs::write(
        dir.path().join(".netrank/config.toml"),
        "[centrality]\nweighted = true\n",
    )
    .unwrap();

    nr_cmd(dir.path())
        .args([
            "run",
            "create.degree_rank_list",
            "-i",
            "network_data=star.gml",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rank\tNode\tScore\tWeighted Score\n1\thub\t3\t7"));

    nr_cmd(dir.path())
        .args([
            "run",
            "create.degree_rank_list",
            "-i",
            "network_data=star.gml",
            "-i",
            "weighted=false",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rank\tNode\tScore\n"));
}

#[test]
fn sqlite_onboarding_writes_outputs_for_later_runs() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("letters.db");
    let conn = rusqlite::Connection::open(&db).unwrap();
    conn.execute_batch(
        "CREATE TABLE nodes (id INTEGER PRIMARY KEY, label TEXT);
         INSERT INTO nodes VALUES (1, 'Anna'), (2, 'Bert'), (3, 'Carl'), (4, 'Dora');
         CREATE TABLE edges (source INTEGER, target INTEGER);
         INSERT INTO edges VALUES (1, 2), (2, 3), (3, 1), (3, 4);",
    )
    .unwrap();
    drop(conn);

    nr_cmd(dir.path())
        .args([
            "run",
            "onboard.sqlite_file",
            "-i",
            "path=letters.db",
            "-i",
            "label_column=label",
            "--out-dir",
            "out",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("network_data\tnetwork\tnodes=4\tedges=4"))
        .stdout(predicate::str::contains("wrote\t"));
    assert!(dir.path().join("out/network_data.json").is_file());

    nr_cmd(dir.path())
        .args([
            "run",
            "create.cut_point_list",
            "-i",
            "network_data=out/network_data.json",
            "--out-dir",
            "out",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("network_result\t[\"Carl\"]"));
    let cut: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/cut_network.json")).unwrap())
            .unwrap();
    assert!(cut.is_object());

    nr_cmd(dir.path())
        .args([
            "run",
            "get.network_info",
            "-i",
            "network_data=out/network_data.json",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("# network_result\nGraph Type: Undirected\n"))
        .stdout(predicate::str::contains("Number of Nodes: 4"));
}

#[test]
fn corpus_table_mapping_from_csv() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("corpus.csv"), "word\nfoo\nbar\nfoo\n").unwrap();
    nr_cmd(dir.path())
        .args([
            "run",
            "playground.tm_dash.map_column",
            "-i",
            "table_input=corpus.csv",
            "-i",
            "column_name=word",
            "-i",
            "output_col_name=mapped",
            "-i",
            r#"mapping_keys=[["foo"],["FOO"]]"#,
            "--out-dir",
            "out",
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("word\tmapped\nfoo\tFOO\nbar\tbar\nfoo\tFOO\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("out/table_output.csv")).unwrap(),
        "word,mapped\nfoo,FOO\nbar,bar\nfoo,FOO\n"
    );
}

#[test]
fn bad_inputs_fail_with_guidance() {
    let dir = TempDir::new().unwrap();
    star(dir.path());

    nr_cmd(dir.path())
        .args(["run", "create.degree_rank_list", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"))
        .stderr(predicate::str::contains("network_data"))
        .stderr(predicate::str::contains("nr describe"));

    nr_cmd(dir.path())
        .args([
            "run",
            "create.degree_rank_list",
            "-i",
            "network_data=star.gml",
            "-i",
            "weighted=maybe",
            "--format",
            "text",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'maybe' is not a boolean"));

    nr_cmd(dir.path())
        .args([
            "run",
            "create.degree_rank_list",
            "-i",
            "network_data=missing.gml",
            "--format",
            "text",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.gml"));
}

#[test]
fn completions_generate_for_bash() {
    let dir = TempDir::new().unwrap();
    nr_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_nr"))
        .stdout(predicate::str::contains("describe"));
}
