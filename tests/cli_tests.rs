use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{tempdir, TempDir};

const EVEN_ONLY: &str = r#"[
  {
    "id": 1,
    "name": "Solo",
    "rates": { "rare": 10000 },
    "pools": {
      "rare": [{ "id": 10, "name": "Solo" }],
      "uber": [{ "id": 900, "name": "Pity A" }, { "id": 901, "name": "Pity B" }]
    },
    "guaranteed": { "normal_rolls": 6 }
  }
]"#;

fn even_only_file() -> (TempDir, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("banners.json");
    fs::write(&path, EVEN_ONLY).expect("write banners");
    (dir, path)
}

#[test]
fn route_prints_compact_plan() {
    let (_dir, banners) = even_only_file();
    let mut cmd = Command::cargo_bin("route").expect("binary exists");
    cmd.arg("--banners")
        .arg(&banners)
        .args(["--seed", "1", "--target", "8", "--target-banner", "1", "--visible", "1"]);
    cmd.assert().success().stdout(predicate::eq("1 5\n"));
}

#[test]
fn route_not_found_exits_nonzero() {
    let (_dir, banners) = even_only_file();
    let mut cmd = Command::cargo_bin("route").expect("binary exists");
    cmd.arg("--banners").arg(&banners).args([
        "--seed",
        "1",
        "--target",
        "13",
        "--target-banner",
        "1",
        "--visible",
        "1",
    ]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn route_json_reports_rung_and_draws() {
    let (_dir, banners) = even_only_file();
    let output = Command::cargo_bin("route")
        .expect("binary exists")
        .arg("--banners")
        .arg(&banners)
        .args(["--seed", "1", "--target", "13", "--target-banner", "1", "--visible", "1g", "--json"])
        .output()
        .expect("run route");
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(v["found"], true);
    assert_eq!(v["plan"], "1g 7 1 1");
    assert_eq!(v["max_plat"], 0);
    assert_eq!(v["max_guaranteed"], 1);
    let draws = v["draws"].as_array().expect("draws");
    assert_eq!(draws.len(), 8);
    assert_eq!(draws[6]["pity"], true);
    assert_eq!(draws[7]["draw"]["index"], 13);
}

#[test]
fn route_extends_prefix() {
    let (_dir, banners) = even_only_file();
    let mut cmd = Command::cargo_bin("route").expect("binary exists");
    cmd.arg("--banners").arg(&banners).args([
        "--seed",
        "4",
        "--target",
        "10",
        "--target-banner",
        "1",
        "--visible",
        "1",
        "--prefix",
        "1 2",
        "--strategy",
        "greedy",
    ]);
    cmd.assert().success().stdout(predicate::eq("1 6\n"));
}

#[test]
fn route_rejects_bad_banner_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("banners.json");
    fs::write(&path, "not json").expect("write");
    let mut cmd = Command::cargo_bin("route").expect("binary exists");
    cmd.arg("--banners")
        .arg(&path)
        .args(["--seed", "1", "--target", "8", "--target-banner", "1", "--visible", "1"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Banner load error"));
}

#[test]
fn rolls_prints_one_json_row_per_line() {
    let output = Command::cargo_bin("rolls")
        .expect("binary exists")
        .args(["--banners", "data/banners.json", "--seed", "5", "--banner", "1", "--rows", "3"])
        .args(["--bonus", "uber:999:What If"])
        .output()
        .expect("run rolls");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("row json"))
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["row"], 2);
    assert_eq!(rows[0]["a"]["draw"]["index"], 0);
    assert_eq!(rows[0]["b"]["draw"]["track"], "B");
    assert!(rows[0]["a"]["guaranteed"]["primary"]["next_cursor"].is_u64());
}

#[test]
fn rolls_unknown_banner_fails() {
    let mut cmd = Command::cargo_bin("rolls").expect("binary exists");
    cmd.args(["--banners", "data/banners.json", "--seed", "5", "--banner", "42"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Banner 42 not found"));
}
