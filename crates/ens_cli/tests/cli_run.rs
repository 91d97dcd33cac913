//! `ens` binary end to end: exit codes, artifact set, byte-identical re-runs.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_json_diff::assert_json_include;
use predicates::prelude::*;
use serde_json::{json, Value};

const LOCATIONS: &str = "\
location,location_name,abbreviation,population
01,Alabama,AL,1000000
72,Puerto Rico,PR,1000
";

const TARGET_DATA: &str = "\
location,date,value,weekly_rate
01,2024-12-28,100,10
";

const THRESHOLDS: &str = "\
location,p25_rate,p50_rate,p75_rate
01,5,9,11
";

const AL_RUNS: &str = "\
run_id,horizon,date,value,fips
1,0,2025-01-04,100,01
2,0,2025-01-04,100,01
3,0,2025-01-04,115,01
4,0,2025-01-04,85,01
";

fn put(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    put(dir.path(), "locations.csv", LOCATIONS);
    put(dir.path(), "target_data.csv", TARGET_DATA);
    put(dir.path(), "historical_thresholds.csv", THRESHOLDS);
    put(dir.path(), "trajectories/ref_2025-01-04/loc_01.csv", AL_RUNS);
    dir
}

fn ens() -> Command {
    Command::cargo_bin("ens").unwrap()
}

fn read_json(p: &Path) -> Value {
    serde_json::from_slice(&fs::read(p).unwrap()).unwrap()
}

#[test]
fn full_run_writes_every_artifact() {
    let data = data_dir();
    let out = tempfile::tempdir().unwrap();
    ens()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--out")
        .arg(out.path())
        .arg("--quiet")
        .assert()
        .success();

    for f in [
        "dashboard_data.json",
        "locations.json",
        "target_data.json",
        "historical_seasons.json",
        "trajectories/01.json",
        "run_record.json",
    ] {
        assert!(out.path().join(f).is_file(), "missing {f}");
    }
    assert!(!out.path().join("trajectories/72.json").exists());

    let dash = read_json(&out.path().join("dashboard_data.json"));
    assert_json_include!(
        actual: dash,
        expected: json!({
            "most_recent_reference_date": "2025-01-04",
            "data": { "2025-01-04": { "01": { "0": {
                "trend_probs": { "stable": 0.5, "increase": 0.25, "decrease": 0.25,
                                 "large_increase": 0.0, "large_decrease": 0.0 },
                "trend_most_likely": "stable",
                "trend_lower": "decrease",
                "trend_upper": "increase",
                "activity_most_likely": "high",
                "forecast_date": "2025-01-04",
                "median_value": 100.0,
                "median_rate": 10.0
            } } } }
        })
    );

    let locs = read_json(&out.path().join("locations.json"));
    assert_eq!(locs, json!([{ "fips": "01", "abbreviation": "AL", "name": "Alabama", "population": 1000000 }]));

    let record = read_json(&out.path().join("run_record.json"));
    assert!(record["id"].as_str().unwrap().starts_with("RUN:"));
    assert!(record["inputs"]["locations.csv"].is_string());
    assert!(record["outputs"]["trajectories/01.json"].is_string());
    assert_eq!(record["config"]["sample_seed"], json!(42));
}

#[test]
fn reruns_are_byte_identical() {
    let data = data_dir();
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    for out in [&a, &b] {
        ens().arg("--data-dir").arg(data.path()).arg("--out").arg(out.path()).assert().success();
    }
    for f in ["dashboard_data.json", "trajectories/01.json", "run_record.json"] {
        assert_eq!(fs::read(a.path().join(f)).unwrap(), fs::read(b.path().join(f)).unwrap(), "{f}");
    }
}

#[test]
fn seed_override_is_recorded() {
    let data = data_dir();
    let out = tempfile::tempdir().unwrap();
    ens()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--out")
        .arg(out.path())
        .args(["--seed", "0x2A", "--sample-size", "3"])
        .assert()
        .success();
    let record = read_json(&out.path().join("run_record.json"));
    assert_eq!(record["config"]["sample_seed"], json!(42));
    assert_eq!(record["config"]["sample_size"], json!(3));
    let traj = read_json(&out.path().join("trajectories/01.json"));
    assert_eq!(traj["data"]["2025-01-04"]["trajectories"].as_array().unwrap().len(), 3);
}

#[test]
fn validate_only_writes_nothing() {
    let data = data_dir();
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("artifacts");
    ens()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--out")
        .arg(&target)
        .arg("--validate-only")
        .assert()
        .success();
    assert!(!target.exists());
}

#[test]
fn missing_data_dir_is_a_usage_error() {
    ens()
        .args(["--data-dir", "/definitely/not/here"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn missing_locations_table_is_an_io_error() {
    let data = data_dir();
    fs::remove_file(data.path().join("locations.csv")).unwrap();
    let out = tempfile::tempdir().unwrap();
    ens().arg("--data-dir").arg(data.path()).arg("--out").arg(out.path()).assert().code(4);
}

#[test]
fn bad_config_is_a_validation_error() {
    let data = data_dir();
    let cfg = data.path().join("cfg.json");
    fs::write(&cfg, r#"{"lower_percentile": 0.95, "upper_percentile": 0.9}"#).unwrap();
    ens()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--config")
        .arg(&cfg)
        .arg("--validate-only")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config"));
}

#[test]
fn strict_thresholds_fail_on_inverted_rows() {
    let data = data_dir();
    put(data.path(), "historical_thresholds.csv", "location,p25_rate,p50_rate,p75_rate\n01,9,5,11\n");
    let out = tempfile::tempdir().unwrap();

    ens().arg("--data-dir").arg(data.path()).arg("--out").arg(out.path()).assert().success();
    ens()
        .arg("--data-dir")
        .arg(data.path())
        .arg("--out")
        .arg(out.path())
        .arg("--strict-thresholds")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Thresholds.NonMonotonic"));
}

#[test]
fn corrupt_ensemble_file_is_skipped_not_fatal() {
    let data = data_dir();
    put(data.path(), "trajectories/ref_2025-01-04/loc_72.csv", "run_id,horizon,date,value,fips\n1,zero,2025-01-04,10,72\n");
    let out = tempfile::tempdir().unwrap();
    ens().arg("--data-dir").arg(data.path()).arg("--out").arg(out.path()).assert().success();

    assert!(out.path().join("trajectories/01.json").is_file());
    let record = read_json(&out.path().join("run_record.json"));
    assert_eq!(record["counts"]["skipped_files"], json!(1));
    assert!(record["inputs"]["trajectories/ref_2025-01-04/loc_72.csv"].is_string());
}
