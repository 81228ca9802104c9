#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn hunt_cmd(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("hunt"));
    cmd.env_remove("HUNT_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--data")
        .arg(data);
    cmd
}

fn create(data: &Path, name: &str, target: &str) -> String {
    let out = hunt_cmd(data)
        .args(["create", name, "--target", target, "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let hunt: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    hunt["id"].as_str().unwrap().to_string()
}

#[test]
fn test_counter_workflow() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    hunt_cmd(&data)
        .args(["create", "Charm hunt", "--target", "Ralts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created Charm hunt"));

    hunt_cmd(&data)
        .args(["inc", "1", "-n", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Charm hunt: 3 (3 since last phase)"));

    hunt_cmd(&data)
        .args(["phase", "1", "Zubat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Phase #1 recorded"));

    hunt_cmd(&data)
        .args(["dec", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Charm hunt: 2 (0 since last phase)"));

    hunt_cmd(&data)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Zubat at 3"))
        .stdout(predicate::str::contains("Odds:        1 in 4,096"));

    hunt_cmd(&data)
        .args(["unphase", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Charm hunt: 2 (2 since last phase)"));
}

#[test]
fn test_decrement_at_zero_stays_zero() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    create(&data, "Charm hunt", "Ralts");

    hunt_cmd(&data)
        .args(["dec", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Charm hunt: 0"));

    hunt_cmd(&data)
        .args(["set", "1", "-4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Charm hunt: 0"));
}

#[test]
fn test_list_orders_by_last_update_and_hides_archived() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let first = create(&data, "First", "Ralts");
    create(&data, "Second", "Eevee");
    hunt_cmd(&data).args(["inc", &first]).assert().success();

    hunt_cmd(&data)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?s)1\. First.*2\. Second").unwrap());

    hunt_cmd(&data).args(["archive", &first]).assert().success();
    hunt_cmd(&data)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("First").not());
    hunt_cmd(&data)
        .args(["list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[archived]"));
}

#[test]
fn test_unknown_hunt_fails() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    hunt_cmd(&data)
        .args(["inc", "hunt_1_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hunt not found"));

    hunt_cmd(&data)
        .args(["show", "../../etc/passwd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid hunt id"));
}

#[test]
fn test_startup_recovers_corrupted_record() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let id = create(&data, "Charm hunt", "Ralts");
    hunt_cmd(&data).args(["set", &id, "12"]).assert().success();

    let record = data.join("hunts").join(format!("{}.json", id));
    let good = fs::read(&record).unwrap();
    fs::write(data.join("hunts").join(format!("{}.tmp", id)), &good).unwrap();
    fs::write(&record, &good[..good.len() / 2]).unwrap();

    hunt_cmd(&data)
        .args(["show", &id, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 12"));
    assert!(!data.join("hunts").join(format!("{}.tmp", id)).exists());
}

#[test]
fn test_check_reports_invalid_structure() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    create(&data, "Charm hunt", "Ralts");

    hunt_cmd(&data)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 valid, 0 corrupted"));

    fs::write(data.join("hunts").join("hunt_1_odd.json"), br#"{"name": "Odd"}"#).unwrap();
    hunt_cmd(&data)
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid structure"))
        .stdout(predicate::str::contains("1 valid, 1 corrupted"));
}

#[test]
fn test_backup_export_import() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let id = create(&data, "Charm hunt", "Ralts");
    hunt_cmd(&data).args(["set", &id, "77"]).assert().success();

    hunt_cmd(&data)
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("emergency-backups"));

    let export = temp.path().join("export.json");
    hunt_cmd(&data)
        .args(["export"])
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 hunt(s)"));

    let other = temp.path().join("other");
    hunt_cmd(&other)
        .args(["import"])
        .arg(&export)
        .assert()
        .success();
    hunt_cmd(&other)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Count:       77"));
}

#[test]
fn test_mirror_writes_text_files() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let obs = temp.path().join("obs");
    let id = create(&data, "Charm hunt", "Ralts");

    hunt_cmd(&data)
        .arg("mirror")
        .arg(&obs)
        .assert()
        .success();
    hunt_cmd(&data).args(["inc", &id]).assert().success();

    assert_eq!(fs::read_to_string(obs.join("count.txt")).unwrap(), "1");
    assert_eq!(fs::read_to_string(obs.join("phase.txt")).unwrap(), "No phases yet");
    assert!(!obs.join("test_write.tmp").exists());
}

#[test]
fn test_path_prints_data_dir() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    hunt_cmd(&data)
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains(data.to_string_lossy().as_ref()));
    assert!(data.join("config").join("settings.json").exists());
}

#[test]
fn test_doctor_reports_each_lost_record_once() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    create(&data, "Charm hunt", "Ralts");
    fs::write(data.join("hunts").join("hunt_1_lost.json"), b"{{{{").unwrap();

    let out = hunt_cmd(&data).args(["doctor", "--json"]).output().unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["corrupted"], serde_json::json!(["hunt_1_lost"]));
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 1);

    hunt_cmd(&data)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("could not recover hunt_1_lost"))
        .stdout(predicate::str::contains("1 corrupted, 0 recovered"));
}

#[test]
fn test_doctor_promotes_complete_temp() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let id = create(&data, "Charm hunt", "Ralts");
    hunt_cmd(&data).args(["set", &id, "5"]).assert().success();

    let record = data.join("hunts").join(format!("{}.json", id));
    let good = fs::read(&record).unwrap();
    fs::write(data.join("hunts").join(format!("{}.tmp", id)), &good).unwrap();
    fs::write(&record, b"").unwrap();

    hunt_cmd(&data)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("recovered {} from its temp file", id)))
        .stdout(predicate::str::contains("1 corrupted, 1 recovered"));
}

#[test]
fn test_export_honors_json_flag() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    create(&data, "Charm hunt", "Ralts");
    let export = temp.path().join("export.json");

    let out = hunt_cmd(&data)
        .arg("export")
        .arg(&export)
        .arg("--json")
        .output()
        .unwrap();
    assert!(out.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["exported"], 1);
    assert_eq!(summary["file"], export.to_string_lossy().as_ref());
}
