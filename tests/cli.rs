use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("udhiyath").unwrap();
    cmd.env_remove("UDHIYATH_CONFIG").env_remove("UDHIYATH_HOUSEHOLDS");
    cmd
}

fn weight_sheet(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("weights.csv");
    fs::write(
        &path,
        "animal_id,category,weight\nB2,meat,30\nb1,meat,15\nB1,bone,abc\nB1,liver,3\n",
    )
    .unwrap();
    path
}

#[test]
fn calc_prints_animal_summary() {
    cmd()
        .args(["calc", "b1", "--meat", "10,20", "--bone", "5", "--liver", "2"])
        .assert()
        .success()
        .stdout(contains("Animal Summary: B1"))
        .stdout(contains("10.00 kg"))
        .stdout(contains("24.67 kg"))
        .stdout(contains("Individual Owner's Share (1 of 7):"));
}

#[test]
fn calc_ignores_non_positive_weights() {
    let output = cmd()
        .args(["--json", "calc", "B3", "--meat", "9,0,-4"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["id"], "B3");
    assert_eq!(json["meat_weights"].as_array().unwrap().len(), 1);
    assert_eq!(json["totals"]["meat"], 9.0);
}

#[test]
fn calc_rejects_blank_id() {
    cmd()
        .args(["calc", "", "--meat", "5"])
        .assert()
        .failure()
        .stderr(contains("Animal ID is required"));
}

#[test]
fn import_prints_report() {
    let dir = TempDir::new().unwrap();
    let sheet = weight_sheet(&dir);

    cmd()
        .arg("import")
        .arg(&sheet)
        .args(["--households", "10", "--meat-deduction", "4"])
        .assert()
        .success()
        .stdout(contains("Read 4 rows → 2 animals (1 entries skipped)"))
        .stdout(contains("Animal Summary: B1"))
        .stdout(contains("Animal Summary: B2"))
        .stdout(contains("Public Distribution Summary"))
        // (30 + 15) * 2/3 - 4 = 26 kg over 10 households
        .stdout(contains("26.00 kg"))
        .stdout(contains("2.60 kg"));
}

#[test]
fn import_json_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let sheet = weight_sheet(&dir);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"event_name": "Eid 2026", "default_households": 5, "co_owners": 3}"#).unwrap();

    let output = cmd()
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .arg("import")
        .arg(&sheet)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["event_name"], "Eid 2026");
    assert_eq!(json["animals"][0]["id"], "B1");
    assert_eq!(json["animals"][0]["co_owners"], 3);
    assert_eq!(json["distribution"]["households"], 5);
}

#[test]
fn households_env_overrides_default() {
    let dir = TempDir::new().unwrap();
    let sheet = weight_sheet(&dir);

    let output = cmd()
        .env("UDHIYATH_HOUSEHOLDS", "0")
        .arg("--json")
        .arg("report")
        .arg(&sheet)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["distribution"]["households"], 0);
    assert_eq!(json["distribution"]["effective_households"], 1);
}

#[test]
fn import_reports_unknown_category() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "animal_id,category,weight\nB1,hide,4\n").unwrap();

    cmd()
        .arg("import")
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("Line 2"));
}
