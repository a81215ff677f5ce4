// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn claim_portal(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_claim-portal"));
    cmd.arg("--json")
        .arg("--data-dir")
        .arg(data_dir)
        .env_remove("RUST_LOG")
        .env_remove("CLAIM_TOKEN_MINT")
        .env_remove("CLAIM_WINDOW_DURATION_MIN_MINUTES")
        .env_remove("CLAIM_WINDOW_DURATION_MAX_MINUTES");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn write_templates(root: &Path) {
    fs::create_dir_all(root.join("templates")).expect("templates dir");
    for (phase, window, front) in [
        ("scheduled", "Not open", "Scheduled"),
        ("live", "Open", "Claim window open"),
        ("closed", "Closed", "Claim window closed"),
        ("snapshot", "Closed", "Snapshot taken"),
        ("distribution", "Closed", "Distribution in progress"),
    ] {
        fs::write(
            root.join("templates").join(format!("{phase}.json")),
            format!(r#"{{"claimWindowStatus":"{window}","frontEndStatus":"{front}","rewardPool":"1000000"}}"#),
        )
        .expect("write template");
    }
}

const PORTAL_CONFIG: &str = r#"{"roundNumber":3,"opensAt":"2025-05-01T10:00:00Z","closesAt":"2025-05-01T10:05:00Z",
  "snapshotAt":"2025-05-01T10:10:00Z","distributionAt":"2025-05-01T10:20:00Z"}"#;

#[test]
fn rotate_creates_first_round_then_is_idempotent() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let first = claim_portal(tmp.path())
        .args(["rotate", "--seed", "5", "--now", "2025-05-01T00:00:00Z"])
        .output()
        .expect("run rotate");
    assert!(first.status.success());
    let v = stdout_json(&first);
    assert_eq!(v["status"], "rotated");
    assert_eq!(v["schedule"]["roundNumber"], 1);
    assert_eq!(v["schedule"]["mode"], "auto");
    let stored = fs::read(tmp.path().join("schedule.json")).expect("schedule written");

    let second = claim_portal(tmp.path())
        .args(["rotate", "--now", "2025-05-01T00:00:00Z"])
        .output()
        .expect("run rotate again");
    assert!(second.status.success());
    assert_eq!(stdout_json(&second)["status"], "skipped");
    assert_eq!(fs::read(tmp.path().join("schedule.json")).expect("reread"), stored);
}

#[test]
fn manual_mode_freezes_rotation() {
    let tmp = tempfile::tempdir().expect("tempdir");
    claim_portal(tmp.path())
        .args(["schedule", "set-mode", "manual"])
        .assert()
        .success();
    let out = claim_portal(tmp.path())
        .args(["rotate", "--now", "2030-01-01T00:00:00Z"])
        .output()
        .expect("run rotate");
    assert!(out.status.success());
    let v = stdout_json(&out);
    assert_eq!(v["status"], "skipped");
    assert_eq!(v["schedule"]["roundNumber"], 0);
    assert_eq!(v["schedule"]["mode"], "manual");
}

#[test]
fn auto_mode_on_empty_store_rotates_next_run() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = claim_portal(tmp.path())
        .args(["schedule", "set-mode", "auto"])
        .output()
        .expect("run set-mode");
    assert!(out.status.success());
    let v = stdout_json(&out);
    assert_eq!(v["schedule"]["mode"], "auto");
    assert_eq!(v["schedule"]["roundNumber"], 0);

    let out = claim_portal(tmp.path())
        .args(["rotate", "--seed", "5", "--now", "2030-01-01T00:00:00Z"])
        .output()
        .expect("run rotate");
    assert!(out.status.success());
    let v = stdout_json(&out);
    assert_eq!(v["status"], "rotated");
    assert_eq!(v["schedule"]["roundNumber"], 1);
}

#[test]
fn schedule_set_then_phase_resolves_example_times() {
    let tmp = tempfile::tempdir().expect("tempdir");
    claim_portal(tmp.path())
        .args([
            "schedule",
            "set",
            "--snapshot-at",
            "2025-05-01T09:40:00Z",
            "--opens-at",
            "2025-05-01T10:00:00Z",
            "--closes-at",
            "2025-05-01T10:04:00Z",
            "--distribution-starts-at",
            "2025-05-01T10:05:00Z",
            "--distribution-done-at",
            "2025-05-01T10:05:30Z",
        ])
        .assert()
        .success();
    let out = claim_portal(tmp.path())
        .args(["phase", "--now", "2025-05-01T10:02:00Z"])
        .output()
        .expect("run phase");
    assert!(out.status.success());
    let v = stdout_json(&out);
    assert_eq!(v["roundNumber"], 1);
    assert_eq!(v["resolution"]["phase"], "open");
    assert_eq!(v["resolution"]["countdownTarget"], "2025-05-01T10:04:00.000Z");
}

#[test]
fn schedule_set_rejects_out_of_order_milestones() {
    let tmp = tempfile::tempdir().expect("tempdir");
    claim_portal(tmp.path())
        .args([
            "schedule",
            "set",
            "--snapshot-at",
            "2025-05-01T09:40:00Z",
            "--opens-at",
            "2025-05-01T10:00:00Z",
            "--closes-at",
            "2025-05-01T09:00:00Z",
            "--distribution-starts-at",
            "2025-05-01T10:05:00Z",
            "--distribution-done-at",
            "whenever",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("validation_error"))
        .stderr(predicate::str::contains("windowClosesAt"))
        .stderr(predicate::str::contains("distributionDoneAt"));
    assert!(!tmp.path().join("schedule.json").exists());
}

#[test]
fn publish_writes_live_state() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_templates(tmp.path());
    fs::write(tmp.path().join("portal-config.json"), PORTAL_CONFIG).expect("config");
    claim_portal(tmp.path())
        .args(["publish", "--now", "2025-05-01T10:01:00Z"])
        .assert()
        .success();
    let state: serde_json::Value = serde_json::from_slice(
        &fs::read(tmp.path().join("portal-state.json")).expect("state written"),
    )
    .expect("state json");
    assert_eq!(state["roundNumber"], 3);
    assert_eq!(state["phase"], "live");
    assert_eq!(state["countdownTarget"], "2025-05-01T10:05:00.000Z");
    assert_eq!(state["rewardPool"], "1000000");
}

#[test]
fn publish_fails_when_selected_template_is_missing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_templates(tmp.path());
    fs::remove_file(tmp.path().join("templates/closed.json")).expect("remove template");
    fs::write(tmp.path().join("portal-config.json"), PORTAL_CONFIG).expect("config");
    claim_portal(tmp.path())
        .args(["publish", "--now", "2025-05-01T10:06:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("closed.json"));
    assert!(!tmp.path().join("portal-state.json").exists());
}

#[test]
fn publish_rejects_unparseable_config_dates() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_templates(tmp.path());
    fs::write(
        tmp.path().join("portal-config.json"),
        r#"{"roundNumber":1,"opensAt":"tomorrow","closesAt":"2025-05-01T10:05:00Z",
            "snapshotAt":"2025-05-01T10:10:00Z","distributionAt":"2025-05-01T10:20:00Z"}"#,
    )
    .expect("config");
    claim_portal(tmp.path())
        .args(["publish"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("opensAt"));
}

#[test]
fn snapshot_requires_a_token_mint() {
    let tmp = tempfile::tempdir().expect("tempdir");
    claim_portal(tmp.path())
        .args(["snapshot", "--round", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CLAIM_TOKEN_MINT"));
}

#[test]
fn inverted_rotation_range_is_a_validation_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    claim_portal(tmp.path())
        .env("CLAIM_WINDOW_DURATION_MIN_MINUTES", "9")
        .env("CLAIM_WINDOW_DURATION_MAX_MINUTES", "2")
        .args(["rotate"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("windowDurationMinutes"));
    assert!(!tmp.path().join("schedule.json").exists());
}

#[test]
fn analytics_prints_derived_view() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::write(
        tmp.path().join("analytics.json"),
        r#"{"rounds":[{"roundNumber":1,"eligibleHolders":8,"claimants":2,"tokensDistributed":20.0}]}"#,
    )
    .expect("analytics");
    let out = claim_portal(tmp.path())
        .arg("analytics")
        .output()
        .expect("run analytics");
    assert!(out.status.success());
    let v = stdout_json(&out);
    assert_eq!(v["analytics"]["totalRounds"], 1);
    assert_eq!(v["analytics"]["averageClaimRate"], 0.25);
}

#[test]
fn completion_and_missing_command() {
    Command::new(env!("CARGO_BIN_EXE_claim-portal"))
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claim-portal"));
    Command::new(env!("CARGO_BIN_EXE_claim-portal"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing command"));
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("mkdir");
    for entry in fs::read_dir(from).expect("read fixture dir") {
        let entry = entry.expect("entry");
        let target = to.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).expect("copy fixture");
        }
    }
}

#[test]
fn sample_data_directory_supports_every_publish_phase() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample-data");
    let tmp = tempfile::tempdir().expect("tempdir");
    copy_dir(&fixtures, tmp.path());
    for (now, phase) in [
        ("2025-05-01T09:00:00Z", "scheduled"),
        ("2025-05-01T10:00:00Z", "live"),
        ("2025-05-01T10:05:00Z", "closed"),
        ("2025-05-01T10:10:00Z", "snapshot"),
        ("2025-05-01T10:20:00Z", "distribution"),
    ] {
        let out = claim_portal(tmp.path())
            .args(["publish", "--now", now])
            .output()
            .expect("run publish");
        assert!(out.status.success(), "publish at {now}");
        assert_eq!(stdout_json(&out)["state"]["phase"], phase);
    }
    claim_portal(tmp.path())
        .arg("analytics")
        .assert()
        .success()
        .stdout(predicate::str::contains("totalRounds"));
}
