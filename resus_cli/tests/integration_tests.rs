//! Integration tests for the eresus binary.
//!
//! These tests verify end-to-end behavior including:
//! - The arrest lifecycle (start, rhythm analysis, shocks, ROSC, end)
//! - Cross-invocation persistence and undo
//! - Summary export and reset
//! - Precondition enforcement at the process boundary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("eresus"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

/// Run the analyse -> shockable rhythm -> shock sequence once.
fn deliver_shock(data_dir: &Path) {
    cli(data_dir).arg("analyse").assert().success();
    cli(data_dir)
        .args(["rhythm", "VF", "--shockable"])
        .assert()
        .success();
    cli(data_dir).arg("shock").assert().success();
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Cardiac arrest timer and event logger",
        ));
}

#[test]
fn test_status_before_start_is_pending() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING"))
        .stdout(predicate::str::contains("Total time:  00:00"));
}

#[test]
fn test_start_activates_and_persists() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("start")
        .assert()
        .success()
        .stdout(predicate::str::contains("Arrest started"))
        .stdout(predicate::str::contains("ACTIVE"));

    // A later invocation restores the session from disk.
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("ACTIVE"));

    // The live document landed under the generated device id.
    let device_id = std::fs::read_to_string(temp_dir.path().join("device_id")).unwrap();
    assert!(temp_dir
        .path()
        .join(device_id.trim())
        .join("arrest_log.json")
        .exists());
}

#[test]
fn test_start_twice_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    cli(temp_dir.path()).arg("start").assert().failure();
}

#[test]
fn test_shock_flow_increments_counter() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    deliver_shock(temp_dir.path());
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shocks:      1"));

    deliver_shock(temp_dir.path());
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shocks:      2"));
}

#[test]
fn test_shock_without_advice_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    cli(temp_dir.path()).arg("shock").assert().failure();

    // The rejected action left no trace.
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shocks:      0"));
}

#[test]
fn test_non_shockable_rhythm_resumes_cpr() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    cli(temp_dir.path()).arg("analyse").assert().success();
    cli(temp_dir.path())
        .args(["rhythm", "PEA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resuming CPR"));

    cli(temp_dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rhythm is PEA"))
        .stdout(predicate::str::contains("Resuming CPR."));
}

#[test]
fn test_undo_reverts_last_action_across_invocations() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    deliver_shock(temp_dir.path());

    cli(temp_dir.path())
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Last action undone"));

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shocks:      0"));
}

#[test]
fn test_rejected_action_leaves_undo_slot_intact() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    deliver_shock(temp_dir.path());

    // A shock outside the advised state is rejected and must not
    // consume the undo slot.
    cli(temp_dir.path()).arg("shock").assert().failure();

    // Undo still reverts the last real action: the delivered shock.
    cli(temp_dir.path())
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Last action undone"));
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shocks:      0"));
}

#[test]
fn test_undo_with_no_history_is_noop() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to undo"));
}

#[test]
fn test_drug_logging_appears_in_summary() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    cli(temp_dir.path()).arg("adrenaline").assert().success();
    cli(temp_dir.path())
        .args(["drug", "Atropine"])
        .assert()
        .success();
    cli(temp_dir.path()).arg("airway").assert().success();

    cli(temp_dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("eResus Event Summary"))
        .stdout(predicate::str::contains("Adrenaline Given - Dose 1"))
        .stdout(predicate::str::contains("Atropine Given"))
        .stdout(predicate::str::contains("Advanced Airway Placed"));
}

#[test]
fn test_invalid_etco2_is_ignored() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    cli(temp_dir.path())
        .args(["etco2", "abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ignored"));

    cli(temp_dir.path()).args(["etco2", "35"]).assert().success();

    cli(temp_dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("ETCO2: 35 mmHg"))
        .stdout(predicate::str::contains("abc").not());
}

#[test]
fn test_rosc_and_end_lifecycle() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    cli(temp_dir.path())
        .arg("rosc")
        .assert()
        .success()
        .stdout(predicate::str::contains("ROSC"));

    cli(temp_dir.path()).arg("rearrest").assert().success();
    cli(temp_dir.path()).arg("end").assert().success();

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("ENDED"));

    // No further clinical actions once ended.
    cli(temp_dir.path()).arg("adrenaline").assert().failure();
}

#[test]
fn test_offset_adds_to_total_time() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    cli(temp_dir.path()).args(["offset", "5"]).assert().success();

    cli(temp_dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Time offset added: +5 min"))
        // 5 minutes of offset on a seconds-old session.
        .stdout(predicate::str::contains("Total Arrest Time: 05:0"));
}

#[test]
fn test_checklists_and_hypothermia() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();

    cli(temp_dir.path())
        .args(["cause", "hypoxia"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["hypothermia", "severe"])
        .assert()
        .success();

    // Severe hypothermia withholds adrenaline on the status display.
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adrenaline withheld"));

    cli(temp_dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hypoxia checked"))
        .stdout(predicate::str::contains("Hypothermia status set to: SEVERE"));
}

#[test]
fn test_unknown_checklist_item_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    cli(temp_dir.path())
        .args(["cause", "no-such-item"])
        .assert()
        .failure();
}

#[test]
fn test_reset_clears_session_and_archives() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    cli(temp_dir.path()).arg("rosc").assert().success();

    cli(temp_dir.path())
        .args(["reset", "--archive", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eResus Event Summary"))
        .stdout(predicate::str::contains("Session reset"));

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("PENDING"))
        .stdout(predicate::str::contains("Shocks:      0"));

    let device_id = std::fs::read_to_string(temp_dir.path().join("device_id")).unwrap();
    let device_dir = temp_dir.path().join(device_id.trim());
    assert!(device_dir.join("archive.jsonl").exists());
    assert!(!device_dir.join("arrest_log.json").exists());
}

#[test]
fn test_adrenaline_prompt_after_three_shocks() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("start").assert().success();
    for _ in 0..3 {
        deliver_shock(temp_dir.path());
    }

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Consider adrenaline"))
        .stdout(predicate::str::contains("Consider amiodarone (first dose)"));
}
