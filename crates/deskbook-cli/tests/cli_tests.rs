//! Integration tests for the `deskbook` CLI binary.
//!
//! The offline subcommands run against JSON fixtures; online ones are only
//! exercised up to the point where a session or backend would be needed.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn reservations_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/reservations.json")
}

fn malformed_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/malformed.json")
}

/// The binary with no ambient credentials or backend from the environment.
fn deskbook() -> Command {
    let mut cmd = Command::cargo_bin("deskbook").unwrap();
    for var in [
        "DESKBOOK_TOKEN",
        "DESKBOOK_EMAIL",
        "DESKBOOK_PASSWORD",
        "DESKBOOK_BACKEND_URL",
        "DESKBOOK_TIMEOUT_SECS",
        "DESKBOOK_MAX_RETRIES",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_touching_window_is_free() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "10:00", "-i", reservations_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("09:00-10:00 is free"));
}

#[test]
fn check_overlap_reports_conflict_and_exits_1() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "10:30", "-i", reservations_path()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Time conflict with another booking"))
        .stdout(predicate::str::contains("ENG002"))
        .stdout(predicate::str::contains("ENG001").not())
        .stdout(predicate::str::contains("First free slot of at least 90 min: 11:00-14:00"));
}

#[test]
fn check_json_output() {
    let output = deskbook()
        .args([
            "check",
            "--start",
            "13:00",
            "--end",
            "16:00",
            "-i",
            reservations_path(),
            "--json",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["conflict"], true);
    assert_eq!(report["start"], "13:00");
    let conflicts = report["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["occupant"], "ENG003");
    assert_eq!(conflicts[0]["overlap_minutes"], 90);
    // 180 minutes fit into 11:00-14:00
    assert_eq!(report["suggestion"]["start"], "11:00");
    assert_eq!(report["suggestion"]["end"], "14:00");
}

#[test]
fn check_json_without_room_for_the_window_has_no_suggestion() {
    let output = deskbook()
        .args(["check", "--start", "9:00", "--end", "18:00", "-i", reservations_path(), "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["conflict"], true);
    assert!(report["suggestion"].is_null());
}

#[test]
fn check_json_clear_window() {
    let output = deskbook()
        .args(["check", "--start", "11:00", "--end", "12:00", "-i", reservations_path(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["conflict"], false);
    assert!(report["conflicts"].as_array().unwrap().is_empty());
}

#[test]
fn check_reads_reservation_windows_as_printed_by_availability() {
    let printed = r#"[{"occupant":"ENG001","start":"10:00","end":"11:00"}]"#;
    deskbook()
        .args(["check", "--start", "10:30", "--end", "11:30"])
        .write_stdin(printed)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Time conflict"))
        .stdout(predicate::str::contains("ENG001"));
}

#[test]
fn check_rejects_inverted_reservation_window() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "10:00"])
        .write_stdin(r#"[{"occupant":"ENG001","start":"11:00","end":"10:00"}]"#)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("start must be before end"));
}

#[test]
fn free_reads_reservation_windows() {
    deskbook()
        .args(["free"])
        .write_stdin(r#"[{"occupant":"ENG001","start":"9:00","end":"17:00"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("17:00-18:00  (60 min)"));
}

#[test]
fn check_reads_bare_array_from_stdin() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "10:00"])
        .write_stdin(r#"[{"start_time":"9:00","end_time":"10:00"}]"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Time conflict"));
}

#[test]
fn check_empty_reservations_is_free() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "18:00"])
        .write_stdin("[]")
        .assert()
        .success()
        .stdout(predicate::str::contains("is free"));
}

#[test]
fn check_rejects_malformed_time() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "25:00", "-i", reservations_path()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid window"));
}

#[test]
fn check_rejects_empty_window() {
    deskbook()
        .args(["check", "--start", "10:00", "--end", "10:00", "-i", reservations_path()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("start must be before end"));
}

#[test]
fn check_rejects_malformed_reservation() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "10:00", "-i", malformed_path()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("booking #2"));
}

#[test]
fn check_missing_file_fails() {
    deskbook()
        .args(["check", "--start", "9:00", "--end", "10:00", "-i", "/nonexistent/reservations.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// free / slots
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn free_lists_gaps_inside_opening_hours() {
    deskbook()
        .args(["free", "-i", reservations_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("09:00-10:00  (60 min)"))
        .stdout(predicate::str::contains("11:00-14:00  (180 min)"))
        .stdout(predicate::str::contains("15:30-18:00  (150 min)"));
}

#[test]
fn free_respects_minimum_duration() {
    let output = deskbook()
        .args(["free", "-i", reservations_path(), "--min", "120", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let slots: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["start"], "11:00");
    assert_eq!(slots[1]["end"], "18:00");
}

#[test]
fn slots_for_workstations_is_full_day_only() {
    deskbook()
        .args(["slots", "--kind", "work_station"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workstation: 09:00"))
        .stdout(predicate::str::contains("10:00").not());
}

#[test]
fn slots_for_rooms_are_hourly() {
    deskbook()
        .args(["slots", "--kind", "discussion room"])
        .assert()
        .success()
        .stdout(predicate::str::contains("09:00 10:00"))
        .stdout(predicate::str::contains("18:00"));
}

// ─────────────────────────────────────────────────────────────────────────────
// online commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn online_command_without_credentials_fails() {
    deskbook()
        .args(["bookings"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn book_warns_about_non_canonical_resource_id() {
    deskbook()
        .args(["book", "--resource", "DR1", "--start", "9:00", "--end", "10:00"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a canonical workspace id"))
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn book_canonical_resource_id_is_not_warned_about() {
    deskbook()
        .args(["book", "--resource", "DR001", "--start", "9:00", "--end", "10:00"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("canonical").not());
}

#[test]
fn book_rejects_bad_resource_id() {
    deskbook()
        .args(["book", "--resource", "DR 1", "--start", "9:00", "--end", "10:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid resource id"));
}

#[test]
fn unreachable_backend_reports_failure() {
    deskbook()
        .args(["health", "--backend-url", "http://127.0.0.1:9", "--timeout", "2", "-q"])
        .env("DESKBOOK_MAX_RETRIES", "0")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn no_subcommand_shows_usage() {
    deskbook()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
