//! Integration tests for the fitplan binary.
//!
//! These tests verify end-to-end behavior including:
//! - Onboarding and profile editing
//! - Plan generation, display and lifecycle
//! - Activity logging, progress and export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI isolated from the developer's real config and data
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitplan"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn onboard(dir: &Path, goal: &str) {
    cli(dir)
        .args(["onboard", "--age", "30", "--height", "175", "--weight", "70"])
        .args(["--goal", goal])
        .assert()
        .success();
}

fn plan_json(dir: &Path) -> serde_json::Value {
    let output = cli(dir)
        .args(["plan", "show", "--json"])
        .output()
        .expect("Failed to run plan show");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("plan show --json is not JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Personalized workout plan generator",
        ));
}

#[test]
fn test_bmi_from_flags() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["bmi", "--weight", "70", "--height", "175"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 22.9 (Normal)"))
        .stdout(predicate::str::contains("56.7-76.3 kg"));
}

#[test]
fn test_bmi_rejects_zero_height() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["bmi", "--weight", "70", "--height", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid measurement"));
}

#[test]
fn test_onboard_creates_profile() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["onboard", "--age", "42", "--height", "168", "--weight", "64"])
        .args(["--conditions", "back_pain,asthma", "--diet", "vegan"])
        .args(["--goal", "weight-loss", "--target-weight", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile created"))
        .stdout(predicate::str::contains("Back pain"))
        .stdout(predicate::str::contains("Level:      Beginner"));

    assert!(temp_dir.path().join("data/profiles.json").exists());

    cli(temp_dir.path())
        .args(["profile", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dietary_preference\": \"vegan\""));
}

#[test]
fn test_onboard_twice_fails() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "endurance");

    cli(temp_dir.path())
        .args(["onboard", "--age", "30", "--height", "175", "--weight", "70"])
        .args(["--goal", "endurance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has a profile"));
}

#[test]
fn test_onboard_rejects_out_of_range_values() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["onboard", "--age", "8", "--height", "175", "--weight", "500"])
        .args(["--goal", "endurance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Age must be between"))
        .stderr(predicate::str::contains("Weight must be between"));
}

#[test]
fn test_unknown_goal_is_a_usage_error() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["onboard", "--age", "30", "--height", "175", "--weight", "70"])
        .args(["--goal", "bulking"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bulking"));
}

#[test]
fn test_plan_requires_profile() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["plan", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile is incomplete"))
        .stderr(predicate::str::contains("fitness_goal"));
}

#[test]
fn test_plan_generate_and_show() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "muscle_gain");

    cli(temp_dir.path())
        .args(["plan", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Advanced Strength Builder Program"))
        .stdout(predicate::str::contains("Plan saved"));

    let plan = plan_json(temp_dir.path());
    assert_eq!(plan["status"], "active");
    assert_eq!(plan["daily_workouts"].as_array().unwrap().len(), 12);

    cli(temp_dir.path())
        .args(["plan", "show", "--day", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Day 2"))
        .stdout(predicate::str::contains("Day 3").not());

    cli(temp_dir.path())
        .args(["plan", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn test_dry_run_does_not_store() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "flexibility");

    cli(temp_dir.path())
        .args(["plan", "generate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    cli(temp_dir.path())
        .args(["plan", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active plan"));
}

#[test]
fn test_regenerate_cancels_previous_plan() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "weight_loss");

    for _ in 0..2 {
        cli(temp_dir.path())
            .args(["plan", "generate"])
            .assert()
            .success();
    }

    let output = cli(temp_dir.path())
        .args(["plan", "list"])
        .output()
        .unwrap();
    let listing = String::from_utf8(output.stdout).unwrap();
    assert_eq!(listing.matches("active").count(), 1);
    assert_eq!(listing.matches("cancelled").count(), 1);
}

#[test]
fn test_config_file_controls_plan_length() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/fitplan");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[plan]\ntotal_weeks = 2\ndays_per_week = 4\n",
    )
    .unwrap();

    onboard(temp_dir.path(), "endurance");
    cli(temp_dir.path())
        .args(["plan", "generate"])
        .assert()
        .success();

    let plan = plan_json(temp_dir.path());
    assert_eq!(plan["total_weeks"], 2);
    assert_eq!(plan["daily_workouts"].as_array().unwrap().len(), 8);
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config/fitplan");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[plan]\ntotal_weeks = 0\n").unwrap();

    cli(temp_dir.path())
        .args(["bmi", "--weight", "70", "--height", "175"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("total_weeks"));
}

#[test]
fn test_profile_edit_changes_level() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "muscle_gain");

    cli(temp_dir.path())
        .args(["profile", "edit", "--conditions", "knee_issues"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Knee issues"))
        .stdout(predicate::str::contains("Level:      Beginner"));

    cli(temp_dir.path())
        .args(["profile", "edit", "--conditions", "none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Conditions: none"));
}

#[test]
fn test_failed_profile_edit_changes_nothing() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "endurance");

    cli(temp_dir.path())
        .args(["profile", "edit", "--age", "45", "--conditions", "none,asthma"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'none' cannot be combined"));

    let output = cli(temp_dir.path())
        .args(["profile", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let profile: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(profile["age"], 30);
    assert_eq!(profile["health_conditions"].as_array().unwrap().len(), 0);
}

#[test]
fn test_log_rejects_absurd_calories() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["log", "--activity", "running", "--duration", "30"])
        .args(["--calories", "4294967295"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Calories must be at most"));

    cli(temp_dir.path())
        .args(["log", "--activity", "running", "--duration", "30"])
        .args(["--calories", "400"])
        .assert()
        .success();

    let output = cli(temp_dir.path())
        .args(["progress", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total_workouts"], 1);
    assert_eq!(summary["total_calories"], 400);
}

#[test]
fn test_verbosity_controls_logging() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["bmi", "--weight", "70", "--height", "175"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());

    cli(temp_dir.path())
        .args(["-vv", "bmi", "--weight", "70", "--height", "175"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Using data dir"));
}

#[test]
fn test_log_workout_and_progress() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "general_fitness");
    cli(temp_dir.path())
        .args(["plan", "generate"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["log", "--day", "1", "--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plan day 1"));

    cli(temp_dir.path())
        .args(["log", "--activity", "walking", "--duration", "30", "--weight", "69.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30 minutes of walking"));

    let output = cli(temp_dir.path())
        .args(["progress", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total_workouts"], 2);
    assert_eq!(summary["current_streak"], 1);
    assert_eq!(summary["plan"]["completed_days"], 1);
    assert_eq!(summary["weight_change_kg"], -0.8);
}

#[test]
fn test_log_rejects_unknown_day() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "general_fitness");
    cli(temp_dir.path())
        .args(["plan", "generate"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["log", "--day", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no day 99"));
}

#[test]
fn test_log_requires_day_or_activity() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["log", "--duration", "20"])
        .assert()
        .failure();
}

#[test]
fn test_log_activity_requires_duration() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["log", "--activity", "yoga"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duration must be between"));
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let csv_path = temp_dir.path().join("activities.csv");

    for minutes in ["20", "35"] {
        cli(temp_dir.path())
            .args(["log", "--activity", "cycling", "--duration", minutes])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .arg("export")
        .arg("--output")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 activities"));

    // A second export adds nothing
    cli(temp_dir.path())
        .arg("export")
        .arg("--output")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 0 activities"));

    let content = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.starts_with("id,date,activity_type"));
}

#[test]
fn test_users_are_isolated() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "endurance");

    cli(temp_dir.path())
        .args(["--user", "someone-else", "profile", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile is incomplete"));
}

#[test]
fn test_delete_account() {
    let temp_dir = setup_test_dir();
    onboard(temp_dir.path(), "endurance");
    cli(temp_dir.path())
        .args(["plan", "generate"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("delete-account")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    cli(temp_dir.path())
        .args(["delete-account", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 records"));

    cli(temp_dir.path())
        .args(["profile", "show"])
        .assert()
        .failure();
}
