use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_scenario(dir: &Path, speed: (f64, f64)) -> std::path::PathBuf {
    let path = dir.join("scenario.yaml");
    let yaml = format!(
        "search:\n  samples_per_axis: 2\n  top_k: 2\n  min_time_diff_s: 0.005\n  bounds:\n    speed_m_s: {{ min: {}, max: {} }}\n    elevation_deg: {{ min: 16.0, max: 16.0 }}\n    azimuth_deg: {{ min: 14.0, max: 14.1 }}\n    spin_rad_s: {{ min: -100.0, max: -100.0 }}\n",
        speed.0, speed.1
    );
    fs::write(&path, yaml).expect("write scenario");
    path
}

#[test]
fn kick_reports_a_near_post_goal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("kick.csv");

    Command::cargo_bin("kick")
        .expect("kick bin")
        .args([
            "--speed",
            "32",
            "--elevation",
            "16",
            "--azimuth",
            "14.05",
            "--spin=-100",
            "--output",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Outcome: GOAL (near post)"))
        .stdout(predicate::str::contains("Termination: goal_line"));

    let csv = fs::read_to_string(&csv_path).expect("trajectory csv");
    assert!(csv.starts_with("time_s,x_m,y_m,z_m,vx_m_s,vy_m_s,vz_m_s"));
    assert!(csv.lines().count() > 10);
}

#[test]
fn kick_without_spin_misses() {
    Command::cargo_bin("kick")
        .expect("kick bin")
        .args(["--speed", "20", "--elevation", "30", "--azimuth", "45", "--spin", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Outcome: MISS"))
        .stdout(predicate::str::contains("Termination: ground"));
}

#[test]
fn kick_rejects_non_finite_speed() {
    Command::cargo_bin("kick")
        .expect("kick bin")
        .args(["--speed", "NaN", "--elevation", "16", "--azimuth", "14", "--spin=-100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid kick"));
}

#[test]
fn corner_search_writes_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_scenario(dir.path(), (32.0, 32.0));
    let out = dir.path().join("results");

    Command::cargo_bin("corner_search")
        .expect("corner_search bin")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
            "--threads",
            "2",
            "--quiet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluated 16 of 16 grid kicks"))
        .stdout(predicate::str::contains("(16 near post)"))
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("#2"));

    assert!(out.join("goals.csv").exists());
    assert!(out.join("trajectory_1.csv").exists());
    assert!(out.join("trajectory_2.csv").exists());
    let summary = fs::read_to_string(out.join("summary.json")).expect("summary");
    assert!(summary.contains("\"pool\": \"primary\""));
}

#[test]
fn corner_search_fails_without_goals() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_scenario(dir.path(), (0.0, 0.5));

    Command::cargo_bin("corner_search")
        .expect("corner_search bin")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--output-dir",
            dir.path().join("results").to_str().unwrap(),
            "--quiet",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no goals found"));
}

#[test]
fn corner_search_rejects_bad_overrides() {
    Command::cargo_bin("corner_search")
        .expect("corner_search bin")
        .args(["--top-k", "0", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("top_k"));
}

#[test]
fn trajectory_plot_needs_input() {
    Command::cargo_bin("trajectory_plot")
        .expect("trajectory_plot bin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to plot"));
}
