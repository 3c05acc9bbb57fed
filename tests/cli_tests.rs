#![cfg(feature = "cli")]

use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Integration tests for the udl_kml command-line tool
/// These run the built binary against small generated logs

const LOG: &str = "\
Session Time,GPS Fix Quality,Number of Satellites,GPS Date & Time,Latitude (deg),Longitude (deg),GPS Altitude (feet)
1,1,8,2021-06-01T12:00:01,47.1,-122.1,100
2,1,8,2021-06-01T12:00:02,47.2,-122.2,100
0,1,8,2021-06-01T12:10:00,47.3,-122.3,100
1,0,8,2021-06-01T12:10:01,47.4,-122.4,100
";

fn udl_kml() -> Command {
    Command::new(env!("CARGO_BIN_EXE_udl_kml"))
}

#[test]
fn test_cli_writes_sessions_and_summary() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("udl.csv");
    let output_dir = temp_dir.path().join("kml");
    fs::write(&input, LOG).unwrap();

    let output = udl_kml()
        .arg(&input)
        .arg("--output-dir")
        .arg(&output_dir)
        .output()
        .expect("Failed to run udl_kml");

    assert!(
        output.status.success(),
        "udl_kml failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CSV rows read     = 4"), "stdout: {stdout}");
    assert!(stdout.contains("CSV rows rejected = 1 (25.00%)"), "stdout: {stdout}");
    assert!(stdout.contains("Sessions detected = 2"), "stdout: {stdout}");
    assert!(stdout.contains("KML rows written  = 3"), "stdout: {stdout}");

    assert!(output_dir.join("udl.csv_S001.kml").exists());
    assert!(output_dir.join("udl.csv_S002.kml").exists());
}

#[test]
fn test_cli_missing_input_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = udl_kml()
        .arg(temp_dir.path().join("nope.csv"))
        .output()
        .expect("Failed to run udl_kml");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_cli_without_arguments_prints_help() {
    let output = udl_kml().output().expect("Failed to run udl_kml");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--output-dir"));
    assert!(stdout.contains("--min-satellites"));
}

#[test]
fn test_cli_empty_log_reports_no_sessions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("empty.csv");
    let output_dir = temp_dir.path().join("kml");
    fs::write(&input, LOG.lines().next().unwrap()).unwrap();

    let output = udl_kml()
        .arg(&input)
        .arg("--output-dir")
        .arg(&output_dir)
        .output()
        .expect("Failed to run udl_kml");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No sessions found"));
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
}

#[test]
fn test_cli_malformed_log_exits_with_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("bad.csv");
    fs::write(
        &input,
        "Session Time,GPS Fix Quality,Number of Satellites,GPS Date & Time,Latitude (deg),Longitude (deg),GPS Altitude (feet)\nsoon,1,8,x,47.1,-122.1,100\n",
    )
    .unwrap();

    let output = udl_kml()
        .arg(&input)
        .arg("--output-dir")
        .arg(temp_dir.path().join("kml"))
        .output()
        .expect("Failed to run udl_kml");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Session Time"));
}
