use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_calibrator_cli"))
}

fn fixture_file(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn replay(script: &str, extra: &[&str]) -> Output {
    let script = fixture_file(script);
    let mut args = vec!["replay", "--script", script.as_str()];
    args.extend_from_slice(extra);
    cli()
        .args(&args)
        .output()
        .expect("failed to run calibrator_cli replay")
}

fn json_stdout(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout UTF-8");
    serde_json::from_str(stdout.trim()).expect("calibration report JSON payload")
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64().expect("numeric value");
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn replay_landscape_prints_xorg_snippet() {
    let output = replay("landscape_success.json", &["--device-name", "ELAN Touchscreen"]);
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.starts_with("Section \"InputClass\""));
    assert!(stdout.contains("MatchProduct\t\"ELAN Touchscreen\""));
    assert!(stdout.contains("\"MinX\"\t\"-0.000625\""));
    assert!(stdout.contains("\"MaxX\"\t\"0.999375\""));
    assert!(!stdout.contains("SwapXY"));
}

#[test]
fn replay_landscape_json_report() {
    let output = replay("landscape_success.json", &["--output-type", "json"]);
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["device"], "!!Name_Of_TouchScreen!!");
    assert_close(&json["calibration"]["x_min"], -0.000625);
    assert_close(&json["calibration"]["x_max"], 0.999375);
    assert_close(&json["calibration"]["y_min"], -1.0 / 1200.0);
    assert_eq!(json["calibration"]["swap_xy"], false);
    assert_eq!(json["area"].as_array().map(Vec::len), Some(4));
}

#[test]
fn replay_recovers_from_misclick() {
    let output = replay("misclick_restart.json", &["--output-type", "json"]);
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr.clone()).expect("stderr UTF-8");
    assert!(
        stderr.contains("Mis-click detected"),
        "expected misclick notice, got {stderr}"
    );
    let json = json_stdout(&output);
    assert_close(&json["calibration"]["x_min"], -0.000625);
}

#[test]
fn replay_portrait_sets_swap() {
    let output = replay("portrait_swap.json", &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("\"SwapXY\"\t\"1\""));
}

#[test]
fn replay_ignores_other_devices() {
    let output = replay("device_filter.json", &["--output-type", "json"]);
    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_close(&json["calibration"]["x_max"], 0.999375);
}

#[test]
fn replay_restarts_after_resize() {
    let output = replay("resize_restart.json", &["--output-type", "json"]);
    assert!(output.status.success());
    let json = json_stdout(&output);
    let x_min = json["calibration"]["x_min"].as_f64().unwrap_or_default();
    assert!(x_min.abs() < 0.01, "unexpected x_min {x_min}");
}

#[test]
fn replay_timeout_exits_with_reason() {
    let output = replay("timeout.json", &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("aborted: timed out"),
        "expected timeout reason, got {stderr}"
    );
}

#[test]
fn replay_incomplete_script_exits_with_reason() {
    let output = replay("incomplete.json", &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("aborted: incomplete"));
    assert!(output.stdout.is_empty());
}

#[test]
fn replay_focus_lost_exits_with_reason() {
    let output = replay("focus_lost.json", &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("aborted: focus lost"));
}

#[test]
fn config_file_timeout_applies_and_flag_overrides_it() {
    let config = fixture_file("strict_config.json");

    let output = replay("landscape_success.json", &["--config", config.as_str()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("aborted: timed out"));

    let output = replay(
        "landscape_success.json",
        &["--config", config.as_str(), "--timeout-ms", "20000"],
    );
    assert!(output.status.success());
}

#[test]
fn misclick_flag_disables_detection() {
    let output = replay("misclick_restart.json", &["--misclick", "0"]);
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(!stderr.contains("Mis-click detected"));
}

#[test]
fn precalib_projects_onto_device_range() {
    let output = replay(
        "landscape_success.json",
        &[
            "--output-type",
            "json",
            "--precalib",
            "0",
            "4095",
            "0",
            "4095",
        ],
    );
    assert!(output.status.success());
    let json = json_stdout(&output);
    let x_max = json["calibration"]["x_max"].as_f64().unwrap_or_default();
    assert!(x_max > 4000.0 && x_max < 4095.0, "unexpected x_max {x_max}");
}

#[test]
fn invalid_precalib_is_an_error() {
    let output = replay("landscape_success.json", &["--precalib", "10", "5", "0", "100"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_script_is_an_error() {
    let output = replay("no_such_script.json", &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn targets_lists_four_corners() {
    let output = cli()
        .args(["targets", "--width", "800", "--height", "600"])
        .output()
        .expect("failed to run calibrator_cli targets");
    assert!(output.status.success());

    let json = json_stdout(&output);
    let targets = json["targets"].as_array().expect("targets array");
    assert_eq!(targets.len(), 4);
    assert_eq!(targets[0]["target"], "UpperLeft");
    assert_eq!(targets[0]["x"], 100);
    assert_eq!(targets[0]["y"], 75);
    assert_eq!(targets[3]["target"], "LowerRight");
    assert_eq!(targets[3]["x"], 699);
    assert_eq!(targets[3]["y"], 524);
}

#[test]
fn targets_rejects_zero_geometry() {
    let output = cli()
        .args(["targets", "--width", "0", "--height", "600"])
        .output()
        .expect("failed to run calibrator_cli targets");
    assert_eq!(output.status.code(), Some(1));
}
