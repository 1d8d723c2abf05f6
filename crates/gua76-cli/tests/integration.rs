//! Integration tests for the `gua76` binary.

use std::process::Command;

fn gua76_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gua76"))
}

fn run_ok(args: &[&str]) -> String {
    let output = gua76_bin().args(args).output().expect("failed to run gua76");
    assert!(
        output.status.success(),
        "gua76 {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn controls_lists_every_port() {
    let stdout = run_ok(&["controls"]);
    for key in ["input_gain_db", "ratio", "sidechain_q", "mid_side", "pad"] {
        assert!(stdout.contains(key), "controls listing should contain '{key}'");
    }
    assert!(stdout.contains("Meter Ports"));
}

#[test]
fn curve_prints_requested_ratios() {
    let stdout = run_ok(&[
        "curve", "--ratio", "4", "--ratio", "all", "--min-db", "-20", "--max-db", "0",
    ]);
    assert!(stdout.contains("4:1"));
    assert!(stdout.contains("all"));
    assert!(!stdout.contains("12:1"));
    // Rows from -20 to 0 in 2 dB steps plus two header lines
    assert_eq!(stdout.lines().count(), 13);
}

#[test]
fn presets_list_and_show() {
    let stdout = run_ok(&["presets", "list"]);
    assert!(stdout.contains("Drum Smash"));
    assert!(stdout.contains("Wide Master"));

    let stdout = run_ok(&["presets", "show", "drum_smash", "--toml"]);
    assert!(stdout.contains("name = \"Drum Smash\""));
    assert!(stdout.contains("[controls]"));
}

#[test]
fn unknown_preset_fails() {
    let output = gua76_bin()
        .args(["presets", "show", "no_such_preset"])
        .output()
        .expect("failed to run gua76");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("preset not found"));
}

#[test]
fn simulate_reports_gain_reduction() {
    let stdout = run_ok(&[
        "simulate",
        "--signal",
        "sine",
        "--level-db",
        "-3",
        "--duration",
        "0.5",
        "--preset",
        "bus_peak_catcher",
        "--set",
        "oversampling=off",
    ]);
    assert!(stdout.contains("Summary"));
    let deepest = stdout
        .lines()
        .find(|l| l.contains("Deepest gain reduction"))
        .expect("summary line");
    assert!(!deepest.contains(" 0.0 dB"), "a -3 dBFS sine should be limited: {deepest}");
}

#[test]
fn simulate_rejects_out_of_range_override() {
    let output = gua76_bin()
        .args(["simulate", "--set", "drive=7", "--duration", "0.1"])
        .output()
        .expect("failed to run gua76");
    assert!(!output.status.success());
}
