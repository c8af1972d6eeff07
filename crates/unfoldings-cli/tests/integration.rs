//! Integration tests for the `unfoldings` binary.

use std::process::Command;

use tempfile::TempDir;

fn unfoldings_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_unfoldings"))
}

#[test]
fn cli_presets_json_lists_bank() {
    let output = unfoldings_bin()
        .args(["presets", "--json"])
        .output()
        .expect("failed to run unfoldings presets");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let presets = value.as_array().unwrap();
    assert_eq!(presets.len(), 51);
    assert_eq!(presets[0]["name"], "Porcelain Air");
    assert_eq!(presets[0]["mode"], "Spectral");
    assert_eq!(presets[0]["colour"], "#FFBFBFBF");
}

#[test]
fn cli_unknown_preset_fails() {
    let output = unfoldings_bin()
        .args(["presets", "No Such Preset"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_params_lists_surface() {
    let output = unfoldings_bin().arg("params").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in ["mode", "beautyScene", "burstMs", "spectralChaos", "seed"] {
        assert!(stdout.contains(id), "missing {id}");
    }
}

#[test]
fn cli_scenes_lists_overwrites() {
    let output = unfoldings_bin().arg("scenes").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Crystalline"));
    assert!(stdout.contains("Dramatic"));
}

#[test]
fn cli_render_then_info() {
    let dir = TempDir::new().unwrap();
    let wav = dir.path().join("out.wav");
    let session = dir.path().join("take.toml");

    let output = unfoldings_bin()
        .arg("render")
        .arg(&wav)
        .args([
            "--mode", "ikeda", "--micro-rate", "192000", "--burst-ms", "5", "--density", "500",
            "--out-seconds", "1", "--sample-rate", "8000", "--bit-depth", "16", "-q",
        ])
        .arg("--save-session")
        .arg(&session)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(wav.exists());
    assert!(session.exists());

    let output = unfoldings_bin().arg("info").arg(&wav).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PCM 16-bit"));
    assert!(stdout.contains("8000 Hz"));
    assert!(stdout.contains("8000 frames"));
}

#[test]
fn cli_rejects_bad_bit_depth() {
    let dir = TempDir::new().unwrap();
    let output = unfoldings_bin()
        .arg("render")
        .arg(dir.path().join("x.wav"))
        .args(["--bit-depth", "12"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_rejects_tiny_sample_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiny.wav");
    let output = unfoldings_bin()
        .arg("render")
        .arg(&path)
        .args(["--mode", "ikeda", "--sample-rate", "30", "-q"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Sample rate 30 Hz"));
    assert!(!path.exists());
}
