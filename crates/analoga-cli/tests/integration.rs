//! Integration tests for analoga-cli.
//!
//! Tests run the `analoga` binary and check its listings and rendered files.

use std::process::Command;

/// Helper to get the path to the `analoga` binary built by cargo.
fn analoga_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_analoga"))
}

fn read_stereo(path: &std::path::Path) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).expect("output should be a WAV file");
    let spec = reader.spec();
    let samples = reader
        .samples::<f32>()
        .collect::<Result<Vec<_>, _>>()
        .expect("float samples");
    (spec, samples)
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[test]
fn cli_models_lists_all_models() {
    let output = analoga_bin()
        .arg("models")
        .output()
        .expect("failed to run analoga models");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["Minimoog", "ARP 2600", "TB-303", "Poly Evolver", "GlowPad"] {
        assert!(stdout.contains(name), "models listing should contain '{name}'");
    }
}

#[test]
fn cli_models_verbose_shows_voicing() {
    let output = analoga_bin()
        .args(["models", "--verbose"])
        .output()
        .expect("failed to run analoga models --verbose");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("svf"));
    assert!(stdout.contains("ladder"));
    assert!(stdout.contains("Lpf24"));
}

#[test]
fn cli_consoles_lists_modes() {
    let output = analoga_bin()
        .arg("consoles")
        .output()
        .expect("failed to run analoga consoles");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tape Thick"));
    assert!(stdout.contains("comp"));
    assert!(stdout.contains("CONSOLE_MODEL"));
}

#[test]
fn cli_params_lists_ids_and_filters_groups() {
    let output = analoga_bin()
        .arg("params")
        .output()
        .expect("failed to run analoga params");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in ["MODEL", "CUTOFF", "RESONANCE", "REVERB_TYPE", "MASTER_GAIN"] {
        assert!(stdout.contains(id), "params listing should contain '{id}'");
    }

    let output = analoga_bin()
        .args(["params", "--group", "filter"])
        .output()
        .expect("failed to run analoga params --group");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CUTOFF"));
    assert!(!stdout.contains("REVERB_MIX"));

    let output = analoga_bin()
        .args(["params", "--group", "nope"])
        .output()
        .expect("failed to run analoga params --group nope");
    assert!(!output.status.success());
}

#[test]
fn cli_help_lists_subcommands() {
    let output = analoga_bin()
        .arg("--help")
        .output()
        .expect("failed to run analoga --help");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["render", "models", "consoles", "params"] {
        assert!(stdout.contains(cmd), "help should list '{cmd}'");
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_float_stereo_wav() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("chord.wav");

    let output = analoga_bin()
        .args([
            "render",
            out.to_str().unwrap(),
            "--notes",
            "57,60,64",
            "--duration",
            "0.25",
            "--release",
            "0.25",
            "--set",
            "CUTOFF=3000",
        ])
        .output()
        .expect("failed to run analoga render");
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (spec, samples) = read_stereo(&out);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(samples.len(), 2 * 24000);
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(samples.iter().any(|s| s.abs() > 0.01));
}

#[test]
fn cli_render_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("render.toml");
    let out = dir.path().join("render.wav");
    std::fs::write(
        &config,
        r#"
sample_rate = 44100
block_size = 128
release = 0.2

[[notes]]
note = 45
length = 0.3

[[notes]]
note = 52
start = 0.1
length = 0.2

[params]
MODEL = 40
REVERB_ON = 1
CONSOLE_ON = 1
CONSOLE_MODEL = 10
"#,
    )
    .unwrap();

    let output = analoga_bin()
        .args(["render", out.to_str().unwrap(), "--config", config.to_str().unwrap()])
        .output()
        .expect("failed to run analoga render --config");
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (spec, samples) = read_stereo(&out);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(samples.len(), 2 * 22050);
    assert!(samples.iter().all(|s| s.is_finite()));
}

#[test]
fn cli_render_rejects_unknown_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.wav");

    let output = analoga_bin()
        .args(["render", out.to_str().unwrap(), "--set", "CUTOF=100"])
        .output()
        .expect("failed to run analoga render");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CUTOF"), "error should name the parameter: {stderr}");
    assert!(!out.exists());
}

#[test]
fn cli_render_reports_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.wav");
    let missing = dir.path().join("missing.toml");

    let output = analoga_bin()
        .args(["render", out.to_str().unwrap(), "--config", missing.to_str().unwrap()])
        .output()
        .expect("failed to run analoga render");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.toml"), "{stderr}");
}
