use image::{Rgba, RgbaImage};
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_xray-cam");

// Small model: 2x2 activation grid, 3 channels, 4x4 input.
const MODEL_FLAGS: [&str; 10] = [
    "--input-width",
    "4",
    "--input-height",
    "4",
    "--cam-rows",
    "2",
    "--cam-cols",
    "2",
    "--cam-channels",
    "3",
];

struct TestContext {
    _dir: TempDir,
    dir: PathBuf,
    image_path: PathBuf,
    weights_path: PathBuf,
    recording_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().to_path_buf();
        let image_path = root.join("xray.png");
        let weights_path = root.join("weights.csv");
        let recording_path = root.join("recording.json");

        RgbaImage::from_fn(8, 8, |x, y| {
            let v = (x * 20 + y * 10) as u8;
            Rgba([v, v, v, 255])
        })
        .save(&image_path)
        .unwrap();

        // 14 conditions, 3 channels
        let mut weights = File::create(&weights_path).unwrap();
        for i in 0..14 {
            writeln!(weights, "{},0.5,-{}", i as f32 * 0.1, i).unwrap();
        }

        // Hernia (last) scores highest, Atelectasis (first) lowest.
        let scores: Vec<String> = (0..14)
            .map(|i| format!("{:.3}", 0.05 + i as f32 * 0.0692))
            .collect();
        let activations: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        fs::write(
            &recording_path,
            format!(
                r#"{{"name": "fixture", "outputs": [[{}], [{}]]}}"#,
                scores.join(","),
                activations.join(",")
            ),
        )
        .unwrap();

        Self {
            _dir: dir,
            dir: root,
            image_path,
            weights_path,
            recording_path,
        }
    }

    fn analyze(&self, extra: &[&str]) -> Output {
        Command::new(BIN)
            .arg("analyze")
            .args(MODEL_FLAGS)
            .arg("--image")
            .arg(&self.image_path)
            .arg("--weights")
            .arg(&self.weights_path)
            .arg("--recording")
            .arg(&self.recording_path)
            .args(extra)
            .output()
            .expect("Failed to execute binary")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_cli_analyze_ranks_results() {
    let ctx = TestContext::new();
    let output = ctx.analyze(&[]);
    let out = stdout(&output);
    assert!(output.status.success(), "stdout: {}", out);

    let hernia_row = Regex::new(r"(?m)^.*Hernia.*0\.950.*Very Likely.*$").unwrap();
    assert!(hernia_row.is_match(&out), "stdout: {}", out);

    let first = out.find("Hernia").unwrap();
    let last = out.find("Atelectasis").unwrap();
    assert!(first < last);
    assert!(out.contains("Pleural Thickening"));
    assert!(out.contains("#e8175dff"));
}

#[test]
fn test_cli_dual_mode_writes_overlay() {
    let ctx = TestContext::new();
    let overlay = ctx.dir.join("overlay.png");
    let output = ctx.analyze(&["--dual", "--out", overlay.to_str().unwrap(), "--select", "1"]);
    assert!(output.status.success(), "stdout: {}", stdout(&output));

    let written = image::open(&overlay).unwrap();
    assert_eq!((written.width(), written.height()), (8, 8));
}

#[test]
fn test_cli_config_file_with_override() {
    let ctx = TestContext::new();
    let config_path = ctx.dir.join("config.json");
    fs::write(
        &config_path,
        r#"{"model": {"input_width": 4, "input_height": 4, "cam_rows": 2, "cam_cols": 2, "cam_channels": 3},
            "results": {"min_conditions": 1, "min_likelihood": 0.9}}"#,
    )
    .unwrap();

    let output = Command::new(BIN)
        .arg("--config-file")
        .arg(&config_path)
        .arg("analyze")
        .arg("--image")
        .arg(&ctx.image_path)
        .arg("--weights")
        .arg(&ctx.weights_path)
        .arg("--recording")
        .arg(&ctx.recording_path)
        .args(["--min-likelihood", "0.85"])
        .output()
        .unwrap();
    let out = stdout(&output);
    assert!(output.status.success(), "stdout: {}", out);

    // Only Hernia (0.950) and Pleural Thickening (0.880) clear 0.85.
    assert!(out.contains("Hernia"));
    assert!(out.contains("Pleural Thickening"));
    assert!(!out.contains("Fibrosis"));
}

#[test]
fn test_cli_rejects_bad_weights() {
    let ctx = TestContext::new();
    fs::write(&ctx.weights_path, "1,2\n3,4\n").unwrap();
    let output = ctx.analyze(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_rejects_invalid_config() {
    let ctx = TestContext::new();
    let output = ctx.analyze(&["--exp-base", "1.0"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_weights_summary() {
    let ctx = TestContext::new();
    let output = Command::new(BIN)
        .args(["weights", "--cam-channels", "3", "--weights"])
        .arg(&ctx.weights_path)
        .output()
        .unwrap();
    let out = stdout(&output);
    assert!(output.status.success(), "stdout: {}", out);

    let summary = Regex::new(r"14 rows x 3 channels").unwrap();
    assert!(summary.is_match(&out));
    assert!(out.contains("Cardiomegaly"));
}

#[test]
fn test_cli_banner_and_debug_cam_dump() {
    let ctx = TestContext::new();
    let overlay = ctx.dir.join("overlay.png");
    let output = ctx.analyze(&["--debug", "--out", overlay.to_str().unwrap()]);
    let out = stdout(&output);
    assert!(output.status.success(), "stdout: {}", out);

    assert!(out.contains("Initializing X-Ray CAM pipeline"));
    let cam_cell = Regex::new(r"-?\d+\.\d{7} ").unwrap();
    assert!(cam_cell.is_match(&out), "stdout: {}", out);
}
