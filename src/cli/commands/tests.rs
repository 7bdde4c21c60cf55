//! CLI command tests

use super::*;
use crate::cli::LogLevel;
use crate::config::*;
use crate::monitor::ScalarRecord;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a small, fast config into `dir`
fn create_test_config(dir: &TempDir, loss: &str) -> PathBuf {
    let config_path = dir.path().join("gan.yaml");
    let config = format!(
        r"
loss:
  name: {loss}
  phi: 1.0
schedule:
  n_critic: 2
  max_epoch: 2
  max_iter: 8
  print_freq: 2
data:
  dis_batch_size: 4
  gen_batch_size: 4
  img_size: 4
  channels: 3
  signal_channels: 3
  signal_length: 8
  num_classes: 3
optimizer:
  g_lr: 0.001
  d_lr: 0.001
ema:
  kimg: 0.01
  warmup: 0.1
eval:
  num_eval_imgs: 8
  eval_batch_size: 4
seed: 3
"
    );
    std::fs::write(&config_path, config).expect("file write should succeed");
    config_path
}

fn demo_args(config: PathBuf) -> DemoArgs {
    DemoArgs { config, epochs: Some(1), batches: 4, seed: None, telemetry: None }
}

#[test]
fn test_validate_command_basic() {
    let dir = TempDir::new().expect("temp dir creation should succeed");
    let args = ValidateArgs { config: create_test_config(&dir, "wgangp-eps"), detailed: true };
    assert!(validate::run_validate(args, LogLevel::Quiet).is_ok());
}

#[test]
fn test_validate_rejects_unknown_loss() {
    let dir = TempDir::new().expect("temp dir creation should succeed");
    let args = ValidateArgs { config: create_test_config(&dir, "wgan-div"), detailed: false };
    let err = validate::run_validate(args, LogLevel::Quiet).unwrap_err();
    assert!(err.contains("wgan-div"));
}

#[test]
fn test_validate_missing_file() {
    let args = ValidateArgs { config: PathBuf::from("/nonexistent/gan.yaml"), detailed: false };
    assert!(validate::run_validate(args, LogLevel::Quiet).is_err());
}

#[test]
fn test_info_all_formats() {
    let dir = TempDir::new().expect("temp dir creation should succeed");
    let config = create_test_config(&dir, "hinge");
    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
        let args = InfoArgs { config: config.clone(), format };
        assert!(info::run_info(args, LogLevel::Quiet).is_ok());
    }
}

#[test]
fn test_demo_runs_every_loss() {
    for loss in ["hinge", "standard", "lsgan", "wgangp", "wgangp-mode", "wgangp-eps"] {
        let dir = TempDir::new().expect("temp dir creation should succeed");
        let args = demo_args(create_test_config(&dir, loss));
        let result = demo::run_demo(args, LogLevel::Quiet);
        assert!(result.is_ok(), "{loss}: {result:?}");
    }
}

#[test]
fn test_demo_writes_telemetry() {
    let dir = TempDir::new().expect("temp dir creation should succeed");
    let telemetry = dir.path().join("scalars.jsonl");
    let args = DemoArgs {
        telemetry: Some(telemetry.clone()),
        ..demo_args(create_test_config(&dir, "wgangp-eps"))
    };
    demo::run_demo(args, LogLevel::Quiet).expect("demo should succeed");

    let content = std::fs::read_to_string(&telemetry).expect("telemetry file should exist");
    let records: Vec<ScalarRecord> =
        content.lines().map(|l| serde_json::from_str(l).expect("valid json line")).collect();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();

    // 4 batches with n_critic 2: critic steps every batch, generator every other
    assert_eq!(names.iter().filter(|n| **n == "d_loss").count(), 4);
    assert_eq!(names.iter().filter(|n| **n == "g_loss").count(), 2);
    assert!(names.contains(&"LR/g_lr"));
    assert!(names.contains(&"Inception_score/mean"));
    assert!(names.contains(&"Inception_score/std"));
}

#[test]
fn test_demo_saves_samples() {
    let dir = TempDir::new().expect("temp dir creation should succeed");
    let config = create_test_config(&dir, "hinge");
    let buffer = dir.path().join("samples");
    let yaml = std::fs::read_to_string(&config).expect("config should exist");
    let yaml = yaml.replace(
        "eval:\n",
        &format!("eval:\n  fid_buffer_dir: {}\n", buffer.display()),
    );
    std::fs::write(&config, yaml).expect("file write should succeed");

    demo::run_demo(demo_args(config), LogLevel::Quiet).expect("demo should succeed");
    assert_eq!(std::fs::read_dir(&buffer).expect("buffer dir").count(), 16);
    assert!(buffer.join("iter3_b3.png").exists());
}

#[test]
fn test_run_command_dispatch() {
    let dir = TempDir::new().expect("temp dir creation should succeed");
    let config = create_test_config(&dir, "lsgan");
    let cli = parse_args(["eegan", "--quiet", "validate", config.to_str().unwrap()])
        .expect("arguments should parse");
    assert!(run_command(cli).is_ok());
}
