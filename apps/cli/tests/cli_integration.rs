//! Integration tests for the `voxt` binary.

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn write_checkpoint(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, name, *data).unwrap();
    }
    tar.into_inner().unwrap().finish().unwrap();
}

fn write_valid_checkpoint(path: &Path) {
    write_checkpoint(
        path,
        &[
            ("model_weights", b"w".repeat(256).as_slice()),
            ("vocab", b"{}".as_slice()),
        ],
    );
}

/// Config with a size floor small enough for test fixtures.
fn write_config(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("voxt.toml");
    std::fs::write(&config_path, "min_size_bytes = 16\n").unwrap();
    config_path
}

fn voxt() -> Command {
    Command::cargo_bin("voxt").unwrap()
}

#[test]
fn validate_accepts_a_good_artifact() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let artifact = temp.path().join("model_500.ckpt");
    write_valid_checkpoint(&artifact);

    voxt()
        .args(["--config", config.to_str().unwrap(), "validate"])
        .arg(&artifact)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_rejects_truncated_artifact_with_exit_code_1() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let artifact = temp.path().join("model_500.ckpt");
    write_valid_checkpoint(&artifact);
    let bytes = std::fs::read(&artifact).unwrap();
    std::fs::write(&artifact, &bytes[..bytes.len() - 10]).unwrap();

    voxt()
        .args(["--config", config.to_str().unwrap(), "validate"])
        .arg(&artifact)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("UNREADABLE"));
}

#[test]
fn validate_missing_file_reports_not_found() {
    voxt()
        .args(["validate", "/no/such/model.ckpt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("NOT_FOUND"));
}

#[test]
fn resolve_prints_highest_numbered_artifact() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    write_valid_checkpoint(&temp.path().join("model_100.ckpt"));
    write_valid_checkpoint(&temp.path().join("model_500.ckpt"));

    voxt()
        .args(["--config", config.to_str().unwrap(), "resolve", "--output-dir"])
        .arg(temp.path())
        .arg("--no-download")
        .assert()
        .success()
        .stdout(predicate::str::contains("model_500.ckpt"));
}

#[test]
fn resolve_empty_dir_is_not_found_with_exit_code_1() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    voxt()
        .args(["--config", config.to_str().unwrap(), "resolve", "--output-dir"])
        .arg(temp.path())
        .arg("--no-download")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn resolve_quarantines_corrupt_marker_and_falls_back() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    std::fs::write(temp.path().join("model_last.ckpt"), b"corrupt but big enough").unwrap();
    write_valid_checkpoint(&temp.path().join("model_200.ckpt"));

    voxt()
        .args(["--config", config.to_str().unwrap(), "resolve", "--output-dir"])
        .arg(temp.path())
        .arg("--no-download")
        .assert()
        .success()
        .stdout(predicate::str::contains("model_200.ckpt"));

    assert!(temp.path().join("model_last.ckpt.corrupted").exists());
}

#[test]
fn info_without_sidecar_exits_1() {
    let temp = TempDir::new().unwrap();
    let artifact = temp.path().join("model_500.ckpt");
    write_valid_checkpoint(&artifact);

    voxt()
        .arg("info")
        .arg(&artifact)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("no metadata"));
}

#[test]
fn info_prints_sidecar_fields() {
    let temp = TempDir::new().unwrap();
    let artifact = temp.path().join("model_500.ckpt");
    write_valid_checkpoint(&artifact);
    let sidecar = temp.path().join("model_500.ckpt.meta.json");
    std::fs::write(
        &sidecar,
        serde_json::json!({
            "artifact_name": "model_500.ckpt",
            "created_at": "2026-01-01T00:00:00Z",
            "size_bytes": 321,
            "content_fingerprint": "abc123",
            "training_config": {"lr": 1e-4},
            "schema_version": 1
        })
        .to_string(),
    )
    .unwrap();

    voxt()
        .args(["info", "--json"])
        .arg(&artifact)
        .assert()
        .success()
        .stdout(predicate::str::contains("abc123"));
}
