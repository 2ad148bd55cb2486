//! Integration tests for the `clu` binary against a replayed inventory.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

// ==================== Helper Functions ====================

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/inventory.json")
}

fn clu() -> Command {
    let mut cmd = Command::cargo_bin("clu").expect("binary built");
    cmd.env_remove("CLU_INVENTORY")
        .env_remove("CLU_PLATFORM")
        .env_remove("CLU_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn replay() -> Command {
    let mut cmd = clu();
    cmd.arg("--inventory").arg(fixture());
    cmd
}

// ==================== Platforms ====================

#[test]
fn test_platforms_table() {
    replay()
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("AMD Accelerated Parallel Processing"))
        .stdout(predicate::str::contains("NVIDIA CUDA"))
        .stdout(predicate::str::contains("Total: 2 platform(s)"));
}

#[test]
fn test_platforms_json() {
    let output = replay()
        .args(["--format", "json", "platforms"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["platforms"][0]["devices"], 2);
    assert_eq!(value["platforms"][1]["name"], "NVIDIA CUDA");
}

#[test]
fn test_inventory_from_environment() {
    clu()
        .env("CLU_INVENTORY", fixture())
        .env("CLU_FORMAT", "json")
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vendor\": \"NVIDIA Corporation\""));
}

// ==================== Devices ====================

#[test]
fn test_devices_of_first_platform() {
    replay()
        .arg("devices")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tahiti"))
        .stdout(predicate::str::contains("i7-4770"))
        .stdout(predicate::str::contains("256 x 256 x 256"));
}

#[test]
fn test_devices_by_name_and_type() {
    replay()
        .args(["devices", "--platform", "nvidia", "--type", "gpu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform: NVIDIA CUDA"))
        .stdout(predicate::str::contains("RTX 4090"))
        .stdout(predicate::str::contains("default GPU"));
}

#[test]
fn test_devices_by_ordinal_from_environment() {
    replay()
        .env("CLU_PLATFORM", "0x1")
        .arg("devices")
        .assert()
        .success()
        .stdout(predicate::str::contains("Platform: NVIDIA CUDA"));
}

#[test]
fn test_devices_filter_without_match() {
    replay()
        .args(["devices", "-p", "1", "-t", "cpu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No CPU devices found"));
}

#[test]
fn test_devices_unknown_platform() {
    replay()
        .args(["devices", "--platform", "intel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid platform"));
}

#[test]
fn test_devices_ordinal_out_of_range() {
    replay()
        .args(["devices", "--platform", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_device_detail() {
    replay()
        .args(["device", "--platform", "amd", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device 0: Tahiti"))
        .stdout(predicate::str::contains("cl_khr_fp64"));
}

// ==================== Error Codes ====================

#[test]
fn test_error_code_without_backend() {
    clu()
        .args(["error", "-33"])
        .assert()
        .success()
        .stdout("-33: invalid device\n");
}

#[test]
fn test_error_code_unknown() {
    clu()
        .args(["error", "-1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown error"));
}

// ==================== Configuration ====================

#[test]
fn test_missing_inventory_file() {
    clu()
        .args(["--inventory", "/nonexistent/inventory.json", "platforms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read inventory"));
}

#[test]
fn test_malformed_inventory_file() {
    let dir = tempfile::tempdir().expect("dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").expect("write");

    clu()
        .arg("--inventory")
        .arg(&path)
        .arg("platforms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid inventory"));
}

#[cfg(not(feature = "opencl"))]
#[test]
fn test_no_backend_without_inventory() {
    clu()
        .arg("platforms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"))
        .stderr(predicate::str::contains("--inventory"));
}
