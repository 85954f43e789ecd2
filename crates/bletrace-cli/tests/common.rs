//! Common test utilities shared across integration tests.
//!
//! Note: Clippy cannot track usage across integration test files,
//! hence the `allow(dead_code)` annotation. This is a standard pattern
//! for Rust integration test fixtures.
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestFixture {
    temp_dir: TempDir,
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");

        Self {
            temp_dir,
            config_path,
            data_dir,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).expect("Failed to write config");
    }

    pub fn write_capture(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).expect("Failed to write capture");
        path
    }

    pub fn read_partition(&self, name: &str) -> Vec<String> {
        let content =
            fs::read_to_string(self.data_dir.join(name)).expect("Failed to read partition");
        content.lines().map(str::to_string).collect()
    }

    /// Command wired to this fixture's config and data directory, with
    /// the ambient environment overrides stripped.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("bletrace").expect("Failed to find bletrace binary");
        cmd.arg("--config")
            .arg(&self.config_path)
            .arg("--data-dir")
            .arg(&self.data_dir)
            .env_remove("BLETRACE_SALT")
            .env_remove("BLETRACE_PATH");
        cmd
    }
}
