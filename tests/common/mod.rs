//! Common test utilities and fixtures
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn sample_roster() -> PathBuf {
    fixture_path("participants_sample.csv")
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Scratch directory that doubles as the working directory and HOME of the
/// binary under test, so no user config or default file leaks in.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Copy a fixture into the workspace and return its new path
    pub fn copy_fixture(&self, name: &str) -> PathBuf {
        let target = self.path(name);
        fs::copy(fixture_path(name), &target).unwrap();
        target
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let target = self.path(name);
        fs::write(&target, content).unwrap();
        target
    }

    pub fn cmd(&self) -> Command {
        teammate_cmd(self.dir.path())
    }
}

/// Command for the teammate binary, isolated from the caller's environment
pub fn teammate_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("teammate").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("TEAMMATE_CONFIG")
        .env_remove("TEAMMATE_TEAM_SIZE")
        .env_remove("TEAMMATE_ROSTER")
        .env_remove("TEAMMATE_OUTPUT")
        .env_remove("TEAMMATE_LOG_LEVEL");
    cmd
}

#[test]
fn test_fixtures_exist() {
    assert!(sample_roster().exists(), "Sample roster fixture should exist");
    assert!(valid_config_fixture().exists(), "Valid config fixture should exist");
    assert!(invalid_config_fixture().exists(), "Invalid config fixture should exist");
}
