#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary data file
pub struct CliTestHarness {
    temp_dir: TempDir,
    data_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with an empty data directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let data_path = temp_dir.path().join("data").join("db.json");

        Self { temp_dir, data_path }
    }

    /// Harness whose working directory carries a `carecal.toml`
    pub fn with_config(toml: &str) -> Self {
        let harness = Self::new();
        std::fs::write(harness.temp_dir.path().join("carecal.toml"), toml).expect("Failed to write config");
        harness
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("carecal").expect("Failed to find carecal binary");

        cmd.current_dir(self.temp_dir.path());
        cmd.env("CARECAL_DATA_PATH", &self.data_path);
        cmd.env_remove("RUST_LOG");

        cmd
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// The stored document as raw JSON
    pub fn document(&self) -> Value {
        let bytes = std::fs::read(&self.data_path).expect("Failed to read data file");
        serde_json::from_slice(&bytes).expect("Data file is not JSON")
    }

    /// Ids of stored events whose title contains `title`, in storage order
    pub fn event_ids(&self, title: &str) -> Vec<String> {
        self.document()["events"]
            .as_array()
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e["title"].as_str().map_or(false, |t| t.contains(title)))
                    .filter_map(|e| e["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Helper to run a command and capture stdout
    pub fn stdout(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        String::from_utf8(output).expect("stdout is not UTF-8")
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub fn sample_client_args() -> Vec<&'static str> {
        vec!["client", "add", "Tanaka", "--address", "1-2-3 Chuo", "--care-level", "Care level 2"]
    }

    /// Tuesdays and Thursdays from Tuesday 2026-02-03
    pub fn sample_weekly_args() -> Vec<&'static str> {
        vec![
            "event", "add", "monitoring", "--client", "Tanaka", "--date", "2026-02-03", "--weekly", "tue,thu",
            "--start", "09:00", "--end", "10:00",
        ]
    }

    /// First Tuesday of each month from February 2026
    pub fn sample_monthly_args() -> Vec<&'static str> {
        vec!["event", "add", "conference", "--date", "2026-02-03", "--monthly"]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn has_event_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Date"))
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Category"))
    }

    pub fn added_successfully() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Added"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
    }
}
