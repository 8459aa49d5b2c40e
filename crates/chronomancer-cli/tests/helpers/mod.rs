#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary sequence file
pub struct CliTestHarness {
    temp_dir: TempDir,
    sequence_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with its own working directory
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let sequence_path = temp_dir.path().join("sequence.json");

        Self {
            temp_dir,
            sequence_path,
        }
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("chronomancer").expect("Failed to find chronomancer binary");

        // Run inside the temp dir so only its chronomancer.toml is picked up
        cmd.current_dir(self.temp_dir.path());
        cmd.env("CHRONOMANCER_FILE", &self.sequence_path);
        cmd.env_remove("CHRONOMANCER_LOG");

        cmd
    }

    /// Get the sequence file path for this test instance
    pub fn sequence_path(&self) -> &Path {
        &self.sequence_path
    }

    /// Write a chronomancer.toml into the working directory
    pub fn write_config(&self, contents: &str) {
        fs::write(self.temp_dir.path().join("chronomancer.toml"), contents)
            .expect("Failed to write config file");
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Twelve monthly occurrences through 2025
    pub fn monthly_year_args() -> Vec<&'static str> {
        vec![
            "new", "--every", "monthly", "--start", "2025-01-01", "--count", "12",
        ]
    }

    /// Weekly occurrences without end
    pub fn weekly_forever_args() -> Vec<&'static str> {
        vec!["new", "--interval", "P1W", "--start", "2025-01-06", "--forever"]
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    /// Predicate to check if output contains the occurrence table headers
    pub fn has_occurrence_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Date").and(predicate::str::contains("Relative"))
    }

    /// Predicate to check if output contains the timeline table headers
    pub fn has_timeline_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Segment")
            .and(predicate::str::contains("Interval"))
            .and(predicate::str::contains("Occurrences"))
    }

    /// Predicate to check if output indicates success
    pub fn succeeded() -> impl Predicate<str> {
        predicate::str::contains("✓")
    }

    /// Predicate to check for error messages
    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
