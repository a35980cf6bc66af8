//! CLI test runner with fluent assertions.
//!
//! Provides infrastructure for executing the `screengrab` binary and
//! verifying output, exit codes and JSON responses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;

/// Main test runner for the `screengrab` CLI binary.
///
/// # Example
///
/// ```ignore
/// let cli = CliRunner::new().with_config_db(&db);
/// cli.run_json(&["config", "show"])
///    .assert_success()
///    .assert_json_field_exists("/user_id");
/// ```
pub struct CliRunner {
    binary_path: PathBuf,
    env_vars: HashMap<String, String>,
    removed_vars: Vec<String>,
}

impl Default for CliRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CliRunner {
    /// Create a runner for the compiled binary with logging and colors off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_screengrab")),
            env_vars: HashMap::new(),
            removed_vars: vec![
                "SCREENGRAB_CONFIG_DB".to_string(),
                "SCREENGRAB_SYNC_FOLDER".to_string(),
                "SCREENGRAB_JSON".to_string(),
            ],
        }
        .with_env("RUST_LOG", "off")
        .with_env("NO_COLOR", "1")
    }

    /// Add an environment variable for command execution.
    #[must_use]
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.removed_vars.retain(|k| k != key);
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Use `path` as the settings database.
    #[must_use]
    pub fn with_config_db(self, path: &Path) -> Self {
        self.with_env("SCREENGRAB_CONFIG_DB", &path.to_string_lossy())
    }

    /// Skip Dropbox discovery and use `path` as the Dropbox folder.
    #[must_use]
    pub fn with_sync_folder(self, path: &Path) -> Self {
        self.with_env("SCREENGRAB_SYNC_FOLDER", &path.to_string_lossy())
    }

    /// Execute the command with the given arguments.
    ///
    /// # Panics
    ///
    /// Panics if the command fails to execute.
    #[must_use]
    pub fn run(&self, args: &[&str]) -> CliResult {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

        for key in &self.removed_vars {
            cmd.env_remove(key);
        }
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute command");

        CliResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Execute with `--json` for machine-readable output.
    #[must_use]
    pub fn run_json(&self, args: &[&str]) -> CliResult {
        let mut full_args = vec!["--json"];
        full_args.extend(args);
        self.run(&full_args)
    }
}

/// Captured output from CLI execution with fluent assertions.
#[derive(Debug, Clone)]
pub struct CliResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub args: Vec<String>,
}

impl CliResult {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    // === Fluent Assertions (all return &Self for chaining) ===

    /// # Panics
    ///
    /// Panics if the command did not exit with code 0.
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success(),
            "Command {:?} failed with exit code {}: {}",
            self.args,
            self.exit_code,
            self.stderr
        );
        self
    }

    /// # Panics
    ///
    /// Panics if the exit code doesn't match.
    pub fn assert_exit_code(&self, expected: i32) -> &Self {
        assert_eq!(
            self.exit_code, expected,
            "Expected exit code {expected}, got {} for {:?}",
            self.exit_code, self.args
        );
        self
    }

    // === Stdout Assertions ===

    /// # Panics
    ///
    /// Panics if stdout doesn't contain the text.
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "stdout does not contain \"{text}\"\nActual stdout:\n{}",
            self.stdout
        );
        self
    }

    // === Stderr Assertions ===

    /// # Panics
    ///
    /// Panics if stderr doesn't contain the text.
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "stderr does not contain \"{text}\"\nActual stderr:\n{}",
            self.stderr
        );
        self
    }

    // === JSON Assertions ===

    /// Parse stdout as JSON.
    ///
    /// # Panics
    ///
    /// Panics if stdout is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|_| panic!("Failed to parse JSON from stdout:\n{}", self.stdout))
    }

    /// Parse stderr as a JSON error report.
    ///
    /// # Panics
    ///
    /// Panics if stderr has no JSON line.
    #[must_use]
    pub fn error_json(&self) -> Value {
        self.stderr
            .lines()
            .rev()
            .find_map(|line| serde_json::from_str::<Value>(line).ok())
            .unwrap_or_else(|| panic!("No JSON error on stderr:\n{}", self.stderr))
    }

    /// Assert a JSON field matches an expected value using JSON pointer syntax.
    ///
    /// # Panics
    ///
    /// Panics if the field doesn't exist or doesn't match.
    pub fn assert_json_field(&self, json_pointer: &str, expected: &Value) -> &Self {
        let json = self.json();
        let actual = json.pointer(json_pointer).unwrap_or_else(|| {
            panic!(
                "JSON path {json_pointer} not found in:\n{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            )
        });
        assert_eq!(actual, expected, "JSON field {json_pointer} mismatch");
        self
    }

    /// # Panics
    ///
    /// Panics if the field doesn't exist.
    pub fn assert_json_field_exists(&self, json_pointer: &str) -> &Self {
        let json = self.json();
        assert!(
            json.pointer(json_pointer).is_some(),
            "JSON path {json_pointer} not found"
        );
        self
    }
}
