//! Shell execution of package scripts.
//!
//! Scripts declared in manifests may use shell syntax (pipes, `&&`, globs), so
//! they are handed to the host shell as a single string. The
//! [`ProcessRunner`] trait keeps that choice out of the orchestrator.

use std::collections::BTreeMap;
use std::process::{Command, ExitStatus, Stdio};

use camino::Utf8PathBuf;

use crate::error::{BuilderError, Result};

/// Explicit environment for a child process.
pub type Environment = BTreeMap<String, String>;

/// A shell command to run inside a package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    /// The shell command line.
    pub command: String,
    /// Directory the command runs in.
    pub working_dir: Utf8PathBuf,
    /// Replacement environment; `None` inherits the parent environment.
    pub env: Option<Environment>,
}

impl ScriptRequest {
    /// Create a request that inherits the parent environment.
    #[must_use]
    pub fn new(command: impl Into<String>, working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            env: None,
        }
    }

    /// Replace the inherited environment with `env`.
    #[must_use]
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }
}

/// Captured result of a finished script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Standard output, trimmed.
    pub stdout: String,
    /// Standard error, trimmed.
    pub stderr: String,
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl ExecutionResult {
    /// Returns true when the script exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs package scripts.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner {
    /// Run the request to completion and capture its output.
    ///
    /// A non-zero exit code is reported in the result, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Launch`] when the process cannot be spawned.
    fn execute(&self, request: &ScriptRequest) -> Result<ExecutionResult>;
}

/// Runs scripts through the host shell.
///
/// # Examples
///
/// ```no_run
/// use app_builder::process::{ProcessRunner, ScriptRequest, ShellRunner};
///
/// let result = ShellRunner.execute(&ScriptRequest::new("echo hi", "/tmp"))?;
/// assert_eq!(result.stdout, "hi");
/// # Ok::<(), app_builder::error::BuilderError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn execute(&self, request: &ScriptRequest) -> Result<ExecutionResult> {
        let mut cmd = shell_command(&request.command);
        cmd.current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(env) = &request.env {
            cmd.env_clear().envs(env);
        }

        // `output` drains both pipes concurrently before reaping the child.
        let output = cmd.output().map_err(|source| BuilderError::Launch {
            command: request.command.clone(),
            working_dir: request.working_dir.clone(),
            source,
        })?;

        Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            exit_code: exit_code(output.status),
        })
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.args(["-c", command]);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
