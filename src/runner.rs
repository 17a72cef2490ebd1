//! Process execution for built ansible commands.
//!
//! [`CommandRunner`] is the seam between the HTTP layer and the operating
//! system. [`LocalRunner`] spawns the command directly from its argument
//! vector; tests plug in runners that return canned output.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::command::AnsibleCommand;
use crate::config::AnsibleConfig;
use crate::error::{Error, Result};

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Content written to standard output
    pub stdout: String,
    /// Content written to standard error
    pub stderr: String,
}

impl ExecutionOutput {
    /// Create an output for a process that exited with status 0.
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an output for a process that exited with `exit_code`.
    pub fn failure(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status 0.
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes an [`AnsibleCommand`] and captures its output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    ///
    /// A process that starts and exits, whatever its status, is `Ok`; only
    /// failing to start or exceeding a timeout is an error.
    async fn execute(&self, command: &AnsibleCommand) -> Result<ExecutionOutput>;
}

/// Runs commands as child processes of the server.
#[derive(Debug, Clone, Default)]
pub struct LocalRunner {
    timeout: Option<Duration>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl LocalRunner {
    /// Create a runner without timeout or extra environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner from the `[ansible]` configuration section.
    pub fn from_config(config: &AnsibleConfig) -> Self {
        Self {
            timeout: config.timeout.map(Duration::from_secs),
            env: config.environment.clone(),
            cwd: config.working_dir.clone(),
        }
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set an environment variable for every spawned process.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run processes from `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn build_command(&self, command: &AnsibleCommand) -> Command {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args());

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        // The child is killed if the waiting future is dropped, e.g. on timeout.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    async fn execute(&self, command: &AnsibleCommand) -> Result<ExecutionOutput> {
        debug!(command = %command, "Executing command");

        let child = self
            .build_command(command)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| Error::Timeout(timeout))??,
            None => child.wait_with_output().await?,
        };

        let result = ExecutionOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        trace!(
            exit_code = ?result.exit_code,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            "Command completed"
        );

        Ok(result)
    }
}
