//! Ad-hoc ansible operations: build, execute, parse.

use std::sync::Arc;

use tracing::{info, warn};

use crate::command::{AnsibleCommand, CommandBuilder, ListHostsParams, RunParams};
use crate::error::{Error, Result};
use crate::parser::{parse_list_hosts, parse_run, RunResult};
use crate::runner::{CommandRunner, ExecutionOutput};

/// Exit code ansible uses when one or more hosts failed.
pub const EXIT_HOST_FAILED: i32 = 2;
/// Exit code ansible 1.x used when one or more hosts were unreachable.
pub const EXIT_HOST_UNREACHABLE_LEGACY: i32 = 3;
/// Exit code ansible-core uses when one or more hosts were unreachable.
pub const EXIT_HOST_UNREACHABLE: i32 = 4;

/// Runs ad-hoc ansible commands through a [`CommandRunner`].
#[derive(Clone)]
pub struct AdHoc {
    builder: CommandBuilder,
    runner: Arc<dyn CommandRunner>,
}

impl AdHoc {
    /// Create an instance invoking `program` through `runner`.
    pub fn new(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            builder: CommandBuilder::new(program),
            runner,
        }
    }

    /// The command builder in use.
    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    /// Run a module against the hosts matching `params.hosts`.
    ///
    /// Host failures are part of the result: exit codes 2, 3 and 4 still
    /// yield a [`RunResult`]. Any other non-zero exit is an error and whatever was
    /// printed is discarded.
    pub async fn run(&self, params: &RunParams) -> Result<RunResult> {
        let command = self.builder.run(params)?;
        let output = self.runner.execute(&command).await?;

        if !run_completed(output.exit_code) {
            return Err(execution_failed(&command, output));
        }

        let ExecutionOutput { stdout, stderr, .. } = output;
        let result = tokio::task::spawn_blocking(move || parse_run(&stdout, &stderr))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        info!(
            hosts = %command.args()[0],
            success = result.success.len(),
            failed = result.failed.len(),
            "Ad-hoc run finished"
        );

        Ok(result)
    }

    /// List the hosts matching `params.hosts`.
    pub async fn list_hosts(&self, params: &ListHostsParams) -> Result<Vec<String>> {
        let command = self.builder.list_hosts(params)?;
        let output = self.runner.execute(&command).await?;

        if !output.is_success() {
            return Err(execution_failed(&command, output));
        }

        let hosts = parse_list_hosts(&output.stdout);
        info!(pattern = %command.args()[0], count = hosts.len(), "Listed hosts");

        Ok(hosts)
    }
}

impl std::fmt::Debug for AdHoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdHoc")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

/// Whether ansible ran to completion, possibly with failed hosts.
pub fn run_completed(exit_code: Option<i32>) -> bool {
    matches!(
        exit_code,
        Some(0 | EXIT_HOST_FAILED | EXIT_HOST_UNREACHABLE_LEGACY | EXIT_HOST_UNREACHABLE)
    )
}

fn execution_failed(command: &AnsibleCommand, output: ExecutionOutput) -> Error {
    warn!(
        command = %command,
        exit_code = ?output.exit_code,
        stderr = %output.stderr.trim(),
        "Ansible exited with an error"
    );

    Error::ExecutionFailed {
        command: command.render(),
        exit_code: output.exit_code,
        stderr: output.stderr,
    }
}
