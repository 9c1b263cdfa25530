//! Shell command execution.
//!
//! Rendered commands are handed verbatim to `sh -c`, so templates may use
//! pipes, redirection and globbing. Nothing is validated or sandboxed, and a
//! command that never exits blocks the caller indefinitely.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ExecutionError, Result};

/// Outcome of one executed command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// Wall-clock seconds from just before spawn until exit.
    pub elapsed: f64,

    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,
}

impl CommandOutcome {
    /// Whether the command exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs shell command lines on behalf of a [`Runner`](crate::Runner).
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `command` to completion and report its outcome.
    ///
    /// A non-zero exit is not an error here; only failing to start is.
    async fn run(&self, command: &str) -> Result<CommandOutcome>;
}

/// Executor backed by the system shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }

    fn shell(command: &str) -> Command {
        #[cfg(windows)]
        {
            let mut shell = Command::new("cmd");
            shell.arg("/C").arg(command);
            shell
        }
        #[cfg(not(windows))]
        {
            let mut shell = Command::new("sh");
            shell.arg("-c").arg(command);
            shell
        }
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &str) -> Result<CommandOutcome> {
        let start = Instant::now();

        let child = Self::shell(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ExecutionError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let elapsed = start.elapsed().as_secs_f64();

        Ok(CommandOutcome {
            elapsed,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run a version command and return its trimmed stdout.
pub async fn resolve_version(executor: &dyn CommandExecutor, command: &str) -> Result<String> {
    let outcome = executor.run(command).await?;
    if !outcome.success() {
        return Err(ExecutionError::VersionCommand {
            command: command.to_string(),
            stderr: outcome.stderr,
        });
    }
    Ok(outcome.stdout.trim().to_string())
}
