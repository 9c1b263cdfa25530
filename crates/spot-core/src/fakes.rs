//! In-memory fakes for the executor trait (testing only)
//!
//! `RecordingExecutor` never spawns a process. It records every command it is
//! asked to run and answers from a small script of canned responses.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::executor::{CommandExecutor, CommandOutcome};

#[derive(Debug, Clone)]
struct Response {
    prefix: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

/// Executor that records commands instead of running them.
///
/// Commands without a matching response succeed with empty output. The first
/// response whose prefix the command starts with wins.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    responses: Vec<Response>,
    elapsed: f64,
    commands: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            elapsed: 0.01,
            ..Self::default()
        }
    }

    /// Succeed with `stdout` for commands starting with `prefix`.
    pub fn respond(mut self, prefix: &str, stdout: &str) -> Self {
        self.responses.push(Response {
            prefix: prefix.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        });
        self
    }

    /// Exit with status 1 and `stderr` for commands starting with `prefix`.
    pub fn fail_on(mut self, prefix: &str, stderr: &str) -> Self {
        self.responses.push(Response {
            prefix: prefix.to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
        });
        self
    }

    /// Report this many seconds for every command.
    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, command: &str) -> Result<CommandOutcome> {
        self.commands.lock().unwrap().push(command.to_string());

        let response = self
            .responses
            .iter()
            .find(|r| command.starts_with(&r.prefix));

        Ok(match response {
            Some(r) => CommandOutcome {
                elapsed: self.elapsed,
                exit_code: Some(r.exit_code),
                stdout: r.stdout.clone(),
                stderr: r.stderr.clone(),
            },
            None => CommandOutcome {
                elapsed: self.elapsed,
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            },
        })
    }
}
