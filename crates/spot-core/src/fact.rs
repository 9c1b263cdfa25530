//! Execution records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::expand::Assignment;

/// One rendered and executed command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Command line exactly as handed to the shell.
    pub command: String,

    /// Elapsed wall-clock seconds.
    pub time: f64,

    /// Whether the command exited with status zero.
    pub success: bool,
}

/// Outcome of running every template for one assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fact {
    /// Uid of the producing runner.
    pub runner_uid: String,

    /// Version reported by the runner's version command.
    pub version: String,

    /// When the fact was created.
    pub start: DateTime<Utc>,

    /// Parameter values this fact was produced with.
    pub assignment: Assignment,

    /// Executed steps, in template order.
    pub steps: Vec<Step>,
}

/// Collector representation of a fact: `{start, steps}`.
#[derive(Debug, Serialize)]
pub struct FactPayload<'a> {
    pub start: &'a DateTime<Utc>,
    pub steps: &'a [Step],
}

impl Fact {
    /// Start a new fact for `assignment`.
    pub fn new(runner_uid: impl Into<String>, version: impl Into<String>, assignment: Assignment) -> Self {
        Self {
            runner_uid: runner_uid.into(),
            version: version.into(),
            start: Utc::now(),
            assignment,
            steps: Vec::new(),
        }
    }

    /// Record an executed step.
    pub fn append(&mut self, command: impl Into<String>, time: f64, success: bool) {
        self.steps.push(Step {
            command: command.into(),
            time,
            success,
        });
    }

    /// Whether every recorded step succeeded.
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.success)
    }

    /// Sum of step times in seconds.
    pub fn total_time(&self) -> f64 {
        self.steps.iter().map(|s| s.time).sum()
    }

    /// Borrowed view in the shape the collector accepts.
    pub fn payload(&self) -> FactPayload<'_> {
        FactPayload {
            start: &self.start,
            steps: &self.steps,
        }
    }
}
