//! Runner construction and execution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};

use crate::definition::RunnerDefinition;
use crate::error::{ExecutionError, LoadError, Result};
use crate::executor::{resolve_version, CommandExecutor, ShellExecutor};
use crate::expand::{Assignment, ParameterSpace};
use crate::fact::Fact;
use crate::identity::compute_uid;
use crate::parameters::ParameterTable;
use crate::{obs, template};

/// What to do when a step exits non-zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed step and fail the whole call.
    #[default]
    Abort,

    /// Record the failed step and carry on with the remaining steps and assignments.
    Continue,
}

/// Phases of a single `execute` call.
///
/// `Completed` and `Failed` are terminal; the reason for `Failed` is the
/// error returned by `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    Validating,
    Converting,
    Expanding,
    Executing { assignment: usize, step: usize },
    Completed,
    Failed,
}

/// A versioned, parameterized external-command definition.
///
/// Immutable once built. `execute` can be called any number of times,
/// including concurrently, with different parameter sets.
pub struct Runner {
    uid: String,
    definition: RunnerDefinition,
    parameters: ParameterTable,
    failure_policy: FailurePolicy,
    executor: Arc<dyn CommandExecutor>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("uid", &self.uid)
            .field("definition", &self.definition)
            .field("parameters", &self.parameters)
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Build a runner from a fully resolved definition.
    ///
    /// Fails if a parameter declaration is malformed, names an unknown type or
    /// repeats a name, or if there are no run commands.
    pub fn new(definition: RunnerDefinition) -> std::result::Result<Self, LoadError> {
        if definition.run_commands.is_empty() {
            return Err(LoadError::NoTemplates);
        }
        let parameters = ParameterTable::from_declarations(&definition.parameters)?;
        let uid = compute_uid(&definition);

        Ok(Self {
            uid,
            definition,
            parameters,
            failure_policy: FailurePolicy::default(),
            executor: Arc::new(ShellExecutor),
        })
    }

    /// Use a different command executor.
    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Set the step failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn definition(&self) -> &RunnerDefinition {
        &self.definition
    }

    pub fn version_command(&self) -> &str {
        &self.definition.version_command
    }

    /// Version as declared in the definition.
    pub fn declared_version(&self) -> &str {
        &self.definition.version
    }

    pub fn templates(&self) -> &[String] {
        &self.definition.run_commands
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Run the version command and return its output.
    pub async fn version(&self) -> Result<String> {
        resolve_version(self.executor.as_ref(), self.version_command()).await
    }

    /// Validate, convert and expand raw parameters without running anything.
    pub fn expand(&self, parameters: &HashMap<String, String>) -> Result<ParameterSpace> {
        obs::emit_phase(ExecutionPhase::Validating);
        self.parameters
            .validate(parameters.keys().map(String::as_str))?;

        obs::emit_phase(ExecutionPhase::Converting);
        let converted = self
            .parameters
            .convert(|name| parameters.get(name).map(String::as_str))?;

        obs::emit_phase(ExecutionPhase::Expanding);
        ParameterSpace::new(converted)
    }

    /// Execute every template for every combination of parameter values.
    ///
    /// Returns one fact per assignment, in expansion order. Under
    /// [`FailurePolicy::Abort`] the first failing step ends the call with
    /// [`ExecutionError::CommandFailed`] and no facts are returned.
    pub async fn execute(&self, parameters: &HashMap<String, String>) -> Result<Vec<Fact>> {
        async {
            let result = self.execute_inner(parameters).await;
            obs::emit_phase(match &result {
                Ok(_) => ExecutionPhase::Completed,
                Err(_) => ExecutionPhase::Failed,
            });
            result
        }
        .instrument(obs::execute_span(&self.uid))
        .await
    }

    async fn execute_inner(&self, parameters: &HashMap<String, String>) -> Result<Vec<Fact>> {
        let space = self.expand(parameters)?;
        let total = space.len();

        let version = self.version().await?;
        if version != self.definition.version {
            debug!(resolved = %version, declared = %self.definition.version, "version differs from declaration");
        }

        let mut facts = Vec::new();
        for (index, assignment) in space.assignments().enumerate() {
            obs::emit_fact_started(index, total, &version);
            let fact = self.execute_assignment(index, &version, assignment).await?;
            obs::emit_fact_finished(index, fact.steps.len(), fact.total_time());
            facts.push(fact);
        }

        Ok(facts)
    }

    async fn execute_assignment(
        &self,
        index: usize,
        version: &str,
        assignment: Assignment,
    ) -> Result<Fact> {
        let mut fact = Fact::new(self.uid.clone(), version, assignment);

        for (step, template) in self.templates().iter().enumerate() {
            obs::emit_phase(ExecutionPhase::Executing {
                assignment: index,
                step,
            });

            let command = template::render(template, &fact.assignment)?;
            let outcome = self.executor.run(&command).await?;
            let success = outcome.success();
            obs::emit_step_finished(&command, outcome.elapsed, success);

            if !success && self.failure_policy == FailurePolicy::Abort {
                return Err(ExecutionError::CommandFailed {
                    command,
                    stderr: outcome.stderr,
                });
            }

            fact.append(command, outcome.elapsed, success);
        }

        Ok(fact)
    }
}
