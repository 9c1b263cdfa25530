//! Error taxonomy for runner loading, rendering and execution.

use std::path::PathBuf;

use thiserror::Error;

/// Joins names as `` `a`, `b` `` for error messages.
pub(crate) fn backticked(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_failure(command: &str, stderr: &str) -> String {
    match stderr.trim() {
        "" => format!("`{command}`"),
        stderr => format!("`{command}`: {stderr}"),
    }
}

/// Errors raised while reading a definition or building a [`Runner`](crate::Runner) from it.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Definition file missing or unreadable
    #[error("could not load `{name}': {source}")]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Definition file is not valid JSON
    #[error("could not load `{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Definition file is valid JSON but not an object
    #[error("could not load `{name}': definition must be a JSON object")]
    NotAnObject { name: String },

    /// `extends` is present but not a definition name
    #[error("could not load `{name}': `extends' must name a definition")]
    InvalidExtends { name: String },

    /// Required key absent after inheritance merge
    #[error("could not load `{name}': `{key}' key not specified")]
    MissingKey { name: String, key: &'static str },

    /// `extends` chain loops back on itself
    #[error("inheritance cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    /// Parameter declaration is not of the form `name:type`
    #[error("invalid parameter declaration `{declaration}', expected name:type")]
    InvalidDeclaration { declaration: String },

    /// Parameter declared with a type outside str/int/float/path
    #[error("parameter `{name}' has unknown type `{type_name}'")]
    UnknownType { name: String, type_name: String },

    /// Same parameter name declared twice
    #[error("parameter `{name}' declared more than once")]
    DuplicateParameter { name: String },

    /// `run-commands` is empty
    #[error("runner has no run commands")]
    NoTemplates,
}

/// A raw parameter string that could not be converted to its declared type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Cannot convert `{value}' to type {target}")]
    InvalidValue { value: String, target: &'static str },

    #[error("Interval must be start:stop:num, got `{value}'")]
    IntervalFormat { value: String },

    #[error("Interval number must be of type int, got `{value}'")]
    IntervalCount { value: String },

    #[error("Interval number must be at least 1, got {count}")]
    EmptyInterval { count: i64 },

    #[error("Interval number {count} is too large")]
    IntervalTooLarge { count: i64 },
}

/// Template rendering failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("template references unbound name `{name}`")]
    UnboundName { name: String },

    #[error("unsupported template expression `{expression}`")]
    UnsupportedExpression { expression: String },
}

/// Errors that abort a [`Runner::execute`](crate::Runner::execute) call.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{} not provided", backticked(.keys))]
    MissingParameters { keys: Vec<String> },

    #[error("don't know {}", backticked(.keys))]
    UnknownParameters { keys: Vec<String> },

    #[error("parameter `{name}`: {source}")]
    Conversion {
        name: String,
        #[source]
        source: ConversionError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {}", describe_failure(.command, .stderr))]
    CommandFailed { command: String, stderr: String },

    #[error("parameter space of {} is too large to enumerate", backticked(.parameters))]
    SpaceTooLarge { parameters: Vec<String> },

    #[error("Version command `{command}` failed: {}", .stderr.trim())]
    VersionCommand { command: String, stderr: String },
}

/// Result type for runner execution.
pub type Result<T> = std::result::Result<T, ExecutionError>;
