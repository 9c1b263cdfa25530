//! Spot Core - parameterized shell benchmark runners
//!
//! A runner describes a versioned external command, its typed parameters and
//! a sequence of shell templates. Executing it:
//! - Validates and converts raw parameter strings (with `start:stop:count` ranges)
//! - Expands the cartesian product of all parameter values
//! - Renders and runs every template per assignment, recording a fact each

pub mod config;
pub mod converter;
pub mod definition;
pub mod error;
pub mod executor;
pub mod expand;
pub mod fact;
pub mod fakes;
pub mod identity;
pub mod loader;
pub mod obs;
pub mod parameters;
pub mod runner;
pub mod telemetry;
pub mod template;

// Re-export key types
pub use config::SpotConfig;
pub use converter::{ParamType, ParamValue};
pub use definition::RunnerDefinition;
pub use error::{ConversionError, ExecutionError, LoadError, RenderError};
pub use executor::{CommandExecutor, CommandOutcome, ShellExecutor};
pub use expand::{Assignment, ParameterSpace};
pub use fact::{Fact, FactPayload, Step};
pub use identity::compute_uid;
pub use loader::{Loader, MergePrecedence};
pub use parameters::ParameterTable;
pub use runner::{ExecutionPhase, FailurePolicy, Runner};
pub use telemetry::init_tracing;
