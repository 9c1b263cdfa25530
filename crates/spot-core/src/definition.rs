//! Declarative runner definition, as read from disk and sent to the collector.

use serde::{Deserialize, Serialize};

/// Required keys of a runner definition, in the order they are checked.
pub const REQUIRED_KEYS: [&str; 4] = ["version-command", "run-commands", "parameters", "version"];

/// A runner definition.
///
/// Field names follow the on-disk JSON format (`version-command`,
/// `run-commands`, ...). `extends` is only meaningful before inheritance
/// has been resolved by the loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RunnerDefinition {
    /// Shell command printing the version of the benchmarked executable.
    pub version_command: String,

    /// Declared version recorded alongside the resolved one.
    pub version: String,

    /// Shell templates executed in order for every assignment.
    pub run_commands: Vec<String>,

    /// Parameter declarations of the form `name:type`.
    pub parameters: Vec<String>,

    /// Parent definition name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

impl RunnerDefinition {
    pub fn new(
        version_command: impl Into<String>,
        version: impl Into<String>,
        run_commands: Vec<String>,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            version_command: version_command.into(),
            version: version.into(),
            run_commands,
            parameters,
            extends: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_uses_kebab_case_keys() {
        let json = serde_json::json!({
            "version-command": "echo 1.0",
            "version": "1.0",
            "run-commands": ["echo {{ n }}"],
            "parameters": ["n:int"],
        });
        let definition: RunnerDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(definition.version_command, "echo 1.0");
        assert_eq!(definition.run_commands, vec!["echo {{ n }}"]);
        assert!(definition.extends.is_none());

        let back = serde_json::to_value(&definition).unwrap();
        assert!(back.get("extends").is_none());
        assert_eq!(back["run-commands"][0], "echo {{ n }}");
    }
}
