//! Runner definitions on disk.
//!
//! A definition named `name` lives at `<data_dir>/name.json`. Definitions may
//! name a parent through `extends`; the chain is resolved by merging top-level
//! keys, with the precedence chosen by [`MergePrecedence`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::SpotConfig;
use crate::definition::{RunnerDefinition, REQUIRED_KEYS};
use crate::error::LoadError;
use crate::runner::Runner;

const EXTENDS_KEY: &str = "extends";

/// Which side wins when child and parent define the same key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergePrecedence {
    /// Keys declared by the child replace the parent's.
    #[default]
    ChildOverridesParent,

    /// Keys declared by the parent replace the child's (legacy behaviour).
    ParentOverridesChild,
}

/// Reads runner definitions from a data directory.
#[derive(Debug, Clone)]
pub struct Loader {
    data_dir: PathBuf,
    precedence: MergePrecedence,
}

impl Loader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            precedence: MergePrecedence::default(),
        }
    }

    pub fn from_config(config: &SpotConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    pub fn with_precedence(mut self, precedence: MergePrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn precedence(&self) -> MergePrecedence {
        self.precedence
    }

    /// Path of the definition file for `name`.
    pub fn definition_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    /// Sorted names of all definitions; an absent directory lists nothing.
    pub fn list_all(&self) -> Result<Vec<String>, LoadError> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LoadError::Read {
                    name: self.data_dir.display().to_string(),
                    path: self.data_dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| LoadError::Read {
                    name: self.data_dir.display().to_string(),
                    path: self.data_dir.clone(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read `name`, resolve its `extends` chain and check required keys.
    pub fn load_data(&self, name: &str) -> Result<RunnerDefinition, LoadError> {
        let mut chain = Vec::new();
        let merged = self.read_recursively(name, &mut chain)?;

        for key in REQUIRED_KEYS {
            if !merged.contains_key(key) {
                return Err(LoadError::MissingKey {
                    name: name.to_string(),
                    key,
                });
            }
        }

        serde_json::from_value(Value::Object(merged)).map_err(|source| LoadError::Parse {
            name: name.to_string(),
            source,
        })
    }

    /// Load `name` and build a runner from it.
    pub fn load(&self, name: &str) -> Result<Runner, LoadError> {
        Runner::new(self.load_data(name)?)
    }

    fn read_recursively(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<Map<String, Value>, LoadError> {
        if chain.iter().any(|seen| seen == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(LoadError::InheritanceCycle { chain: cycle });
        }
        chain.push(name.to_string());

        let mut data = self.read_one(name)?;
        let parent = match data.remove(EXTENDS_KEY) {
            None | Some(Value::Null) => return Ok(data),
            Some(Value::String(parent)) => parent,
            Some(_) => {
                return Err(LoadError::InvalidExtends {
                    name: name.to_string(),
                })
            }
        };

        debug!(definition = %name, parent = %parent, "resolving parent definition");
        let parent_data = self.read_recursively(&parent, chain)?;
        Ok(merge(data, parent_data, self.precedence))
    }

    fn read_one(&self, name: &str) -> Result<Map<String, Value>, LoadError> {
        let path = self.definition_path(name);
        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
            name: name.to_string(),
            path: path.clone(),
            source,
        })?;

        match serde_json::from_str(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(LoadError::NotAnObject {
                name: name.to_string(),
            }),
            Err(source) => Err(LoadError::Parse {
                name: name.to_string(),
                source,
            }),
        }
    }
}

fn merge(
    child: Map<String, Value>,
    parent: Map<String, Value>,
    precedence: MergePrecedence,
) -> Map<String, Value> {
    let (mut base, overrides) = match precedence {
        MergePrecedence::ChildOverridesParent => (parent, child),
        MergePrecedence::ParentOverridesChild => (child, parent),
    };
    base.extend(overrides);
    base
}
