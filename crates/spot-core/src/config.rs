//! Process configuration: definition directory and collector address.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default collector address.
pub const DEFAULT_COLLECTOR_URL: &str = "http://localhost:5000";

/// Spot configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotConfig {
    /// Directory holding `<name>.json` runner definitions
    pub data_dir: PathBuf,
    /// Base URL of the fact collector
    pub collector_url: String,
}

impl Default for SpotConfig {
    fn default() -> Self {
        SpotConfig {
            data_dir: default_data_dir(),
            collector_url: std::env::var("SPOT_HOST")
                .unwrap_or_else(|_| DEFAULT_COLLECTOR_URL.to_string()),
        }
    }
}

impl SpotConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Override the definition directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Override the collector address
    pub fn with_collector_url(mut self, url: &str) -> Self {
        self.collector_url = url.to_string();
        self
    }
}

/// `SPOT_DATA_DIR`, else `$XDG_DATA_HOME/spot`, else `$HOME/.local/share/spot`.
fn default_data_dir() -> PathBuf {
    if let Some(dir) = non_empty_var("SPOT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(data_home) = non_empty_var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join("spot");
    }
    match non_empty_var("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share").join("spot"),
        None => PathBuf::from("spot"),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
