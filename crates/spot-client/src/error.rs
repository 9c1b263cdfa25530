//! Error types for spot-client

use thiserror::Error;

/// Errors that can occur while talking to the collector
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure or unusable client configuration
    #[error("HTTP error: {0}")]
    Http(String),

    /// Collector answered with a non-success status
    #[error("collector returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body did not match the expected shape
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}

/// Result type for collector operations
pub type Result<T> = std::result::Result<T, ClientError>;
