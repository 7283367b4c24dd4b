//! Error types for inventory client configuration
//!
//! All of these are raised while starting up, before any request is made.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for client configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON or has the wrong shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A service section is missing
    #[error("config must have a '{0}' section")]
    MissingSection(&'static str),

    /// A required value in a service section is missing
    #[error("{api} config: '{key}' value required")]
    MissingValue { api: &'static str, key: &'static str },

    /// A service URL does not parse
    #[error("{api} config: invalid url '{url}': {reason}")]
    InvalidUrl {
        api: &'static str,
        url: String,
        reason: String,
    },

    /// HTTP client could not be built
    #[error("failed to build {api} client: {source}")]
    Client {
        api: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type for client configuration
pub type Result<T> = std::result::Result<T, ConfigError>;
