//! Error types for shadowhosts.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve one remote source. Never fatal to a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("response too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("cumulative download limit exceeded: {total} bytes (max: {max} bytes)")]
    CumulativeLimit { total: usize, max: usize },

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Problems with the local configuration. These abort the run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file {0} does not exist")]
    Missing(PathBuf),

    #[error("could not find an existing configuration file. Use --genconfig to generate one")]
    NotFound,

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid redirect target '{target}' for '{hostname}': not an IP address")]
    InvalidRedirect { hostname: String, target: String },

    #[error("invalid hostname '{0}' in {1}")]
    InvalidHostname(String, &'static str),

    #[error("source URL must use http:// or https://: {0}")]
    InvalidSource(String),
}
