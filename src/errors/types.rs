//! Error type definitions for the playlist pipeline
//!
//! Errors are split by the layer that produces them. Per-resource fetch errors and
//! cache corruption are recoverable and never leave their layer; only filesystem
//! failures on the scratch space abort a pipeline run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Scratch space or other required local filesystem operation failed
    #[error("Filesystem error: {operation} {path:?} - {source}")]
    Filesystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache store errors that could not be handled as a miss
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Per-resource fetch failures
///
/// These are swallowed at the fetcher boundary: the caller only ever sees the
/// resource as absent.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The request exceeded the configured deadline
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    /// Non-2xx response
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Body could not be decoded (listing JSON, ...)
    #[error("Failed to decode {url}: {message}")]
    Decode { url: String, message: String },

    /// The resource URL could not be built
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Writing the fetched body to local storage failed
    #[error("Failed to store {url} at {path:?}: {source}")]
    Io {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cache store errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache file exists but cannot be decoded
    #[error("Corrupt cache file {path:?}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Reading or writing the cache file failed
    #[error("Cache I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the cache document failed
    #[error("Cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Create a filesystem error for a failed operation on `path`
    pub fn filesystem<O: Into<String>, P: Into<PathBuf>>(
        operation: O,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Map a reqwest transport error onto the fetch taxonomy
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if error.is_decode() {
            Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// The URL of the resource that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::InvalidUrl { url, .. }
            | Self::Io { url, .. } => url,
        }
    }
}
