//! Error types for loading, merging and saving configuration.
//!
//! Uses thiserror for derive macros. Every variant carries enough context to
//! tell the caller which path or source was at fault.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A referenced source path (file or directory) does not exist.
    #[error("Path '{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    /// A source is neither a mapping nor a parseable YAML mapping document.
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// A save target cannot be written to.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A required setting (the root directory) is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A template variable was referenced without a default and is not set.
    #[error("Template variable `{var}` is not set (in '{}')", path.display())]
    Template { var: String, path: PathBuf },

    /// Filesystem failure not covered by the variants above.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tree could not be serialized.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
