//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicit or well-known config file does not exist
    #[error("Config file does not exist at provided path: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    /// The bounded upward directory search found no match
    #[error("Could not locate '{name}' directory within {levels} levels of {}", start.display())]
    DirectoryNotFound {
        name: String,
        start: PathBuf,
        levels: usize,
    },

    /// A config document could not be read or parsed
    #[error("Could not load config file {}: {message}", path.display())]
    ConfigLoadFailure { path: PathBuf, message: String },

    /// A document was needed before initialization and auto-initialization is off
    #[error("Configuration has not been initialized")]
    NotInitialized,

    /// A dev-only operation was invoked outside the dev environment
    #[error("Operation '{operation}' is only allowed in dev environment")]
    OperationNotAllowed { operation: &'static str },

    /// A required key has no value
    #[error("{message}")]
    MissingKey { key: String, message: String },

    /// A raw value could not be converted to the requested type
    #[error("Value '{value}' of key '{key}' is not a valid {target}: {message}")]
    ParseFailure {
        key: String,
        value: String,
        target: &'static str,
        message: String,
    },

    /// The global document could not be opened, edited, or persisted
    #[error("Could not write config file {}: {message}", path.display())]
    ConfigWriteFailure { path: PathBuf, message: String },

    /// Malformed scope path
    #[error("Invalid scope path: {0}")]
    InvalidScopePath(String),

    /// Resolver options failed validation
    #[error("Invalid resolver options: {0}")]
    InvalidOptions(String),

    /// I/O error outside document loading (options file, working directory)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error in a resolver options file
    #[error("Failed to parse options: {0}")]
    OptionsParseError(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub(crate) fn load_failure(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ConfigLoadFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ConfigWriteFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error means a value was absent or malformed, as opposed
    /// to an environment problem (files, initialization, permissions)
    pub fn is_value_error(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::ParseFailure { .. })
    }
}
