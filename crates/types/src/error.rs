//! Error types for the CortexAi configuration subsystem

use std::fmt;
use thiserror::Error;

/// Pipeline stage in which a configuration error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Reading and parsing the configuration sources
    Parse,
    /// Resolving the process environment and dotenv file
    Environment,
    /// Replacing `${NAME}` placeholders
    Substitution,
    /// Schema and referential checks
    Validation,
    /// Converting the validated document into typed records
    Build,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Parse => "parse",
            LoadStage::Environment => "environment",
            LoadStage::Substitution => "substitution",
            LoadStage::Validation => "validation",
            LoadStage::Build => "build",
        };
        f.write_str(name)
    }
}

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Reading a configuration source failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Dotenv file could not be opened or read
    #[error("Failed to read environment file {path}: {message}")]
    Environment { path: String, message: String },

    /// Malformed document
    #[error("Configuration parse error in {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Strict-mode substitution hit an unset variable
    #[error("Missing environment variable {name} referenced at {path}")]
    MissingEnvironmentVariable { name: String, path: String },

    /// Variable values reference each other in a loop
    #[error("Environment variable {name} references itself (directly or indirectly) at {path}")]
    CyclicEnvironmentVariable { name: String, path: String },

    /// Schema or referential violation
    #[error("Configuration validation error: {path}: {reason}")]
    Validation { path: String, reason: String },

    /// A required value survived validation without being set
    #[error("No value or default for required configuration field: {path}")]
    MissingDefault { path: String },
}

impl ConfigError {
    /// Stage of the load pipeline this error belongs to
    pub fn stage(&self) -> LoadStage {
        match self {
            ConfigError::FileNotFound { .. }
            | ConfigError::Io { .. }
            | ConfigError::Parse { .. } => LoadStage::Parse,
            ConfigError::Environment { .. } => LoadStage::Environment,
            ConfigError::MissingEnvironmentVariable { .. }
            | ConfigError::CyclicEnvironmentVariable { .. } => LoadStage::Substitution,
            ConfigError::Validation { .. } => LoadStage::Validation,
            ConfigError::MissingDefault { .. } => LoadStage::Build,
        }
    }

    /// Document path or file the error points at
    pub fn location(&self) -> &str {
        match self {
            ConfigError::FileNotFound { path }
            | ConfigError::Io { path, .. }
            | ConfigError::Environment { path, .. } => path,
            ConfigError::Parse { origin, .. } => origin,
            ConfigError::MissingEnvironmentVariable { path, .. }
            | ConfigError::CyclicEnvironmentVariable { path, .. }
            | ConfigError::Validation { path, .. }
            | ConfigError::MissingDefault { path } => path,
        }
    }

    pub fn validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
