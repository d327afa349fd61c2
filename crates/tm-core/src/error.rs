//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Migration version is empty
    #[error("[C004] Migration version must not be empty")]
    EmptyVersion,

    /// C005: Unknown migration status string
    #[error("[C005] Unknown migration status '{0}': expected 'Successful' or 'Failed'")]
    UnknownStatus(String),

    /// C006: Additional artifacts could not be (de)serialized
    #[error("[C006] Invalid additional artifacts: {0}")]
    Artifacts(#[from] serde_json::Error),

    /// C007: IO error with file path context
    #[error("[C007] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
