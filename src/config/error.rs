//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Completion base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid completion timeout (must be 1-600 seconds)")]
    InvalidTimeout,

    #[error("Too many completion retries (maximum 10)")]
    TooManyRetries,

    #[error("Artifact file name contains a path separator")]
    InvalidFileName,

    #[error("Artifact extension must be alphanumeric")]
    InvalidExtension,

    #[error("Structured tag must be a single word")]
    InvalidStructuredTag,
}
