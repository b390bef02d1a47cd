//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Product identifier list contains an empty identifier")]
    EmptyProductId,

    #[error("Product identifier list contains duplicate '{0}'")]
    DuplicateProductId(String),

    #[error("Status group identifier must not be empty")]
    EmptyStatusGroupId,
}
