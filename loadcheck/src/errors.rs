//! Error types for the loadcheck harness.
//!
//! Contract violations are not errors; they are reported through
//! [`ValidationResult`](crate::contracts::ValidationResult). The types here
//! cover faults that stop an operation: an unusable specification document,
//! bad configuration, transport failures.

use thiserror::Error;

use crate::contracts::SpecLoadError;

/// The main error type for loadcheck operations.
#[derive(Debug, Error)]
pub enum LoadcheckError {
    /// The specification document could not back a schema store.
    #[error("{0}")]
    SpecLoad(#[from] SpecLoadError),

    /// Invalid configuration value.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// An HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The run was cancelled.
    #[error("Run cancelled: {0}")]
    Cancelled(String),

    /// A scenario iteration failed.
    #[error("Iteration error: {0}")]
    Iteration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadcheckError {
    /// Creates an iteration error.
    #[must_use]
    pub fn iteration(message: impl Into<String>) -> Self {
        Self::Iteration(message.into())
    }
}

impl From<reqwest::Error> for LoadcheckError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Error raised when a configuration value cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A duration string such as `"1m30s"` was malformed.
    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    /// A threshold expression such as `"p(95)<500"` was malformed.
    #[error("invalid threshold expression '{0}'")]
    InvalidThreshold(String),

    /// A load profile cannot run (e.g. zero VUs, no stages).
    #[error("invalid load profile: {0}")]
    InvalidProfile(String),

    /// No scenario with this name exists.
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
}

/// Result alias used across the crate.
pub type Result<T, E = LoadcheckError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts() {
        let err: LoadcheckError = ConfigError::InvalidDuration("5x".to_string()).into();
        assert_eq!(err.to_string(), "invalid duration '5x'");
    }

    #[test]
    fn test_spec_load_error_converts() {
        let err: LoadcheckError = SpecLoadError::MissingDefinitions.into();
        assert!(matches!(err, LoadcheckError::SpecLoad(_)));
    }

    #[test]
    fn test_iteration_error_display() {
        let err = LoadcheckError::iteration("no products");
        assert_eq!(err.to_string(), "Iteration error: no products");
    }
}
