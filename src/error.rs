//! Custom error types for model-config
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for model-config operations
#[derive(Error, Debug)]
pub enum ModelConfigError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Structurally invalid request (missing tactic, vertical or values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad password, or a malformed, forged or expired token.
    ///
    /// Carries no detail so callers cannot tell which check failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// The tabular store call failed or returned a non-success status
    #[error("{0}")]
    Store(String),

    /// The upstream store credential could not be obtained
    #[error("Credential error: {0}")]
    Credential(String),
}

impl ModelConfigError {
    /// Check if this is an authentication failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for ModelConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ModelConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ModelConfigError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<reqwest::Error> for ModelConfigError {
    fn from(err: reqwest::Error) -> Self {
        Self::Store(err.to_string())
    }
}

/// Result type alias for model-config operations
pub type ModelConfigResult<T> = Result<T, ModelConfigError>;
