//! Error types shared across the VPS log collector crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, VpslogError>;

/// Main error type for the collector
#[derive(Error, Debug)]
pub enum VpslogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

impl VpslogError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an error for an environment value that failed to parse
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
