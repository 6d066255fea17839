//! Error types for chatrospect-core

use thiserror::Error;

/// Core library error type.
///
/// The metrics engine itself never fails; these errors surface at the
/// boundaries (input decoding, configuration, annotation providers).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Annotation error: {0}")]
    Annotation(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias using Error.
pub type Result<T> = std::result::Result<T, Error>;
