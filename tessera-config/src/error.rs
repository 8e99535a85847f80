// Error types for negotiation settings

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Invalid metadata: {0}")]
    Metadata(#[from] tessera_core::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
