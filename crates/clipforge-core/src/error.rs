//! Error types for ClipForge.

use thiserror::Error;

/// Main error type for ClipForge operations.
#[derive(Error, Debug)]
pub enum ClipForgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timeline error: {0}")]
    Timeline(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ClipForge operations.
pub type Result<T> = std::result::Result<T, ClipForgeError>;
