//! Error types for the chunking pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Source directory is missing or not a directory
    #[error("Source directory not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid chunking or configuration values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Text could not be extracted from a document
    #[error("Failed to extract text from '{document}': {message}")]
    Extraction { document: String, message: String },

    /// Output could not be persisted
    #[error("Failed to write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl Error {
    /// Create an extraction error
    pub fn extraction(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a write error
    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error only affects a single document
    pub fn is_per_document(&self) -> bool {
        matches!(self, Self::Extraction { .. })
    }
}
