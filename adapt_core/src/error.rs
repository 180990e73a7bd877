//! Error types for the adapt_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for adapt_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A structural precondition was violated by the caller
    #[error("Validation error: {0}")]
    Validation(String),

    /// A statistical model needs more history than was supplied
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session log or profile store error
    #[error("Store error: {0}")]
    Store(String),
}

impl Error {
    /// True for the cold-start case where the athlete simply has too little history
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Error::InsufficientData(_))
    }

    /// True when the caller broke an input contract
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
