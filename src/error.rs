//! Error types for formcheck.

use thiserror::Error;

/// Library-level error type for formcheck operations.
#[derive(Error, Debug)]
pub enum FormcheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Knowledge store error: {0}")]
    Store(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for formcheck operations.
pub type Result<T> = std::result::Result<T, FormcheckError>;
