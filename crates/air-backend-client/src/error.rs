//! Error types for the backend client

use thiserror::Error;

/// Backend client error
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend rejected the request
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Credential missing, expired or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Row or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client could not be constructed from its configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
