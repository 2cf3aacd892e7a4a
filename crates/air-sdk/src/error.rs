//! Error types for the AIR Members SDK

use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK error types
#[derive(Error, Debug)]
pub enum SdkError {
    /// Hosted backend rejected the call or was unreachable
    #[error("Backend error: {0}")]
    Backend(#[from] air_backend_client::BackendError),

    /// Local mirror store could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation needs a signed-in (remote or demo) identity
    #[error("Sign in required")]
    SignInRequired,

    /// Demo authentication is switched off
    #[error("Demo mode is not enabled")]
    DemoDisabled,

    /// No backend URL/key configured
    #[error("Hosted backend is not configured")]
    BackendNotConfigured,

    /// Missing or malformed user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced record does not exist for this identity
    #[error("Not found: {0}")]
    NotFound(String),
}
