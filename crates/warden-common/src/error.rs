//! Common error types for Warden components.

use thiserror::Error;

use crate::types::Response;

/// Common errors across Warden components
#[derive(Debug, Error)]
pub enum WardenError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP transport could not complete the exchange
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Verification completed but the response is not valid.
    /// Only raised by the throwing verification variant.
    #[error("Verification failed: [{}]", .0.error_codes().join(", "))]
    Failed(Box<Response>),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WardenError {
    /// Wrap any transport-level failure
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Transport(_) => 502,
            Self::Failed(_) => 403,
            Self::Serialization(_) => 500,
            Self::InvalidInput(_) => 400,
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The response behind a failed verification, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Failed(response) => Some(response.as_ref()),
            _ => None,
        }
    }
}
