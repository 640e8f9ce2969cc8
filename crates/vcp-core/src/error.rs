//! Common error types used across all vcp crates

use thiserror::Error;

/// Errors reported by the control-plane client ports
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ClientError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ClientError::Configuration {
            message: message.into(),
        }
    }

    /// True for 404 responses and explicit not-found results
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::NotFound { .. } | ClientError::Api { status: 404, .. }
        )
    }
}

/// Errors raised while capturing interactive input
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input stream closed")]
    Closed,

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),
}

/// Result type alias for client port operations
pub type ClientResult<T> = Result<T, ClientError>;
