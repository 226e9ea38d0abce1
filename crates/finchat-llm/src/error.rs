//! Error types for model calls

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors raised while talking to a chat model
#[derive(Error, Debug)]
pub enum LLMError {
    /// The request could not be completed
    #[error("Model request failed: {0}")]
    RequestFailed(String),

    /// HTTP 401 from the model API
    #[error("Model API rejected the API key (authentication failed)")]
    AuthenticationFailed,

    /// HTTP 429 from the model API
    #[error("Model API rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// HTTP 400, or a request rejected before sending
    #[error("Invalid model request: {0}")]
    InvalidRequest(String),

    /// HTTP 404, or a model outside the configured allow-list
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Any other non-success status
    #[error("Model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failure
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The reply did not have the expected shape
    #[error("Unexpected model response: {0}")]
    UnexpectedResponse(String),

    /// Provider misconfiguration
    #[error("Model provider configuration error: {0}")]
    Configuration(String),
}

impl LLMError {
    /// Map a non-success HTTP status to an error
    ///
    /// `model` names the requested model for 404 replies.
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            400 => Self::InvalidRequest(body),
            401 => Self::AuthenticationFailed,
            404 => Self::ModelNotFound(model.to_string()),
            429 => Self::RateLimitExceeded(body),
            _ => Self::Status { status, body },
        }
    }
}
