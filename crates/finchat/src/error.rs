//! Error types for indicator computation and function dispatch

use finchat_llm::LLMError;
use thiserror::Error;

/// Errors surfaced to the user when a turn fails
#[derive(Debug, Error)]
pub enum ChatError {
    /// The market-data provider does not know the ticker
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// The market-data provider could not be reached or failed
    #[error("Data not available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// The series is too short for the requested indicator
    #[error("Insufficient data for {indicator}: need {required} closes, have {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    /// A window of zero was requested
    #[error("Invalid window {0}: window must be at least 1")]
    InvalidWindow(usize),

    /// The indicator has no defined value for this series
    #[error("Indeterminate {0}: the series has no price movement")]
    Indeterminate(&'static str),

    /// The model designated a function that is not registered
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The function-call payload is not valid for the function's schema
    #[error("Malformed arguments for {function}: {reason}")]
    MalformedArguments { function: String, reason: String },

    /// Opaque model-provider failure
    #[error("Model error: {0}")]
    Model(#[from] LLMError),

    /// Chart rendering error
    #[error("Chart error: {0}")]
    Chart(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognized REPL command
    #[error("Command error: {0}")]
    Command(String),
}

impl ChatError {
    /// Shorthand for a [`ChatError::MalformedArguments`]
    pub fn malformed(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedArguments {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;
