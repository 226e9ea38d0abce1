//! LLM provider abstraction layer for finchat
//!
//! This crate provides provider-agnostic abstractions for talking to a
//! function-calling language model. It includes:
//!
//! - Message types, including function-call designations and function results
//! - Completion request/response types
//! - Function definitions advertised to the model
//! - Provider trait for LLM implementations
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod functions;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use functions::{FunctionCallMode, FunctionSpec};
pub use messages::{FunctionCall, Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
