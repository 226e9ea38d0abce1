//! Message types for LLM communication
//!
//! This module defines the conversation messages exchanged with a
//! function-calling model. An assistant message may carry a
//! [`FunctionCall`] instead of text; the caller answers it with a
//! [`Role::Function`] message keyed by the function name.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (carried on the request, not stored in history)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Result of a function invocation
    Function,
}

/// Structured function invocation designated by the model
///
/// `arguments` is kept exactly as the model produced it. It is expected to be a
/// JSON object but nothing at this layer guarantees that; parsing and
/// validation belong to whoever executes the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to invoke
    pub name: String,
    /// Raw argument payload
    pub arguments: String,
}

impl FunctionCall {
    /// Create a new function call designation
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Function name, set on [`Role::Function`] messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Function call requested by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Message {
    fn with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(text.into()),
            name: None,
            function_call: None,
        }
    }

    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, text)
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, text)
    }

    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_role(Role::System, text)
    }

    /// Create an assistant message designating a function call
    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            name: None,
            function_call: Some(call),
        }
    }

    /// Create a function result message keyed by the function name
    pub fn function_result(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: Some(result.into()),
            name: Some(name.into()),
            function_call: None,
        }
    }

    /// Text content of the message, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Check if this message designates a function call
    pub fn has_function_call(&self) -> bool {
        self.function_call.is_some()
    }
}
