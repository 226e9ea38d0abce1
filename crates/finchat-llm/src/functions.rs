//! Function definitions for LLM function calling

use serde::{Deserialize, Serialize};

/// Function definition advertised to the model
///
/// Describes a callable the model may designate, including its name,
/// description and parameter declaration in JSON Schema format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Function name (must match the name the caller dispatches on)
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// JSON schema for the function's parameters
    pub parameters: serde_json::Value,
}

impl FunctionSpec {
    /// Create a new function spec
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// How the model may choose among the advertised functions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FunctionCallMode {
    /// Model decides whether to call a function
    #[default]
    Auto,
    /// Model must answer with text
    None,
    /// Model must call the named function
    Named(String),
}

/// Helper module to build JSON schemas for function parameters
pub mod schema {
    use serde_json::{Value, json};

    /// Create a JSON schema for an object with properties
    ///
    /// # Example
    ///
    /// ```
    /// use finchat_llm::functions::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "ticker": schema::string("Stock ticker symbol"),
    ///         "window": schema::positive_integer("Window length"),
    ///     }),
    ///     &["ticker"],
    /// );
    /// assert_eq!(schema["required"][0], "ticker");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// String property schema
    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    /// Integer property schema with a lower bound of 1
    pub fn positive_integer(description: &str) -> Value {
        json!({
            "type": "integer",
            "description": description,
            "minimum": 1,
        })
    }
}
