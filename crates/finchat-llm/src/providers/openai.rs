//! OpenAI provider implementation
//!
//! This module implements the LLMProvider trait for OpenAI's chat completions
//! endpoint using the function-calling wire format (`functions`,
//! `function_call`, and `function` role messages).
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Examples
//!
//! ```no_run
//! use finchat_llm::{CompletionRequest, LLMProvider, Message};
//! use finchat_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OpenAIConfig::new("sk-...").with_timeout(60);
//!     let provider = OpenAIProvider::with_config(config)?;
//!
//!     let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! OpenAI-compatible servers (llama.cpp, vLLM, LM Studio) work by pointing
//! `api_base` at them:
//!
//! ```no_run
//! use finchat_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let local_config = OpenAIConfig::new("not-needed")
//!     .with_api_base("http://localhost:1234/v1");
//! let provider = OpenAIProvider::with_config(local_config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, FunctionCall, FunctionCallMode, FunctionSpec,
    LLMProvider, Message, Result, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Optional list of supported models
    /// If None, any model string is accepted
    pub supported_models: Option<Vec<String>>,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `OPENAI_API_KEY` and, if set, the base URL from
    /// `OPENAI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            crate::LLMError::Configuration(
                "OPENAI_API_KEY environment variable not set".to_string(),
            )
        })?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Ok(Self::new(api_key).with_api_base(api_base))
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set supported models list
    ///
    /// When set, the provider validates model names against this list.
    pub fn with_supported_models(mut self, models: Vec<String>) -> Self {
        self.supported_models = Some(models);
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            supported_models: None,
        }
    }
}

/// OpenAI provider
///
/// Works with any model that supports function calling, and with
/// OpenAI-compatible APIs through custom configuration.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new OpenAI provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Validate model name against supported models list (if configured)
    fn validate_model(&self, model: &str) -> Result<()> {
        if let Some(supported) = &self.config.supported_models {
            if !supported.iter().any(|m| m == model) {
                return Err(crate::LLMError::InvalidRequest(format!(
                    "Model '{model}' is not in the supported models list: {supported:?}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(
            messages = request.messages.len(),
            functions = request.functions.as_ref().map_or(0, Vec::len),
            "Sending request to OpenAI API"
        );

        self.validate_model(&request.model)?;

        let model = request.model.clone();
        let openai_request = build_openai_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(crate::LLMError::from_status(status.as_u16(), error_text, &model));
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            crate::LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        parse_openai_response(openai_response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<OpenAIFunction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<OpenAIFunctionCallChoice>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<OpenAIFunctionCall>,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
enum OpenAIFunctionCallChoice {
    Mode(&'static str),
    Named { name: String },
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<OpenAIFunctionCall>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIResponseToolCall>>,
}

/// Some compatible servers answer a `functions` request in the newer
/// `tool_calls` shape
#[derive(Debug, Deserialize)]
struct OpenAIResponseToolCall {
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

fn build_openai_request(request: CompletionRequest) -> OpenAIRequest {
    let has_functions = request.has_functions();

    OpenAIRequest {
        model: request.model,
        messages: build_openai_messages(request.system, request.messages),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        functions: request
            .functions
            .filter(|_| has_functions)
            .map(|functions| convert_functions(&functions)),
        function_call: request
            .function_call
            .filter(|_| has_functions)
            .map(convert_function_call_mode),
    }
}

/// Build OpenAI messages from our generic format
///
/// The system prompt goes first in the messages array.
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    let mut result = Vec::with_capacity(messages.len() + 1);

    if let Some(sys) = system {
        result.push(convert_message(Message::system(sys)));
    }

    result.extend(messages.into_iter().map(convert_message));
    result
}

fn convert_message(msg: Message) -> OpenAIMessage {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Function => "function",
    };

    // Function results must carry a string body even when empty
    let content = match (msg.role, msg.content) {
        (Role::Function, None) => Some(String::new()),
        (_, content) => content,
    };

    OpenAIMessage {
        role,
        content,
        name: msg.name,
        function_call: msg.function_call.map(|call| OpenAIFunctionCall {
            name: call.name,
            arguments: call.arguments,
        }),
    }
}

fn convert_functions(functions: &[FunctionSpec]) -> Vec<OpenAIFunction> {
    functions
        .iter()
        .map(|f| OpenAIFunction {
            name: f.name.clone(),
            description: f.description.clone(),
            parameters: f.parameters.clone(),
        })
        .collect()
}

fn convert_function_call_mode(mode: FunctionCallMode) -> OpenAIFunctionCallChoice {
    match mode {
        FunctionCallMode::Auto => OpenAIFunctionCallChoice::Mode("auto"),
        FunctionCallMode::None => OpenAIFunctionCallChoice::Mode("none"),
        FunctionCallMode::Named(name) => OpenAIFunctionCallChoice::Named { name },
    }
}

fn parse_openai_response(response: OpenAIResponse) -> Result<CompletionResponse> {
    let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    // OpenAI can return multiple choices but we use the first
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        crate::LLMError::UnexpectedResponse("No choices in response".to_string())
    })?;

    let finish_reason = choice.finish_reason.unwrap_or_default();
    debug!(
        finish_reason = %finish_reason,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "Received response"
    );

    let OpenAIResponseMessage {
        content,
        function_call,
        tool_calls,
    } = choice.message;

    let function_call = function_call.or_else(|| {
        tool_calls
            .and_then(|calls| calls.into_iter().next())
            .map(|call| call.function)
    });

    let message = match function_call {
        // Text sent alongside a call stays on the message
        Some(call) => Message {
            content,
            ..Message::function_call(FunctionCall::new(call.name, call.arguments))
        },
        None => Message::assistant(content.unwrap_or_default()),
    };

    let stop_reason = if message.has_function_call() {
        StopReason::FunctionCall
    } else {
        map_stop_reason(&finish_reason)
    };

    Ok(CompletionResponse {
        message,
        stop_reason,
        usage,
    })
}

/// Map OpenAI finish reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "function_call" | "tool_calls" => StopReason::FunctionCall,
        "content_filter" => StopReason::ContentFilter,
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(json: serde_json::Value) -> CompletionResponse {
        let raw: OpenAIResponse = serde_json::from_value(json).unwrap();
        parse_openai_response(raw).unwrap()
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.config().api_key, "test-key");
        assert_eq!(provider.config().api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_provider_with_custom_config() {
        let config = OpenAIConfig::new("test-key")
            .with_api_base("http://localhost:1234/v1/")
            .with_timeout(60);

        let provider = OpenAIProvider::with_config(config).unwrap();
        assert_eq!(provider.config().api_base, "http://localhost:1234/v1");
        assert_eq!(provider.config().timeout_secs, 60);
    }

    #[test]
    fn test_model_validation() {
        let config = OpenAIConfig::new("test-key")
            .with_supported_models(vec!["gpt-3.5-turbo-0613".to_string()]);
        let provider = OpenAIProvider::with_config(config).unwrap();

        assert!(provider.validate_model("gpt-3.5-turbo-0613").is_ok());
        assert!(matches!(
            provider.validate_model("invalid-model"),
            Err(crate::LLMError::InvalidRequest(_))
        ));

        let open = OpenAIProvider::new("test-key").unwrap();
        assert!(open.validate_model("any-model").is_ok());
    }

    #[test]
    fn test_function_result_conversion() {
        let msg = convert_message(Message::function_result("calculate_RSI", "61.5"));
        assert_eq!(msg.role, "function");
        assert_eq!(msg.name.as_deref(), Some("calculate_RSI"));
        assert_eq!(msg.content.as_deref(), Some("61.5"));
    }

    #[test]
    fn test_function_call_message_serialization() {
        let msg = convert_message(Message::function_call(FunctionCall::new(
            "calculate_SMA",
            r#"{"ticker":"MSFT","window":20}"#,
        )));
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        assert!(json["content"].is_null());
        assert_eq!(json["function_call"]["name"], "calculate_SMA");
        assert_eq!(json["function_call"]["arguments"], r#"{"ticker":"MSFT","window":20}"#);
    }

    #[test]
    fn test_system_message_goes_first() {
        let messages = build_openai_messages(
            Some("You are helpful".to_string()),
            vec![Message::user("hi")],
        );

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content.as_deref(), Some("You are helpful"));
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_request_with_functions() {
        let spec = FunctionSpec::new("get_stock_price", "price", json!({"type": "object"}));
        let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
            .add_message(Message::user("price of AAPL?"))
            .functions(vec![spec], FunctionCallMode::Auto)
            .build();

        let json = serde_json::to_value(build_openai_request(request)).unwrap();
        assert_eq!(json["functions"][0]["name"], "get_stock_price");
        assert_eq!(json["function_call"], "auto");
    }

    #[test]
    fn test_request_without_functions_omits_mode() {
        let request = CompletionRequest::builder("gpt-3.5-turbo-0613")
            .add_message(Message::user("summarize"))
            .build();

        let json = serde_json::to_value(build_openai_request(request)).unwrap();
        assert!(json.get("functions").is_none());
        assert!(json.get("function_call").is_none());
    }

    #[test]
    fn test_named_function_call_mode() {
        let choice = convert_function_call_mode(FunctionCallMode::Named("calculate_MACD".into()));
        assert_eq!(serde_json::to_value(choice).unwrap(), json!({"name": "calculate_MACD"}));
    }

    #[test]
    fn test_parse_text_response() {
        let response = response_from(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3}
        }));

        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.message.text(), Some("Hello there"));
        assert_eq!(response.usage.total(), 13);
    }

    #[test]
    fn test_parse_function_call_response() {
        let response = response_from(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": {"name": "calculate_RSI", "arguments": "{\"ticker\": \"AAPL\"}"}
                },
                "finish_reason": "function_call"
            }],
            "usage": {"prompt_tokens": 80, "completion_tokens": 12}
        }));

        assert_eq!(response.stop_reason, StopReason::FunctionCall);
        let call = response.message.function_call.unwrap();
        assert_eq!(call.name, "calculate_RSI");
        assert_eq!(call.arguments, "{\"ticker\": \"AAPL\"}");
    }

    #[test]
    fn test_function_call_keeps_accompanying_text() {
        let response = response_from(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "Let me look up the RSI for AAPL.",
                    "function_call": {"name": "calculate_RSI", "arguments": "{\"ticker\": \"AAPL\"}"}
                },
                "finish_reason": "function_call"
            }]
        }));

        assert_eq!(response.stop_reason, StopReason::FunctionCall);
        assert_eq!(response.message.text(), Some("Let me look up the RSI for AAPL."));
        assert_eq!(response.message.function_call.unwrap().name, "calculate_RSI");
    }

    #[test]
    fn test_parse_tool_calls_shape() {
        let response = response_from(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_stock_price", "arguments": "{\"ticker\":\"TSLA\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }));

        assert_eq!(response.stop_reason, StopReason::FunctionCall);
        assert_eq!(response.message.function_call.unwrap().name, "get_stock_price");
        assert_eq!(response.usage.total(), 0);
    }

    #[test]
    fn test_malformed_arguments_are_passed_through() {
        let response = response_from(json!({
            "choices": [{
                "message": {"function_call": {"name": "calculate_RSI", "arguments": "{not json"}},
                "finish_reason": "function_call"
            }]
        }));

        assert_eq!(response.message.function_call.unwrap().arguments, "{not json");
    }

    #[test]
    fn test_empty_choices() {
        let raw: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_openai_response(raw),
            Err(crate::LLMError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(map_stop_reason("stop"), StopReason::EndTurn);
        assert_eq!(map_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(map_stop_reason("function_call"), StopReason::FunctionCall);
        assert_eq!(map_stop_reason("content_filter"), StopReason::ContentFilter);
        assert_eq!(map_stop_reason("unknown"), StopReason::EndTurn);
    }

    #[test]
    fn test_config_from_env() {
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "test-key-from-env");
            std::env::set_var("OPENAI_API_BASE", "https://custom.openai.com/v1");
        }

        let config = OpenAIConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-key-from-env");
        assert_eq!(config.api_base, "https://custom.openai.com/v1");

        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
            std::env::remove_var("OPENAI_API_BASE");
        }
    }
}
