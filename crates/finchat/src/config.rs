//! Configuration for the chat front-end

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";
/// OpenAI-compatible endpoint used when none is configured
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Chat model name
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// File holding the API key
    pub api_key_path: PathBuf,

    /// Where price charts are written (overwritten on every chart)
    pub chart_path: PathBuf,

    /// Trailing days of closes fetched per indicator
    pub history_days: u32,

    /// Maximum tokens per model reply
    pub max_tokens: usize,

    /// Sampling temperature (provider default when unset)
    pub temperature: Option<f32>,

    /// Optional system prompt sent with every request
    pub system_prompt: Option<String>,

    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key_path: PathBuf::from("API_KEY"),
            chart_path: PathBuf::from("stock.svg"),
            history_days: 365,
            max_tokens: 1024,
            temperature: None,
            system_prompt: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ChatConfig {
    /// Create a new configuration builder
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }

    /// Defaults overridden by `FINCHAT_MODEL`, `OPENAI_API_BASE`,
    /// `FINCHAT_API_KEY_PATH` and `FINCHAT_CHART_PATH`
    pub fn from_env() -> Self {
        Self::builder().with_env().build_unchecked()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ChatError::Config("model must not be empty".to_string()));
        }

        if self.history_days == 0 {
            return Err(ChatError::Config(
                "history_days must be greater than 0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ChatError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ChatConfig
#[derive(Debug, Default)]
pub struct ChatConfigBuilder {
    model: Option<String>,
    api_base: Option<String>,
    api_key_path: Option<PathBuf>,
    chart_path: Option<PathBuf>,
    history_days: Option<u32>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
    request_timeout: Option<Duration>,
}

impl ChatConfigBuilder {
    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the API key file
    pub fn api_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.api_key_path = Some(path.into());
        self
    }

    /// Set the chart output path
    pub fn chart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_path = Some(path.into());
        self
    }

    pub fn history_days(mut self, days: u32) -> Self {
        self.history_days = Some(days);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if self.model.is_none() {
            self.model = var("FINCHAT_MODEL");
        }
        if self.api_base.is_none() {
            self.api_base = var("OPENAI_API_BASE");
        }
        if self.api_key_path.is_none() {
            self.api_key_path = var("FINCHAT_API_KEY_PATH").map(PathBuf::from);
        }
        if self.chart_path.is_none() {
            self.chart_path = var("FINCHAT_CHART_PATH").map(PathBuf::from);
        }
        self
    }

    fn build_unchecked(self) -> ChatConfig {
        let defaults = ChatConfig::default();
        ChatConfig {
            model: self.model.unwrap_or(defaults.model),
            api_base: self.api_base.unwrap_or(defaults.api_base),
            api_key_path: self.api_key_path.unwrap_or(defaults.api_key_path),
            chart_path: self.chart_path.unwrap_or(defaults.chart_path),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            system_prompt: self.system_prompt.or(defaults.system_prompt),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        }
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ChatConfig> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.model, "gpt-3.5-turbo-0613");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.api_key_path, PathBuf::from("API_KEY"));
        assert_eq!(config.chart_path, PathBuf::from("stock.svg"));
        assert_eq!(config.history_days, 365);
        assert_eq!(config.max_tokens, 1024);
        assert!(config.temperature.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ChatConfig::builder()
            .model("gpt-4-0613")
            .chart_path("/tmp/chart.svg")
            .history_days(180)
            .temperature(0.2)
            .system_prompt("You are a financial assistant.")
            .request_timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.model, "gpt-4-0613");
        assert_eq!(config.chart_path, PathBuf::from("/tmp/chart.svg"));
        assert_eq!(config.history_days, 180);
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            ChatConfig::builder().model("  ").build(),
            Err(ChatError::Config(_))
        ));
        assert!(matches!(
            ChatConfig::builder().history_days(0).build(),
            Err(ChatError::Config(_))
        ));
        assert!(matches!(
            ChatConfig::builder().max_tokens(0).build(),
            Err(ChatError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        // SAFETY: only this test touches FINCHAT_CHART_PATH
        unsafe {
            std::env::set_var("FINCHAT_CHART_PATH", "/tmp/from-env.svg");
        }
        let explicit = ChatConfig::builder()
            .chart_path("explicit.svg")
            .with_env()
            .build()
            .unwrap();
        let from_env = ChatConfig::builder().with_env().build().unwrap();
        unsafe {
            std::env::remove_var("FINCHAT_CHART_PATH");
        }

        assert_eq!(explicit.chart_path, PathBuf::from("explicit.svg"));
        assert_eq!(from_env.chart_path, PathBuf::from("/tmp/from-env.svg"));
    }
}
