//! Stock technical-analysis chat driven by LLM function calling
//!
//! A user question goes to a function-calling model together with a fixed
//! table of stock functions. When the model designates one, it runs locally
//! against a year of daily closes and the result goes back to the model for
//! a plain-language summary. The crate provides:
//!
//! - Indicator math (SMA, EMA, RSI, MACD) and SVG price charts
//! - A Yahoo Finance market-data client behind [`api::MarketDataProvider`]
//! - The function registry with schema validation of model arguments
//! - The dispatch loop and the append-only conversation [`bot::Session`]
//! - Configuration and terminal formatting for the `finchat` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use finchat::{ChatConfig, Dispatcher, IndicatorEngine, Session, YahooFinanceClient};
//! use finchat_llm::providers::OpenAIProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChatConfig::from_env();
//!     let provider = Arc::new(OpenAIProvider::from_env()?);
//!     let engine = IndicatorEngine::new(Arc::new(YahooFinanceClient::new()), &config.chart_path);
//!     let dispatcher = Dispatcher::new(provider, engine, &config);
//!
//!     let mut session = Session::new();
//!     let outcome = dispatcher.handle_turn(&mut session, "What is the RSI of AAPL?").await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod tools;

// Re-export main types for convenience
pub use api::{MarketDataProvider, PricePoint, PriceSeries, YahooFinanceClient};
pub use bot::{Command, Dispatcher, Session, TurnOutcome, TurnState};
pub use config::ChatConfig;
pub use engine::{ChartArtifact, IndicatorEngine, Macd};
pub use error::{ChatError, Result};
pub use interface::CliFormatter;
pub use tools::{FunctionKind, FunctionOutput, FunctionRegistry, StockFunction};
