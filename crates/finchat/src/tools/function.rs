//! Callable stock functions exposed to the model

use crate::engine::{ChartArtifact, IndicatorEngine};
use crate::error::{ChatError, Result};
use finchat_llm::{FunctionSpec, functions::schema};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const TICKER_PRICE_DESCRIPTION: &str =
    "The stock ticker symbol for a company (for example AAPL for Apple)";
const TICKER_DESCRIPTION: &str = "The stock ticker symbol for a company (e.g., AAPL for Apple)";

/// Identity of a registered function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    StockPrice,
    Sma,
    Ema,
    Rsi,
    Macd,
    PlotPrice,
}

impl FunctionKind {
    /// Every registered function, in advertised order
    pub const ALL: [FunctionKind; 6] = [
        Self::StockPrice,
        Self::Sma,
        Self::Ema,
        Self::Rsi,
        Self::Macd,
        Self::PlotPrice,
    ];

    /// Name the model designates the function by
    pub fn name(self) -> &'static str {
        match self {
            Self::StockPrice => "get_stock_price",
            Self::Sma => "calculate_SMA",
            Self::Ema => "calculate_EMA",
            Self::Rsi => "calculate_RSI",
            Self::Macd => "calculate_MACD",
            Self::PlotPrice => "plot_stock_price",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::StockPrice => "Gets the latest stock price given the ticker symbol of a company",
            Self::Sma => {
                "Calculate the simple moving average for a given stock ticker and a window."
            }
            Self::Ema => {
                "Calculate the exponential moving average for a given stock ticker and a window."
            }
            Self::Rsi => "Calculate the RSI for a given stock ticker.",
            Self::Macd => "Calculate the MACD for a given stock ticker.",
            Self::PlotPrice => {
                "Plot the stock price for the last year given the ticker symbol of a company."
            }
        }
    }

    /// JSON schema of the function's arguments
    pub fn parameters(self) -> Value {
        match self {
            Self::StockPrice => schema::object(
                json!({ "ticker": schema::string(TICKER_PRICE_DESCRIPTION) }),
                &["ticker"],
            ),
            Self::Sma | Self::Ema => {
                let label = if self == Self::Sma { "SMA" } else { "EMA" };
                schema::object(
                    json!({
                        "ticker": schema::string(TICKER_DESCRIPTION),
                        "window": schema::positive_integer(&format!(
                            "The timeframe to consider when calculating the {label}"
                        )),
                    }),
                    &["ticker", "window"],
                )
            }
            Self::Rsi | Self::Macd | Self::PlotPrice => schema::object(
                json!({ "ticker": schema::string(TICKER_DESCRIPTION) }),
                &["ticker"],
            ),
        }
    }

    pub fn spec(self) -> FunctionSpec {
        FunctionSpec::new(self.name(), self.description(), self.parameters())
    }

    /// Whether the function produces an artifact instead of text
    pub fn is_chart(self) -> bool {
        self == Self::PlotPrice
    }
}

/// Arguments of the ticker-only functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerArgs {
    pub ticker: String,
}

/// Arguments of the windowed averages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowArgs {
    pub ticker: String,
    pub window: usize,
}

/// A resolved function call with typed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockFunction {
    StockPrice(TickerArgs),
    Sma(WindowArgs),
    Ema(WindowArgs),
    Rsi(TickerArgs),
    Macd(TickerArgs),
    PlotPrice(TickerArgs),
}

/// What invoking a function produced
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOutput {
    /// Result text to hand back to the model
    Text(String),
    /// Chart surfaced directly to the user
    Chart(ChartArtifact),
}

impl StockFunction {
    /// Extract typed arguments for `kind` from an already validated object
    pub fn from_arguments(kind: FunctionKind, args: Value) -> Result<Self> {
        let function = match kind {
            FunctionKind::StockPrice => Self::StockPrice(extract(kind, args)?),
            FunctionKind::Sma => Self::Sma(extract(kind, args)?),
            FunctionKind::Ema => Self::Ema(extract(kind, args)?),
            FunctionKind::Rsi => Self::Rsi(extract(kind, args)?),
            FunctionKind::Macd => Self::Macd(extract(kind, args)?),
            FunctionKind::PlotPrice => Self::PlotPrice(extract(kind, args)?),
        };
        Ok(function)
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::StockPrice(_) => FunctionKind::StockPrice,
            Self::Sma(_) => FunctionKind::Sma,
            Self::Ema(_) => FunctionKind::Ema,
            Self::Rsi(_) => FunctionKind::Rsi,
            Self::Macd(_) => FunctionKind::Macd,
            Self::PlotPrice(_) => FunctionKind::PlotPrice,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn ticker(&self) -> &str {
        match self {
            Self::StockPrice(a) | Self::Rsi(a) | Self::Macd(a) | Self::PlotPrice(a) => &a.ticker,
            Self::Sma(a) | Self::Ema(a) => &a.ticker,
        }
    }

    /// Run the function against `engine`
    pub async fn invoke(&self, engine: &IndicatorEngine) -> Result<FunctionOutput> {
        let text = match self {
            Self::StockPrice(a) => engine.price(&a.ticker).await?.to_string(),
            Self::Sma(a) => engine.sma(&a.ticker, a.window).await?.to_string(),
            Self::Ema(a) => engine.ema(&a.ticker, a.window).await?.to_string(),
            Self::Rsi(a) => engine.rsi(&a.ticker).await?.to_string(),
            Self::Macd(a) => {
                let macd = engine.macd(&a.ticker).await?;
                format!("{}, {}", macd.line, macd.histogram)
            }
            Self::PlotPrice(a) => {
                return Ok(FunctionOutput::Chart(
                    engine.render_price_chart(&a.ticker).await?,
                ));
            }
        };
        Ok(FunctionOutput::Text(text))
    }
}

fn extract<T: serde::de::DeserializeOwned>(kind: FunctionKind, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| ChatError::malformed(kind.name(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in FunctionKind::ALL {
            assert_eq!(FunctionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FunctionKind::from_name("calculate_sma"), None);
    }

    #[test]
    fn test_window_functions_require_window() {
        for kind in [FunctionKind::Sma, FunctionKind::Ema] {
            let params = kind.parameters();
            assert_eq!(params["required"], json!(["ticker", "window"]));
            assert_eq!(params["properties"]["window"]["minimum"], 1);
        }
        assert_eq!(
            FunctionKind::Ema.parameters()["properties"]["window"]["description"],
            "The timeframe to consider when calculating the EMA"
        );
    }

    #[test]
    fn test_ticker_functions_ignore_window() {
        let function =
            StockFunction::from_arguments(FunctionKind::Rsi, json!({"ticker": "AAPL", "window": 9}))
                .unwrap();
        assert_eq!(
            function,
            StockFunction::Rsi(TickerArgs {
                ticker: "AAPL".to_string()
            })
        );
        assert_eq!(function.name(), "calculate_RSI");
        assert_eq!(function.ticker(), "AAPL");
    }

    #[test]
    fn test_window_extracted() {
        let function =
            StockFunction::from_arguments(FunctionKind::Sma, json!({"ticker": "MSFT", "window": 50}))
                .unwrap();
        assert_eq!(
            function,
            StockFunction::Sma(WindowArgs {
                ticker: "MSFT".to_string(),
                window: 50
            })
        );
        assert_eq!(function.kind(), FunctionKind::Sma);
    }

    #[test]
    fn test_missing_window_is_malformed() {
        let err = StockFunction::from_arguments(FunctionKind::Ema, json!({"ticker": "MSFT"}))
            .unwrap_err();
        assert!(matches!(err, ChatError::MalformedArguments { function, .. } if function == "calculate_EMA"));
    }

    #[test]
    fn test_only_plot_is_chart() {
        let charts: Vec<_> = FunctionKind::ALL.into_iter().filter(|k| k.is_chart()).collect();
        assert_eq!(charts, vec![FunctionKind::PlotPrice]);
    }
}
