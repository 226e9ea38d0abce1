//! Indicator engine: fetches a ticker's trailing closes and computes on them

use super::chart::{self, ChartArtifact};
use super::indicators::{self, Macd, RSI_PERIOD};
use crate::api::{MarketDataProvider, PriceSeries};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Trailing window fetched for every indicator
pub const DEFAULT_HISTORY_DAYS: u32 = 365;

/// Computes indicators over the trailing daily closes of a ticker
pub struct IndicatorEngine {
    provider: Arc<dyn MarketDataProvider>,
    history_days: u32,
    chart_path: PathBuf,
}

impl IndicatorEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>, chart_path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            history_days: DEFAULT_HISTORY_DAYS,
            chart_path: chart_path.into(),
        }
    }

    /// Override the length of the fetched history
    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    async fn series(&self, ticker: &str) -> Result<PriceSeries> {
        let symbol = ticker.trim().to_uppercase();
        let series = self
            .provider
            .daily_closes(&symbol, self.history_days)
            .await?;
        debug!(ticker = %symbol, closes = series.len(), "Fetched close series");
        Ok(series)
    }

    /// Most recent close
    pub async fn price(&self, ticker: &str) -> Result<f64> {
        Ok(self.series(ticker).await?.last().close)
    }

    pub async fn sma(&self, ticker: &str, window: usize) -> Result<f64> {
        indicators::sma(&self.series(ticker).await?.closes(), window)
    }

    pub async fn ema(&self, ticker: &str, window: usize) -> Result<f64> {
        indicators::ema(&self.series(ticker).await?.closes(), window)
    }

    pub async fn rsi(&self, ticker: &str) -> Result<f64> {
        indicators::rsi(&self.series(ticker).await?.closes(), RSI_PERIOD)
    }

    pub async fn macd(&self, ticker: &str) -> Result<Macd> {
        indicators::macd(&self.series(ticker).await?.closes())
    }

    /// Plot the close series to the configured chart path
    pub async fn render_price_chart(&self, ticker: &str) -> Result<ChartArtifact> {
        let series = self.series(ticker).await?;
        chart::render_price_chart(&series, &self.chart_path)
    }
}
