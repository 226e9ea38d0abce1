//! Yahoo Finance API client

use crate::api::market::{MarketDataProvider, PricePoint, PriceSeries};
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get daily closes between `start` and `end`
    pub async fn get_historical_closes(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| classify_error(ticker, &e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| unavailable(ticker, format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| unavailable(ticker, format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| classify_error(ticker, &e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| classify_error(ticker, &e.to_string()))?;

        let points = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PricePoint {
                    date,
                    close: q.close,
                })
            })
            .collect();

        PriceSeries::new(ticker, points).ok_or_else(|| ChatError::UnknownTicker(ticker.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn daily_closes(&self, ticker: &str, days: u32) -> Result<PriceSeries> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(days));

        debug!(ticker, days, "Fetching daily closes from Yahoo Finance");
        let series = self.get_historical_closes(ticker, start, end).await;
        if let Err(e) = &series {
            warn!(ticker, error = %e, "Yahoo Finance fetch failed");
        }
        series
    }
}

fn unavailable(ticker: &str, reason: impl Into<String>) -> ChatError {
    ChatError::DataUnavailable {
        ticker: ticker.to_string(),
        reason: reason.into(),
    }
}

/// Sort a provider failure into unknown-symbol versus anything else
///
/// Yahoo answers an unknown symbol with a 404 or an empty result set; the
/// client surfaces both only as error text.
fn classify_error(ticker: &str, message: &str) -> ChatError {
    let lower = message.to_lowercase();
    let unknown = ["404", "not found", "no data", "delisted", "no quotes", "empty data"]
        .iter()
        .any(|needle| lower.contains(needle));

    if unknown {
        ChatError::UnknownTicker(ticker.to_string())
    } else {
        unavailable(ticker, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unknown_symbol() {
        let err = classify_error("ZZZZ", "fetching the data from yahoo! finance failed: 404 Not Found");
        assert!(matches!(err, ChatError::UnknownTicker(t) if t == "ZZZZ"));

        let err = classify_error("ZZZZ", "No data found, symbol may be delisted");
        assert!(matches!(err, ChatError::UnknownTicker(_)));
    }

    #[test]
    fn test_classify_other_failures() {
        let err = classify_error("AAPL", "connection to the API failed: timed out");
        assert!(matches!(err, ChatError::DataUnavailable { ticker, .. } if ticker == "AAPL"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_closes() {
        let client = YahooFinanceClient::new();
        let series = client.daily_closes("AAPL", 365).await.unwrap();

        assert_eq!(series.ticker(), "AAPL");
        assert!(series.len() > 200);
        assert!(series.last().close > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_ticker() {
        let client = YahooFinanceClient::new();
        let result = client.daily_closes("INVALID_SYMBOL_12345", 365).await;
        assert!(matches!(result, Err(ChatError::UnknownTicker(_))));
    }
}
