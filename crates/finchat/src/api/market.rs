//! Market data contract shared by the indicator engine and data clients

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronologically ascending daily closes for one ticker
///
/// Never empty: providers report an empty answer as an unknown ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

#[derive(Deserialize)]
struct RawPriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = String;

    fn try_from(raw: RawPriceSeries) -> std::result::Result<Self, Self::Error> {
        let ticker = raw.ticker;
        Self::new(ticker.clone(), raw.points)
            .ok_or_else(|| format!("empty price series for {ticker}"))
    }
}

impl PriceSeries {
    /// Build a series, sorting the points by date
    ///
    /// Returns `None` when `points` is empty.
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort_by_key(|p| p.date);
        Some(Self {
            ticker: ticker.into(),
            points,
        })
    }

    /// Build a series of consecutive calendar days ending on `last`
    ///
    /// Handy for fixtures; real providers skip weekends and holidays.
    pub fn from_closes(ticker: impl Into<String>, last: NaiveDate, closes: &[f64]) -> Option<Self> {
        let n = closes.len();
        let points = closes
            .iter()
            .enumerate()
            .filter_map(|(i, &close)| {
                let back = u64::try_from(n - 1 - i).ok()?;
                let date = last.checked_sub_days(chrono::Days::new(back))?;
                Some(PricePoint { date, close })
            })
            .collect();
        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Most recent point
    pub fn last(&self) -> PricePoint {
        // Non-empty by construction
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Source of daily closing prices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the trailing `days` of daily closes for `ticker`
    ///
    /// Fails with `UnknownTicker` when the symbol does not exist and with
    /// `DataUnavailable` for any other provider failure.
    async fn daily_closes(&self, ticker: &str, days: u32) -> Result<PriceSeries>;
}
