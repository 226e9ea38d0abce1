//! Market data contract and clients

pub mod market;
pub mod yahoo;

pub use market::{MarketDataProvider, PricePoint, PriceSeries};
pub use yahoo::YahooFinanceClient;

#[cfg(test)]
pub use market::MockMarketDataProvider;
