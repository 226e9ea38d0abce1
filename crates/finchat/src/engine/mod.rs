//! Indicator engine
//!
//! Pure indicator math in [`indicators`], chart rendering in [`chart`] and the
//! provider-backed [`IndicatorEngine`] that ties them to live close series.

pub mod chart;
pub mod indicator_engine;
pub mod indicators;

pub use chart::ChartArtifact;
pub use indicator_engine::{DEFAULT_HISTORY_DAYS, IndicatorEngine};
pub use indicators::Macd;
