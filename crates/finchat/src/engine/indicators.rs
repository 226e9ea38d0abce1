//! Technical indicators over a series of closing prices
//!
//! Every moving average here is the unadjusted exponential recurrence
//! `EMA₀ = x₀`, `EMAₜ = α·xₜ + (1 − α)·EMAₜ₋₁` with `α = 2 / (span + 1)`,
//! which is exactly what `ta`'s `ExponentialMovingAverage` computes.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use ta::{Next, indicators::ExponentialMovingAverage};

/// Look-back of the relative strength index
pub const RSI_PERIOD: usize = 14;
/// Fast EMA span of the MACD line
pub const MACD_FAST: usize = 12;
/// Slow EMA span of the MACD line
pub const MACD_SLOW: usize = 26;
/// EMA span of the MACD signal line
pub const MACD_SIGNAL: usize = 9;

/// Latest MACD values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    /// EMA₁₂ − EMA₂₆
    pub line: f64,
    /// EMA₉ of the MACD line
    pub signal: f64,
    /// `line − signal`
    pub histogram: f64,
}

fn require(indicator: &'static str, required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(ChatError::InsufficientData {
            indicator,
            required,
            available,
        });
    }
    Ok(())
}

/// Mean of the last `window` closes
pub fn sma(closes: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(ChatError::InvalidWindow(window));
    }
    require("SMA", window, closes.len())?;

    let tail = &closes[closes.len() - window..];
    Ok(tail.iter().sum::<f64>() / window as f64)
}

/// Running EMA with the given span, one output per input
pub fn ema_series(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span).map_err(|_| ChatError::InvalidWindow(span))?;
    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// Final EMA value over `closes` with span `window`
pub fn ema(closes: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(ChatError::InvalidWindow(window));
    }
    require("EMA", window, closes.len())?;

    let series = ema_series(closes, window)?;
    Ok(series[series.len() - 1])
}

/// Relative strength index over `period`
///
/// Gains and losses are smoothed with centre of mass `period − 1`
/// (α = 1/period), i.e. span `2·(period − 1) + 1`. A series with gains but
/// no losses scores 100; a series with no movement at all has no defined
/// value.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(ChatError::InvalidWindow(period));
    }
    require("RSI", 2, closes.len())?;

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let span = 2 * (period - 1) + 1;
    let avg_gain = last(&ema_series(&gains, span)?);
    let avg_loss = last(&ema_series(&losses, span)?);

    if avg_loss == 0.0 {
        return if avg_gain > 0.0 {
            Ok(100.0)
        } else {
            Err(ChatError::Indeterminate("RSI"))
        };
    }

    let rs = avg_gain / avg_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal and histogram at the latest close
///
/// Needs at least `MACD_SLOW` closes and fails with `InsufficientData`
/// below that, although the EMA recurrence alone yields a value from a
/// single close. Shorter series only occur with a very small `history_days`.
pub fn macd(closes: &[f64]) -> Result<Macd> {
    require("MACD", MACD_SLOW, closes.len())?;

    let fast = ema_series(closes, MACD_FAST)?;
    let slow = ema_series(closes, MACD_SLOW)?;
    let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_line = ema_series(&macd_line, MACD_SIGNAL)?;

    let line = last(&macd_line);
    let signal = last(&signal_line);
    Ok(Macd {
        line,
        signal,
        histogram: line - signal,
    })
}

fn last(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(f64::NAN)
}
