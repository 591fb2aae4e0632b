//! Technical indicators over price series.
//!
//! Like the rest of the crate, these are pure calculations: each function
//! takes a price slice and explicit parameters, and entries a window cannot
//! yet cover are `None`, never zero. The exponential averages are recursive,
//! seeded at the first price, so they are defined from index 0.

use crate::error::AnalyticsError;
use crate::stats::{mean, sample_std};
use core_types::AssetSeries;
use serde::{Deserialize, Serialize};

/// Window and band parameters for a composed technical snapshot.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorParams {
    pub sma_window: usize,
    pub ema_window: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    /// Band half-width in standard deviations.
    pub bollinger_width: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_window: 20,
            ema_window: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_width: 2.0,
        }
    }
}

/// Directional read of a price against a moving average or MACD crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Oscillator read against its conventional thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Overbought,
    Oversold,
    Neutral,
}

/// The three MACD series, aligned 1:1 with the input prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Bollinger bands, aligned 1:1 with the input prices; the first
/// `window - 1` entries of every band are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Latest values of every indicator for one asset, with threshold signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub symbol: String,
    pub last_price: f64,
    pub sma: Option<f64>,
    pub sma_trend: Option<Trend>,
    pub ema: f64,
    pub ema_trend: Trend,
    pub rsi: Option<f64>,
    pub rsi_momentum: Option<Momentum>,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub macd_trend: Trend,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub bollinger_momentum: Option<Momentum>,
}

fn ensure_finite_prices(context: &str, prices: &[f64]) -> Result<(), AnalyticsError> {
    for (index, price) in prices.iter().enumerate() {
        if !price.is_finite() {
            return Err(AnalyticsError::InvalidPrice {
                symbol: context.to_string(),
                index,
                price: *price,
            });
        }
    }
    Ok(())
}

fn check_window(name: &str, window: usize, min: usize) -> Result<(), AnalyticsError> {
    if window < min {
        return Err(AnalyticsError::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be at least {}, got {}", min, window),
        });
    }
    Ok(())
}

/// Simple moving average. The first `window - 1` entries are `None`.
pub fn sma(prices: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    ensure_finite_prices("sma", prices)?;
    check_window("window", window, 1)?;

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(mean(&prices[i + 1 - window..=i]))
            }
        })
        .collect();
    Ok(values)
}

/// Exponential moving average with smoothing `alpha = 2 / (window + 1)`,
/// seeded at the first price.
pub fn ema(prices: &[f64], window: usize) -> Result<Vec<f64>, AnalyticsError> {
    ensure_finite_prices("ema", prices)?;
    check_window("window", window, 1)?;
    if prices.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            context: "ema".to_string(),
            needed: 1,
            got: 0,
        });
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len());
    let mut current = prices[0];
    values.push(current);
    for price in &prices[1..] {
        current = alpha * price + (1.0 - alpha) * current;
        values.push(current);
    }
    Ok(values)
}

/// Relative Strength Index over rolling average gains and losses.
///
/// The first `period` entries are `None` (no full window of price changes
/// yet). A window with losses but no gains reads 0, gains but no losses
/// reads 100, and a flat window is undefined.
pub fn rsi(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    ensure_finite_prices("rsi", prices)?;
    check_window("period", period, 1)?;

    let mut gains = Vec::with_capacity(prices.len().saturating_sub(1));
    let mut losses = Vec::with_capacity(prices.len().saturating_sub(1));
    for pair in prices.windows(2) {
        let delta = pair[1] - pair[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let values = (0..prices.len())
        .map(|i| {
            if i < period {
                return None;
            }
            // Price index i covers the changes ending at i, i.e. gain
            // indices [i - period, i).
            let avg_gain = mean(&gains[i - period..i]);
            let avg_loss = mean(&losses[i - period..i]);
            if avg_loss == 0.0 && avg_gain == 0.0 {
                None
            } else if avg_loss == 0.0 {
                Some(100.0)
            } else {
                let rs = avg_gain / avg_loss;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
        })
        .collect();
    Ok(values)
}

/// MACD line (fast EMA minus slow EMA), its signal EMA, and the histogram.
pub fn macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdSeries, AnalyticsError> {
    check_window("fast", fast, 1)?;
    check_window("signal", signal, 1)?;
    if fast >= slow {
        return Err(AnalyticsError::InvalidParameter {
            name: "fast".to_string(),
            reason: format!("must be shorter than slow ({} >= {})", fast, slow),
        });
    }

    let ema_fast = ema(prices, fast)?;
    let ema_slow = ema(prices, slow)?;
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&macd, signal)?;
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Ok(MacdSeries {
        macd,
        signal,
        histogram,
    })
}

/// Bollinger bands: rolling mean plus/minus `width` rolling sample
/// standard deviations.
pub fn bollinger(
    prices: &[f64],
    window: usize,
    width: f64,
) -> Result<BollingerBands, AnalyticsError> {
    ensure_finite_prices("bollinger", prices)?;
    check_window("window", window, 2)?;
    if !width.is_finite() || width <= 0.0 {
        return Err(AnalyticsError::InvalidParameter {
            name: "width".to_string(),
            reason: format!("must be a positive number of standard deviations, got {}", width),
        });
    }

    let mut middle = Vec::with_capacity(prices.len());
    let mut upper = Vec::with_capacity(prices.len());
    let mut lower = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if i + 1 < window {
            middle.push(None);
            upper.push(None);
            lower.push(None);
        } else {
            let slice = &prices[i + 1 - window..=i];
            let m = mean(slice);
            let half = sample_std(slice) * width;
            middle.push(Some(m));
            upper.push(Some(m + half));
            lower.push(Some(m - half));
        }
    }

    Ok(BollingerBands {
        middle,
        upper,
        lower,
    })
}

/// Computes every indicator for one asset and reads the latest values
/// against their conventional thresholds.
pub fn technical_snapshot(
    series: &AssetSeries,
    params: &IndicatorParams,
) -> Result<TechnicalSnapshot, AnalyticsError> {
    if series.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            context: series.symbol.clone(),
            needed: 2,
            got: series.len(),
        });
    }
    let prices = &series.prices;
    let last_price = series.last_price();

    let sma_last = sma(prices, params.sma_window)?.pop().flatten();
    // Every series below is 1:1 with the input, so the last index is valid.
    let ema_last = ema(prices, params.ema_window)?[prices.len() - 1];
    let rsi_last = rsi(prices, params.rsi_period)?.pop().flatten();
    let macd_series = macd(prices, params.macd_fast, params.macd_slow, params.macd_signal)?;
    let bands = bollinger(prices, params.bollinger_window, params.bollinger_width)?;

    let macd_last = macd_series.macd[macd_series.macd.len() - 1];
    let macd_signal_last = macd_series.signal[macd_series.signal.len() - 1];
    let macd_histogram_last = macd_series.histogram[macd_series.histogram.len() - 1];
    let macd_trend = if macd_last > macd_signal_last && macd_histogram_last > 0.0 {
        Trend::Bullish
    } else if macd_last < macd_signal_last && macd_histogram_last < 0.0 {
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    let bollinger_upper = bands.upper.last().copied().flatten();
    let bollinger_middle = bands.middle.last().copied().flatten();
    let bollinger_lower = bands.lower.last().copied().flatten();

    Ok(TechnicalSnapshot {
        symbol: series.symbol.clone(),
        last_price,
        sma: sma_last,
        sma_trend: sma_last.map(|v| trend_against(last_price, v)),
        ema: ema_last,
        ema_trend: trend_against(last_price, ema_last),
        rsi: rsi_last,
        rsi_momentum: rsi_last.map(|v| {
            if v > 70.0 {
                Momentum::Overbought
            } else if v < 30.0 {
                Momentum::Oversold
            } else {
                Momentum::Neutral
            }
        }),
        macd: macd_last,
        macd_signal: macd_signal_last,
        macd_histogram: macd_histogram_last,
        macd_trend,
        bollinger_upper,
        bollinger_middle,
        bollinger_lower,
        bollinger_momentum: bollinger_upper.zip(bollinger_lower).map(|(up, low)| {
            if last_price > up {
                Momentum::Overbought
            } else if last_price < low {
                Momentum::Oversold
            } else {
                Momentum::Neutral
            }
        }),
    })
}

fn trend_against(price: f64, average: f64) -> Trend {
    if price > average {
        Trend::Bullish
    } else if price < average {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}
