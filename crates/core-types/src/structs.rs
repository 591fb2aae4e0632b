use crate::enums::{ReturnKind, Timeframe};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A validated price history for a single asset.
///
/// Timestamps and prices are aligned 1:1, and timestamps are strictly
/// increasing. These invariants are enforced at construction so every
/// downstream calculation can rely on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    pub symbol: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
}

impl AssetSeries {
    /// Builds a series, rejecting empty, misaligned, or unordered input.
    pub fn new(
        symbol: impl Into<String>,
        timestamps: Vec<DateTime<Utc>>,
        prices: Vec<f64>,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        if timestamps.is_empty() {
            return Err(CoreError::EmptySeries { symbol });
        }
        if timestamps.len() != prices.len() {
            return Err(CoreError::LengthMismatch {
                symbol,
                timestamps: timestamps.len(),
                prices: prices.len(),
            });
        }
        // Strictly increasing also rules out duplicate timestamps.
        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(CoreError::NonMonotonicTimestamps {
                    symbol,
                    index: i + 1,
                });
            }
        }

        Ok(Self {
            symbol,
            timestamps,
            prices,
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// The most recent price in the series.
    pub fn last_price(&self) -> f64 {
        // Safe: construction rejects empty series.
        *self.prices.last().unwrap()
    }

    /// Restricts the series to observations at or after `start`.
    ///
    /// The result may violate the minimum-length requirements of downstream
    /// calculations; those report their own errors.
    pub fn tail_from(&self, start: DateTime<Utc>) -> Self {
        let from = self.timestamps.partition_point(|t| *t < start);
        Self {
            symbol: self.symbol.clone(),
            timestamps: self.timestamps[from..].to_vec(),
            prices: self.prices[from..].to_vec(),
        }
    }
}

/// A return series derived from an [`AssetSeries`].
///
/// Each return at index `i` is stamped with the timestamp of the *later* of
/// the two prices that produced it, so the series has one fewer entry than
/// its source. Owned transiently by the computation that requested it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbol: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub returns: Vec<f64>,
    pub kind: ReturnKind,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

/// A single holding inside a portfolio. Quantities and cost basis are exact
/// decimals; statistics convert to floats at the analytics seam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
}

/// A set of positions (unique by symbol) plus the valuation timeframe.
///
/// Portfolios are built per request and never persisted by the analytics
/// core; any storage belongs to the calling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub positions: Vec<Position>,
    pub timeframe: Timeframe,
}

impl Portfolio {
    pub fn new(positions: Vec<Position>, timeframe: Timeframe) -> Result<Self, CoreError> {
        let mut seen = std::collections::HashSet::new();
        for position in &positions {
            if !seen.insert(position.symbol.clone()) {
                return Err(CoreError::DuplicatePosition {
                    symbol: position.symbol.clone(),
                });
            }
            if position.quantity.is_sign_negative() {
                return Err(CoreError::InvalidPosition {
                    symbol: position.symbol.clone(),
                    reason: "quantity must be >= 0".to_string(),
                });
            }
            if position.avg_cost.is_sign_negative() {
                return Err(CoreError::InvalidPosition {
                    symbol: position.symbol.clone(),
                    reason: "avg_cost must be >= 0".to_string(),
                });
            }
        }

        Ok(Self {
            positions,
            timeframe,
        })
    }

    pub fn symbols(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.symbol.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn series_rejects_length_mismatch() {
        let err = AssetSeries::new("BTC", vec![ts(1), ts(2)], vec![100.0]).unwrap_err();
        assert!(matches!(err, CoreError::LengthMismatch { .. }));
    }

    #[test]
    fn series_rejects_duplicate_timestamps() {
        let err = AssetSeries::new("BTC", vec![ts(1), ts(1)], vec![100.0, 101.0]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NonMonotonicTimestamps { index: 1, .. }
        ));
    }

    #[test]
    fn series_rejects_out_of_order_timestamps() {
        let err =
            AssetSeries::new("BTC", vec![ts(2), ts(1)], vec![100.0, 101.0]).unwrap_err();
        assert!(matches!(err, CoreError::NonMonotonicTimestamps { .. }));
    }

    #[test]
    fn tail_from_keeps_observations_at_or_after_start() {
        let series = AssetSeries::new(
            "BTC",
            vec![ts(1), ts(2), ts(3), ts(4)],
            vec![100.0, 101.0, 102.0, 103.0],
        )
        .unwrap();

        let tail = series.tail_from(ts(3));
        assert_eq!(tail.timestamps, vec![ts(3), ts(4)]);
        assert_eq!(tail.prices, vec![102.0, 103.0]);
    }

    #[test]
    fn portfolio_rejects_duplicate_symbols() {
        let positions = vec![
            Position {
                symbol: "BTC".to_string(),
                quantity: dec!(1),
                avg_cost: dec!(40000),
            },
            Position {
                symbol: "BTC".to_string(),
                quantity: dec!(2),
                avg_cost: dec!(41000),
            },
        ];
        let err = Portfolio::new(positions, Timeframe::ThirtyDays).unwrap_err();
        assert!(matches!(err, CoreError::DuplicatePosition { .. }));
    }

    #[test]
    fn portfolio_rejects_negative_quantity() {
        let positions = vec![Position {
            symbol: "ETH".to_string(),
            quantity: dec!(-1),
            avg_cost: dec!(2500),
        }];
        let err = Portfolio::new(positions, Timeframe::ThirtyDays).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPosition { .. }));
    }
}
