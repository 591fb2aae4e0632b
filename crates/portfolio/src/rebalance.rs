use crate::error::PortfolioError;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Direction of a rebalancing trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// One trade that moves the portfolio toward its target weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub symbol: String,
    pub side: TradeSide,
    /// Signed change in units; negative for sells.
    pub delta_quantity: Decimal,
    /// Signed change in market value; negative for sells.
    pub delta_value: Decimal,
}

/// Derives the trades that take `current` weights to `target` weights.
///
/// Drifts smaller than `materiality_threshold` (a fraction of total value,
/// e.g. 0.005 for half a percent) are dropped rather than churned. A symbol
/// present in `current` but absent from `target` is treated as a target of
/// zero and sold out.
pub fn rebalance(
    current: &[(String, f64)],
    target: &[(String, f64)],
    total_value: Decimal,
    prices: &HashMap<String, Decimal>,
    materiality_threshold: f64,
) -> Result<Vec<TradeRecommendation>, PortfolioError> {
    if total_value <= Decimal::ZERO {
        return Err(PortfolioError::ZeroPortfolioValue);
    }
    for (symbol, weight) in current.iter().chain(target) {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(PortfolioError::InvalidWeight {
                symbol: symbol.clone(),
                reason: format!("must be a finite non-negative fraction, got {}", weight),
            });
        }
    }

    let current_by_symbol: HashMap<&str, f64> = current
        .iter()
        .map(|(symbol, weight)| (symbol.as_str(), *weight))
        .collect();

    // Target order first, then current-only holdings (implicitly target 0).
    let mut deltas: Vec<(&str, f64)> = target
        .iter()
        .map(|(symbol, weight)| {
            let held = current_by_symbol.get(symbol.as_str()).copied().unwrap_or(0.0);
            (symbol.as_str(), weight - held)
        })
        .collect();
    for (symbol, weight) in current {
        if !target.iter().any(|(t, _)| t == symbol) {
            deltas.push((symbol.as_str(), -weight));
        }
    }

    let mut trades = Vec::new();
    for (symbol, delta_weight) in deltas {
        if delta_weight.abs() < materiality_threshold {
            continue;
        }

        let price = prices
            .get(symbol)
            .ok_or_else(|| PortfolioError::MissingPriceData {
                symbol: symbol.to_string(),
            })?;
        if *price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidPrice {
                symbol: symbol.to_string(),
            });
        }

        let delta_weight_dec = Decimal::from_f64(delta_weight).ok_or_else(|| {
            PortfolioError::InvalidWeight {
                symbol: symbol.to_string(),
                reason: format!("{} is not representable as a decimal", delta_weight),
            }
        })?;
        let delta_value = total_value * delta_weight_dec;
        trades.push(TradeRecommendation {
            symbol: symbol.to_string(),
            side: if delta_weight > 0.0 {
                TradeSide::Buy
            } else {
                TradeSide::Sell
            },
            delta_quantity: delta_value / price,
            delta_value,
        });
    }

    Ok(trades)
}
