use analytics::MetricWarning;
use correlation::CorrelationMatrix;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Valuation of a single holding inside a portfolio report.
///
/// Monetary fields are exact decimals; `return_pct` is `None` when the
/// position has no cost basis to measure against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub symbol: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub cost_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub return_pct: Option<f64>,
    /// Share of total portfolio value, in [0, 1].
    pub weight: f64,
}

/// The full portfolio analysis: exact valuation plus risk statistics
/// computed from the timestamp-aligned histories of every holding.
///
/// Risk figures are portfolio-level: volatility comes from the covariance
/// composition `w' * Sigma * w`, and VaR/CVaR from the weighted portfolio
/// return series, never from averaging per-asset numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub positions: Vec<PositionReport>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub unrealized_pnl: Decimal,
    /// Value-weighted return against cost basis; `None` when any position
    /// has no cost basis.
    pub return_pct: Option<f64>,
    pub annualized_volatility: f64,
    pub sharpe_ratio: Option<f64>,
    pub var_95: f64,
    pub cvar_95: f64,
    pub correlations: CorrelationMatrix,
    /// Mean of the defined off-diagonal correlations, a single
    /// diversification gauge. `None` when every pair is undefined.
    pub mean_correlation: Option<f64>,
    /// Number of aligned observations the statistics were computed from.
    pub observations: usize,
    pub warnings: Vec<MetricWarning>,
}
