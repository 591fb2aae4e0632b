use core_types::AssetClass;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analysis: Analysis,
    pub risk: Risk,
    pub rebalancing: Rebalancing,
}

/// Parameters controlling return and volatility calculations.
#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    /// Periods per year for assets that trade every calendar day (crypto).
    pub crypto_periods_per_year: u32,
    /// Periods per year for assets that trade only on exchange days (equities).
    pub equity_periods_per_year: u32,
    /// Default window length for rolling correlation and rolling volatility.
    pub default_rolling_window: usize,
    /// Symbols treated as crypto assets when resolving annualization.
    /// Anything not listed here is treated as a traditional-market asset.
    pub crypto_symbols: Vec<String>,
}

/// Parameters for risk-adjusted metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct Risk {
    /// Annual risk-free rate used in Sharpe and Sortino ratios (0.02 = 2%).
    pub risk_free_rate: f64,
    /// Confidence level for VaR/CVaR estimates (e.g. 0.95).
    pub var_confidence: f64,
    /// Below this many observations, VaR/CVaR results carry a low-sample warning.
    pub var_min_observations: usize,
}

/// Parameters for rebalancing trade generation.
#[derive(Debug, Clone, Deserialize)]
pub struct Rebalancing {
    /// Trades smaller than this fraction of total portfolio value are dropped
    /// to avoid churn (0.005 = 0.5%).
    pub materiality_threshold: f64,
}

impl Config {
    /// Resolves the annualization constant for a symbol.
    pub fn periods_per_year(&self, symbol: &str) -> u32 {
        match self.asset_class(symbol) {
            AssetClass::Crypto => self.analysis.crypto_periods_per_year,
            AssetClass::Equity => self.analysis.equity_periods_per_year,
        }
    }

    /// Classifies a symbol by membership in the configured crypto list.
    pub fn asset_class(&self, symbol: &str) -> AssetClass {
        if self
            .analysis
            .crypto_symbols
            .iter()
            .any(|s| s.eq_ignore_ascii_case(symbol))
        {
            AssetClass::Crypto
        } else {
            AssetClass::Equity
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: Analysis {
                crypto_periods_per_year: 365,
                equity_periods_per_year: 252,
                default_rolling_window: 30,
                crypto_symbols: ["BTC", "ETH", "ADA", "SOL", "BNB", "XRP", "DOT", "DOGE"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            risk: Risk {
                risk_free_rate: 0.02,
                var_confidence: 0.95,
                var_min_observations: 20,
            },
            rebalancing: Rebalancing {
                materiality_threshold: 0.005,
            },
        }
    }
}
