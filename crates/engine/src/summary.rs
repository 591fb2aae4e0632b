use analytics::PerformanceMetrics;
use core_types::Timeframe;
use serde::{Deserialize, Serialize};

/// Side-by-side performance of several assets over one timeframe.
///
/// `metrics` preserves the requested symbol order; the convenience lookups
/// skip assets whose ratio is undefined rather than treating it as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeSummary {
    pub timeframe: Timeframe,
    pub metrics: Vec<PerformanceMetrics>,
}

impl ComparativeSummary {
    /// The asset with the highest defined Sharpe ratio.
    pub fn best_by_sharpe(&self) -> Option<&PerformanceMetrics> {
        self.metrics
            .iter()
            .filter(|m| m.sharpe_ratio.is_some())
            .max_by(|a, b| {
                a.sharpe_ratio
                    .partial_cmp(&b.sharpe_ratio)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// The asset with the deepest drawdown.
    pub fn worst_drawdown(&self) -> Option<&PerformanceMetrics> {
        self.metrics.iter().min_by(|a, b| {
            a.max_drawdown
                .partial_cmp(&b.max_drawdown)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(symbol: &str, sharpe: Option<f64>, drawdown: f64) -> PerformanceMetrics {
        PerformanceMetrics {
            symbol: symbol.to_string(),
            total_return: 0.1,
            annualized_return: 0.2,
            annualized_volatility: 0.3,
            sharpe_ratio: sharpe,
            sortino_ratio: None,
            max_drawdown: drawdown,
            calmar_ratio: None,
            var_95: -0.02,
            cvar_95: -0.03,
            observations: 30,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn rankings_skip_undefined_ratios() {
        let summary = ComparativeSummary {
            timeframe: Timeframe::ThirtyDays,
            metrics: vec![
                metrics("FLAT", None, 0.0),
                metrics("BTC", Some(1.2), -0.3),
                metrics("ETH", Some(0.8), -0.5),
            ],
        };

        assert_eq!(summary.best_by_sharpe().unwrap().symbol, "BTC");
        assert_eq!(summary.worst_drawdown().unwrap().symbol, "ETH");
    }
}
