use crate::covariance::{annualized_covariance, portfolio_variance};
use crate::error::PortfolioError;
use crate::report::{PortfolioReport, PositionReport};
use analytics::{MetricParams, MetricWarning, align, compute_returns, stats};
use core_types::{AssetSeries, Portfolio, ReturnKind};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::collections::HashMap;

/// Portfolio-level valuation and risk analysis.
///
/// Valuation stays in exact decimal arithmetic from position quantities to
/// total P&L; risk statistics convert to floats at the analytics seam, the
/// same convention as everywhere else in the system.
pub struct PortfolioAnalyzer {
    params: MetricParams,
}

impl PortfolioAnalyzer {
    pub fn new(params: MetricParams) -> Self {
        Self { params }
    }

    /// Analyzes a portfolio against the given price histories.
    ///
    /// Every position must have a history; a missing symbol fails the whole
    /// request before any figure is computed, so a report never contains
    /// partial aggregates.
    pub fn analyze(
        &self,
        portfolio: &Portfolio,
        history: &HashMap<String, AssetSeries>,
    ) -> Result<PortfolioReport, PortfolioError> {
        if portfolio.positions.is_empty() {
            return Err(PortfolioError::EmptyPortfolio);
        }

        // Resolve all histories up front.
        let mut series_list = Vec::with_capacity(portfolio.positions.len());
        for position in &portfolio.positions {
            let series =
                history
                    .get(&position.symbol)
                    .ok_or_else(|| PortfolioError::MissingPriceData {
                        symbol: position.symbol.clone(),
                    })?;
            series_list.push(series.clone());
        }

        // --- Exact valuation ---
        let mut market_values = Vec::with_capacity(portfolio.positions.len());
        let mut total_value = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        for (position, series) in portfolio.positions.iter().zip(&series_list) {
            let price = series.last_price();
            let price_dec = Decimal::from_f64(price).ok_or_else(|| {
                PortfolioError::NonRepresentablePrice {
                    symbol: position.symbol.clone(),
                    price,
                }
            })?;
            let market_value = position.quantity * price_dec;
            total_value += market_value;
            total_cost += position.quantity * position.avg_cost;
            market_values.push((price_dec, market_value));
        }
        if total_value <= Decimal::ZERO {
            return Err(PortfolioError::ZeroPortfolioValue);
        }

        let mut positions = Vec::with_capacity(portfolio.positions.len());
        for (position, (price_dec, market_value)) in
            portfolio.positions.iter().zip(&market_values)
        {
            let cost_value = position.quantity * position.avg_cost;
            let return_pct = if cost_value > Decimal::ZERO {
                ((market_value - cost_value) / cost_value).to_f64()
            } else {
                None
            };
            positions.push(PositionReport {
                symbol: position.symbol.clone(),
                quantity: position.quantity,
                avg_cost: position.avg_cost,
                current_price: *price_dec,
                market_value: *market_value,
                cost_value,
                unrealized_pnl: market_value - cost_value,
                return_pct,
                weight: (market_value / total_value).to_f64().unwrap_or(0.0),
            });
        }

        let return_pct = positions
            .iter()
            .map(|p| p.return_pct.map(|r| p.weight * r))
            .sum::<Option<f64>>();

        // --- Risk statistics over the aligned histories ---
        let aligned = align(&series_list)?;
        let returns = aligned
            .iter()
            .map(|s| compute_returns(s, ReturnKind::Simple))
            .collect::<Result<Vec<_>, _>>()?;
        let weights: Vec<f64> = positions.iter().map(|p| p.weight).collect();

        let (_, correlations, sigma) =
            annualized_covariance(&returns, self.params.periods_per_year)?;
        let annualized_volatility = portfolio_variance(&weights, &sigma).sqrt();

        // Weighted portfolio return series drives Sharpe and tail risk, so
        // they reflect the same co-movement the covariance captures.
        let portfolio_returns: Vec<f64> = (0..returns[0].len())
            .map(|t| {
                weights
                    .iter()
                    .zip(&returns)
                    .map(|(w, series)| w * series.returns[t])
                    .sum()
            })
            .collect();

        let sharpe_ratio = stats::sharpe_ratio(
            &portfolio_returns,
            self.params.risk_free_rate,
            self.params.periods_per_year,
        )?;
        let tail = stats::tail_risk(
            &portfolio_returns,
            self.params.var_confidence,
            self.params.var_min_observations,
        )?;

        let mut warnings = Vec::new();
        if tail.low_sample {
            warnings.push(MetricWarning::LowSample {
                metric: "portfolio_var_cvar".to_string(),
                observations: portfolio_returns.len(),
                required: self.params.var_min_observations,
            });
        }

        tracing::debug!(
            positions = positions.len(),
            observations = aligned[0].len(),
            %total_value,
            "portfolio analysis complete"
        );

        let mean_correlation = correlations.mean_off_diagonal();
        Ok(PortfolioReport {
            positions,
            total_value,
            total_cost,
            unrealized_pnl: total_value - total_cost,
            return_pct,
            annualized_volatility,
            sharpe_ratio,
            var_95: tail.var,
            cvar_95: tail.cvar,
            correlations,
            mean_correlation,
            observations: aligned[0].len(),
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::{Position, Timeframe};
    use rust_decimal_macros::dec;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn series(symbol: &str, prices: &[f64]) -> AssetSeries {
        AssetSeries::new(
            symbol,
            (1..=prices.len() as u32).map(ts).collect(),
            prices.to_vec(),
        )
        .unwrap()
    }

    fn params() -> MetricParams {
        MetricParams {
            risk_free_rate: 0.02,
            periods_per_year: 365,
            var_confidence: 0.95,
            var_min_observations: 20,
        }
    }

    fn two_asset_portfolio() -> Portfolio {
        Portfolio::new(
            vec![
                Position {
                    symbol: "BTC".to_string(),
                    quantity: dec!(0.5),
                    avg_cost: dec!(40000),
                },
                Position {
                    symbol: "ETH".to_string(),
                    quantity: dec!(10),
                    avg_cost: dec!(2500),
                },
            ],
            Timeframe::ThirtyDays,
        )
        .unwrap()
    }

    fn two_asset_history() -> HashMap<String, AssetSeries> {
        let mut history = HashMap::new();
        history.insert(
            "BTC".to_string(),
            series("BTC", &[40000.0, 42000.0, 41000.0, 43500.0, 45000.0]),
        );
        history.insert(
            "ETH".to_string(),
            series("ETH", &[2500.0, 2600.0, 2550.0, 2700.0, 2800.0]),
        );
        history
    }

    #[test]
    fn valuation_is_exact_in_decimal() {
        let analyzer = PortfolioAnalyzer::new(params());
        let report = analyzer
            .analyze(&two_asset_portfolio(), &two_asset_history())
            .unwrap();

        // 0.5 * 45000 + 10 * 2800, exactly.
        assert_eq!(report.total_value, dec!(22500) + dec!(28000));
        assert_eq!(report.total_cost, dec!(45000));
        assert_eq!(report.unrealized_pnl, dec!(5500));

        let btc = &report.positions[0];
        assert_eq!(btc.market_value, dec!(22500));
        assert_eq!(btc.unrealized_pnl, dec!(2500));

        let weight_sum: f64 = report.positions.iter().map(|p| p.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn report_carries_portfolio_level_risk() {
        let analyzer = PortfolioAnalyzer::new(params());
        let report = analyzer
            .analyze(&two_asset_portfolio(), &two_asset_history())
            .unwrap();

        assert!(report.annualized_volatility > 0.0);
        assert!(report.sharpe_ratio.is_some());
        assert!(report.var_95 <= 0.0);
        assert!(report.cvar_95 <= report.var_95);
        assert_eq!(report.correlations.symbols, vec!["BTC", "ETH"]);
        assert!(report.mean_correlation.is_some());
        assert_eq!(report.observations, 5);
        // Four returns is well below the tail-risk minimum.
        assert!(matches!(
            report.warnings.as_slice(),
            [MetricWarning::LowSample { observations: 4, .. }]
        ));
    }

    #[test]
    fn missing_history_fails_before_any_figure() {
        let mut history = two_asset_history();
        history.remove("ETH");

        let analyzer = PortfolioAnalyzer::new(params());
        let err = analyzer
            .analyze(&two_asset_portfolio(), &history)
            .unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::MissingPriceData { symbol } if symbol == "ETH"
        ));
    }

    #[test]
    fn empty_portfolio_is_rejected() {
        let portfolio = Portfolio::new(Vec::new(), Timeframe::ThirtyDays).unwrap();
        let analyzer = PortfolioAnalyzer::new(params());
        assert!(matches!(
            analyzer.analyze(&portfolio, &HashMap::new()),
            Err(PortfolioError::EmptyPortfolio)
        ));
    }

    #[test]
    fn zero_value_portfolio_has_no_weights() {
        let portfolio = Portfolio::new(
            vec![Position {
                symbol: "BTC".to_string(),
                quantity: dec!(0),
                avg_cost: dec!(40000),
            }],
            Timeframe::ThirtyDays,
        )
        .unwrap();

        let analyzer = PortfolioAnalyzer::new(params());
        let err = analyzer
            .analyze(&portfolio, &two_asset_history())
            .unwrap_err();
        assert!(matches!(err, PortfolioError::ZeroPortfolioValue));
    }

    #[test]
    fn position_without_cost_basis_leaves_returns_undefined() {
        let portfolio = Portfolio::new(
            vec![
                Position {
                    symbol: "BTC".to_string(),
                    quantity: dec!(0.5),
                    avg_cost: dec!(0),
                },
                Position {
                    symbol: "ETH".to_string(),
                    quantity: dec!(10),
                    avg_cost: dec!(2500),
                },
            ],
            Timeframe::ThirtyDays,
        )
        .unwrap();

        let analyzer = PortfolioAnalyzer::new(params());
        let report = analyzer
            .analyze(&portfolio, &two_asset_history())
            .unwrap();
        assert_eq!(report.positions[0].return_pct, None);
        assert_eq!(report.return_pct, None);
    }
}
