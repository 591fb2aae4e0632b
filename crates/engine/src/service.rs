use crate::error::EngineError;
use crate::summary::ComparativeSummary;
use analytics::{
    IndicatorParams, MetricParams, PerformanceMetrics, TechnicalSnapshot, compute_returns,
    performance_metrics, stats, technical_snapshot,
};
use chrono::{DateTime, Utc};
use configuration::Config;
use core_types::{AssetSeries, Portfolio, ReturnKind, Timeframe};
use correlation::{CorrelationMatrix, RollingCorrelation};
use market_data::{MarketDataSource, SeriesStore};
use portfolio::{
    AssetWeight, Constraints, Objective, PortfolioAnalyzer, PortfolioReport,
    TradeRecommendation,
};
use rayon::prelude::*;
use std::collections::HashMap;

/// The single entry point the outer layers talk to.
///
/// The service owns a data source and an in-memory store of fetched series;
/// every operation slices the store by timeframe and delegates to the pure
/// calculation crates. Annualization is resolved per symbol from
/// configuration, never inferred from the data.
pub struct AnalysisService {
    source: Box<dyn MarketDataSource>,
    store: SeriesStore,
    config: Config,
}

impl AnalysisService {
    pub fn new(source: Box<dyn MarketDataSource>, config: Config) -> Self {
        Self {
            source,
            store: SeriesStore::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Fetches the full available history for each symbol into the store.
    pub fn refresh(&mut self, symbols: &[String]) -> Result<(), EngineError> {
        for symbol in symbols {
            let series =
                self.source
                    .fetch_price_history(symbol, DateTime::<Utc>::MIN_UTC, Utc::now())?;
            tracing::info!(symbol = %symbol, points = series.len(), "fetched price history");
            self.store.insert(series);
        }
        Ok(())
    }

    /// The full performance report for one asset over a timeframe.
    pub fn asset_performance(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<PerformanceMetrics, EngineError> {
        let history = self.store.history(symbol, timeframe)?;
        let params = self.params_with(self.config.periods_per_year(symbol));
        Ok(performance_metrics(&history, &params)?)
    }

    /// Side-by-side reports for several assets, computed in parallel.
    ///
    /// One failing symbol fails the whole comparison; a summary never
    /// silently omits an asset that was asked for.
    pub fn compare(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
    ) -> Result<ComparativeSummary, EngineError> {
        let metrics = symbols
            .par_iter()
            .map(|symbol| self.asset_performance(symbol, timeframe))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ComparativeSummary { timeframe, metrics })
    }

    /// Rolling annualized volatility for one asset. `window` defaults to the
    /// configured rolling window; the output is aligned with the return
    /// series timestamps.
    pub fn volatility_series(
        &self,
        symbol: &str,
        window: Option<usize>,
        timeframe: Timeframe,
    ) -> Result<(Vec<DateTime<Utc>>, Vec<Option<f64>>), EngineError> {
        let window = window.unwrap_or(self.config.analysis.default_rolling_window);
        let history = self.store.history(symbol, timeframe)?;
        let returns = compute_returns(&history, ReturnKind::Simple)?;
        let values = stats::rolling_volatility(
            &returns.returns,
            window,
            self.config.periods_per_year(symbol),
        )?;
        Ok((returns.timestamps, values))
    }

    /// Latest technical indicator readings for one asset, using the
    /// conventional default windows.
    pub fn technical_snapshot(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<TechnicalSnapshot, EngineError> {
        let history = self.store.history(symbol, timeframe)?;
        Ok(technical_snapshot(&history, &IndicatorParams::default())?)
    }

    /// The pairwise correlation matrix over the requested symbols.
    ///
    /// Each pair is correlated over its own timestamp overlap, so assets
    /// with different coverage can still be compared.
    pub fn correlation_matrix(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
    ) -> Result<CorrelationMatrix, EngineError> {
        let returns = symbols
            .iter()
            .map(|symbol| {
                let history = self.store.history(symbol, timeframe)?;
                Ok(compute_returns(&history, ReturnKind::Simple)?)
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(correlation::matrix(&returns)?)
    }

    /// Rolling correlation between two assets. `window` defaults to the
    /// configured rolling window.
    pub fn rolling_correlation(
        &self,
        symbol_a: &str,
        symbol_b: &str,
        window: Option<usize>,
        timeframe: Timeframe,
    ) -> Result<RollingCorrelation, EngineError> {
        let window = window.unwrap_or(self.config.analysis.default_rolling_window);
        let history_a = self.store.history(symbol_a, timeframe)?;
        let history_b = self.store.history(symbol_b, timeframe)?;
        let returns_a = compute_returns(&history_a, ReturnKind::Simple)?;
        let returns_b = compute_returns(&history_b, ReturnKind::Simple)?;
        Ok(correlation::rolling(&returns_a, &returns_b, window)?)
    }

    /// The full portfolio report: exact valuation plus portfolio-level risk.
    pub fn analyze_portfolio(
        &self,
        portfolio: &Portfolio,
    ) -> Result<PortfolioReport, EngineError> {
        let history = self.portfolio_history(portfolio)?;
        let params = self.params_for_symbols(portfolio.symbols().iter().map(String::as_str));
        let analyzer = PortfolioAnalyzer::new(params);
        Ok(analyzer.analyze(portfolio, &history)?)
    }

    /// Optimized weights for a set of candidate assets.
    pub fn optimize_weights(
        &self,
        symbols: &[String],
        objective: Objective,
        constraints: &Constraints,
        timeframe: Timeframe,
    ) -> Result<Vec<AssetWeight>, EngineError> {
        let mut history = HashMap::new();
        for symbol in symbols {
            history.insert(symbol.clone(), self.store.history(symbol, timeframe)?);
        }
        let params = self.params_for_symbols(symbols.iter().map(String::as_str));
        Ok(portfolio::optimize(
            symbols,
            &history,
            objective,
            constraints,
            &params,
        )?)
    }

    /// Trades that move a portfolio to the given target weights, dropping
    /// immaterial drift per configuration.
    pub fn plan_rebalance(
        &self,
        portfolio: &Portfolio,
        target: &[AssetWeight],
    ) -> Result<Vec<TradeRecommendation>, EngineError> {
        let report = self.analyze_portfolio(portfolio)?;

        let current: Vec<(String, f64)> = report
            .positions
            .iter()
            .map(|p| (p.symbol.clone(), p.weight))
            .collect();
        let target: Vec<(String, f64)> = target
            .iter()
            .map(|w| (w.symbol.clone(), w.weight))
            .collect();
        let prices = report
            .positions
            .iter()
            .map(|p| (p.symbol.clone(), p.current_price))
            .collect();

        Ok(portfolio::rebalance(
            &current,
            &target,
            report.total_value,
            &prices,
            self.config.rebalancing.materiality_threshold,
        )?)
    }

    fn portfolio_history(
        &self,
        portfolio: &Portfolio,
    ) -> Result<HashMap<String, AssetSeries>, EngineError> {
        let mut history = HashMap::new();
        for symbol in portfolio.symbols() {
            let series = self.store.history(&symbol, portfolio.timeframe)?;
            history.insert(symbol, series);
        }
        Ok(history)
    }

    fn params_with(&self, periods_per_year: u32) -> MetricParams {
        MetricParams {
            risk_free_rate: self.config.risk.risk_free_rate,
            periods_per_year,
            var_confidence: self.config.risk.var_confidence,
            var_min_observations: self.config.risk.var_min_observations,
        }
    }

    /// A mixed basket annualizes like its most active member: one crypto
    /// position makes the whole basket a calendar-day series.
    fn params_for_symbols<'a>(&self, mut symbols: impl Iterator<Item = &'a str>) -> MetricParams {
        let periods = if symbols
            .any(|s| self.config.asset_class(s) == core_types::AssetClass::Crypto)
        {
            self.config.analysis.crypto_periods_per_year
        } else {
            self.config.analysis.equity_periods_per_year
        };
        self.params_with(periods)
    }
}
