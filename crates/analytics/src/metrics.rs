use crate::error::AnalyticsError;
use crate::returns::compute_returns;
use crate::stats;
use core_types::{AssetSeries, ReturnKind};
use serde::{Deserialize, Serialize};

/// Tunable inputs for a performance report. These come from configuration;
/// nothing here is ever inferred from the data itself.
#[derive(Debug, Clone, Copy)]
pub struct MetricParams {
    /// Annual risk-free rate for Sharpe and Sortino (e.g. 0.02).
    pub risk_free_rate: f64,
    /// Annualization constant: 365 for daily crypto, 252 for equities.
    pub periods_per_year: u32,
    /// Confidence level for VaR/CVaR (e.g. 0.95).
    pub var_confidence: f64,
    /// Sample size below which VaR/CVaR carries a low-sample warning.
    pub var_min_observations: usize,
}

/// A non-fatal caveat attached to a metrics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricWarning {
    /// A tail-risk estimate was computed from fewer observations than the
    /// configured minimum.
    LowSample {
        metric: String,
        observations: usize,
        required: usize,
    },
}

/// The standardized per-asset performance report.
///
/// `None` fields are mathematically undefined for the given input (zero
/// volatility, no downside, no drawdown): a deliberate state, distinct from
/// both errors and the value zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub symbol: String,
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub calmar_ratio: Option<f64>,
    pub var_95: f64,
    pub cvar_95: f64,
    pub observations: usize,
    pub warnings: Vec<MetricWarning>,
}

/// Computes the full performance report for one asset.
///
/// Returns are derived as simple returns; all downstream statistics share
/// that one derivation so the report is internally consistent.
pub fn performance_metrics(
    series: &AssetSeries,
    params: &MetricParams,
) -> Result<PerformanceMetrics, AnalyticsError> {
    let returns = compute_returns(series, ReturnKind::Simple)?;
    stats::ensure_finite(&series.symbol, &returns.returns)?;

    let total_return = stats::total_return(&series.prices)?;
    let annualized_return = stats::annualized_return(&returns.returns, params.periods_per_year)?;
    let annualized_volatility = stats::volatility(&returns.returns, params.periods_per_year)?;
    let sharpe_ratio = stats::sharpe_ratio(
        &returns.returns,
        params.risk_free_rate,
        params.periods_per_year,
    )?;
    let sortino_ratio = stats::sortino_ratio(
        &returns.returns,
        0.0,
        params.risk_free_rate,
        params.periods_per_year,
    )?;
    let max_drawdown = stats::max_drawdown(&series.prices)?;
    let calmar_ratio = stats::calmar_ratio(annualized_return, max_drawdown);
    let tail = stats::tail_risk(
        &returns.returns,
        params.var_confidence,
        params.var_min_observations,
    )?;

    let mut warnings = Vec::new();
    if tail.low_sample {
        warnings.push(MetricWarning::LowSample {
            metric: "var_cvar".to_string(),
            observations: returns.len(),
            required: params.var_min_observations,
        });
    }

    Ok(PerformanceMetrics {
        symbol: series.symbol.clone(),
        total_return,
        annualized_return,
        annualized_volatility,
        sharpe_ratio,
        sortino_ratio,
        max_drawdown,
        calmar_ratio,
        var_95: tail.var,
        cvar_95: tail.cvar,
        observations: series.len(),
        warnings,
    })
}
