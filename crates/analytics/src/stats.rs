//! Risk and performance statistics over return series.
//!
//! Every function here is a pure calculation on already-derived returns.
//! Annualization constants are explicit parameters (periods per year), never
//! inferred from the data; 365 suits daily crypto series, 252 trading-day
//! equities.

use crate::error::AnalyticsError;

/// The outcome of a historical VaR/CVaR estimate.
///
/// `low_sample` marks a best-effort estimate computed from fewer observations
/// than the configured minimum; the values are still reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailRisk {
    pub var: f64,
    pub cvar: f64,
    pub low_sample: bool,
}

/// Rejects any non-finite return up front so NaN can never propagate
/// silently through a metric.
pub fn ensure_finite(context: &str, returns: &[f64]) -> Result<(), AnalyticsError> {
    for (index, r) in returns.iter().enumerate() {
        if !r.is_finite() {
            return Err(AnalyticsError::InvalidInput {
                context: context.to_string(),
                index,
            });
        }
    }
    Ok(())
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1). Two-pass: mean first, then
/// deviations, to avoid catastrophic cancellation on large magnitudes.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Annualized volatility: sample standard deviation scaled by
/// `sqrt(periods_per_year)`.
pub fn volatility(returns: &[f64], periods_per_year: u32) -> Result<f64, AnalyticsError> {
    ensure_finite("volatility", returns)?;
    if returns.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            context: "volatility".to_string(),
            needed: 2,
            got: returns.len(),
        });
    }
    Ok(sample_std(returns) * (periods_per_year as f64).sqrt())
}

/// Rolling annualized volatility. The output is aligned with `returns`:
/// the first `window - 1` entries are `None`.
pub fn rolling_volatility(
    returns: &[f64],
    window: usize,
    periods_per_year: u32,
) -> Result<Vec<Option<f64>>, AnalyticsError> {
    ensure_finite("rolling_volatility", returns)?;
    if window < 2 {
        return Err(AnalyticsError::InvalidParameter {
            name: "window".to_string(),
            reason: format!("must be at least 2, got {}", window),
        });
    }

    let factor = (periods_per_year as f64).sqrt();
    let values = (0..returns.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(sample_std(&returns[i + 1 - window..=i]) * factor)
            }
        })
        .collect();
    Ok(values)
}

/// Annualized arithmetic return: `mean(returns) * periods_per_year`.
pub fn annualized_return(returns: &[f64], periods_per_year: u32) -> Result<f64, AnalyticsError> {
    ensure_finite("annualized_return", returns)?;
    if returns.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            context: "annualized_return".to_string(),
            needed: 1,
            got: 0,
        });
    }
    Ok(mean(returns) * periods_per_year as f64)
}

/// Total return over a price series: `last / first - 1`.
pub fn total_return(prices: &[f64]) -> Result<f64, AnalyticsError> {
    if prices.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            context: "total_return".to_string(),
            needed: 2,
            got: prices.len(),
        });
    }
    for (index, price) in prices.iter().enumerate() {
        if !price.is_finite() {
            return Err(AnalyticsError::InvalidPrice {
                symbol: "total_return".to_string(),
                index,
                price: *price,
            });
        }
    }
    let first = prices[0];
    if first <= 0.0 {
        return Err(AnalyticsError::InvalidPrice {
            symbol: "total_return".to_string(),
            index: 0,
            price: first,
        });
    }
    Ok(prices[prices.len() - 1] / first - 1.0)
}

/// Annualized Sharpe ratio. `None` when volatility is zero: the ratio is
/// undefined there, which callers must distinguish from a true zero.
pub fn sharpe_ratio(
    returns: &[f64],
    risk_free_rate: f64,
    periods_per_year: u32,
) -> Result<Option<f64>, AnalyticsError> {
    let vol = volatility(returns, periods_per_year)?;
    if vol == 0.0 {
        return Ok(None);
    }
    let excess = mean(returns) * periods_per_year as f64 - risk_free_rate;
    Ok(Some(excess / vol))
}

/// Annualized Sortino ratio: excess return over downside deviation.
///
/// Downside deviation measures dispersion below `target` (usually 0.0),
/// using deviations from the target itself. `None` when no return falls
/// below the target, i.e. zero downside variance.
pub fn sortino_ratio(
    returns: &[f64],
    target: f64,
    risk_free_rate: f64,
    periods_per_year: u32,
) -> Result<Option<f64>, AnalyticsError> {
    ensure_finite("sortino_ratio", returns)?;
    if returns.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            context: "sortino_ratio".to_string(),
            needed: 2,
            got: returns.len(),
        });
    }

    let below: Vec<f64> = returns.iter().copied().filter(|r| *r < target).collect();
    if below.is_empty() {
        return Ok(None);
    }
    let downside_sq = below
        .iter()
        .map(|r| (r - target) * (r - target))
        .sum::<f64>()
        / below.len() as f64;
    let downside = downside_sq.sqrt() * (periods_per_year as f64).sqrt();

    let excess = mean(returns) * periods_per_year as f64 - risk_free_rate;
    Ok(Some(excess / downside))
}

/// Maximum drawdown over a price (or cumulative-value) series.
///
/// Defined as the minimum over t of `value_t / running_max_t - 1`; always
/// <= 0, and exactly 0 for a monotonically non-decreasing series.
pub fn max_drawdown(values: &[f64]) -> Result<f64, AnalyticsError> {
    ensure_finite("max_drawdown", values)?;
    if values.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            context: "max_drawdown".to_string(),
            needed: 1,
            got: 0,
        });
    }

    let mut peak = values[0];
    let mut worst: f64 = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        }
        let drawdown = value / peak - 1.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    Ok(worst)
}

/// Calmar ratio: annualized return over the magnitude of max drawdown.
/// `None` when the drawdown is zero.
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> Option<f64> {
    if max_drawdown == 0.0 {
        None
    } else {
        Some(annualized_return / max_drawdown.abs())
    }
}

/// Historical VaR and CVaR at the given confidence level.
///
/// VaR is the empirical `(1 - confidence)` quantile of the return
/// distribution (linear interpolation between order statistics); CVaR is the
/// mean of the returns at or below that quantile. Estimates from fewer than
/// `min_observations` points are flagged as low-sample but still computed.
pub fn tail_risk(
    returns: &[f64],
    confidence: f64,
    min_observations: usize,
) -> Result<TailRisk, AnalyticsError> {
    ensure_finite("tail_risk", returns)?;
    if returns.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            context: "tail_risk".to_string(),
            needed: 2,
            got: returns.len(),
        });
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(AnalyticsError::InvalidParameter {
            name: "confidence".to_string(),
            reason: format!("must lie strictly between 0 and 1, got {}", confidence),
        });
    }

    let mut sorted = returns.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).expect("finite returns are comparable"));

    let rank = (1.0 - confidence) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let var = if lo == hi {
        sorted[lo]
    } else {
        let weight = rank - lo as f64;
        sorted[lo] * (1.0 - weight) + sorted[hi] * weight
    };

    let tail: Vec<f64> = sorted.iter().copied().filter(|r| *r <= var).collect();
    // The minimum return is always <= var, so the tail is never empty.
    let cvar = mean(&tail);

    let low_sample = returns.len() < min_observations;
    if low_sample {
        tracing::warn!(
            observations = returns.len(),
            required = min_observations,
            "VaR/CVaR estimated from a low sample"
        );
    }

    Ok(TailRisk {
        var,
        cvar,
        low_sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatility_matches_hand_calculation() {
        // std of [0.01, -0.01, 0.01, -0.01] with ddof=1 is ~0.011547.
        let returns = [0.01, -0.01, 0.01, -0.01];
        let vol = volatility(&returns, 1).unwrap();
        assert!((vol - 0.011547005383792516).abs() < 1e-12);

        // Annualization scales by sqrt(periods).
        let vol_annual = volatility(&returns, 365).unwrap();
        assert!((vol_annual - vol * 365f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sharpe_is_undefined_for_constant_returns() {
        let returns = [0.01, 0.01, 0.01];
        assert_eq!(sharpe_ratio(&returns, 0.02, 365).unwrap(), None);
    }

    #[test]
    fn sharpe_matches_definition() {
        let returns = [0.02, -0.01, 0.03, 0.00];
        let sharpe = sharpe_ratio(&returns, 0.02, 252).unwrap().unwrap();
        let expected = (0.01 * 252.0 - 0.02) / volatility(&returns, 252).unwrap();
        assert!((sharpe - expected).abs() < 1e-12);
    }

    #[test]
    fn sortino_is_undefined_without_downside() {
        let returns = [0.01, 0.02, 0.005];
        assert_eq!(sortino_ratio(&returns, 0.0, 0.0, 365).unwrap(), None);
    }

    #[test]
    fn sortino_uses_only_downside_deviation() {
        let returns = [0.02, -0.01, 0.03, -0.02];
        let sortino = sortino_ratio(&returns, 0.0, 0.0, 252).unwrap().unwrap();
        let downside = ((0.01f64 * 0.01 + 0.02 * 0.02) / 2.0).sqrt() * 252f64.sqrt();
        let expected = (returns.iter().sum::<f64>() / 4.0 * 252.0) / downside;
        assert!((sortino - expected).abs() < 1e-12);
    }

    #[test]
    fn drawdown_of_increasing_series_is_zero() {
        let dd = max_drawdown(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(dd, 0.0);
    }

    #[test]
    fn drawdown_of_half_crash_is_minus_half() {
        let dd = max_drawdown(&[100.0, 50.0, 100.0]).unwrap();
        assert!((dd - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn calmar_is_undefined_without_drawdown() {
        assert_eq!(calmar_ratio(0.5, 0.0), None);
        let calmar = calmar_ratio(0.5, -0.25).unwrap();
        assert!((calmar - 2.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_returns_are_rejected() {
        let returns = [0.01, f64::NAN, 0.02];
        let err = volatility(&returns, 365).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput { index: 1, .. }));
    }

    #[test]
    fn total_return_rejects_non_finite_last_price() {
        let err = total_return(&[100.0, 105.0, f64::NAN]).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InvalidPrice { index: 2, .. }
        ));
    }

    #[test]
    fn tail_risk_flags_low_samples_but_still_computes() {
        let returns = [0.01, -0.03, 0.02, -0.01, 0.005];
        let estimate = tail_risk(&returns, 0.95, 20).unwrap();
        assert!(estimate.low_sample);
        assert!(estimate.var <= 0.0);
        assert!(estimate.cvar <= estimate.var);
    }

    #[test]
    fn tail_risk_quantile_interpolates() {
        // 21 evenly spaced returns from -0.10 to 0.10; the 5th percentile
        // sits at rank 0.05 * 20 = 1, i.e. exactly the second-smallest value.
        let returns: Vec<f64> = (0..21).map(|i| -0.10 + 0.01 * i as f64).collect();
        let estimate = tail_risk(&returns, 0.95, 20).unwrap();
        assert!(!estimate.low_sample);
        assert!((estimate.var - (-0.09)).abs() < 1e-12);
        assert!((estimate.cvar - (-0.095)).abs() < 1e-12);
    }

    #[test]
    fn rolling_volatility_has_leading_undefined_entries() {
        let returns = [0.01, -0.02, 0.015, 0.005, -0.01];
        let rolling = rolling_volatility(&returns, 3, 365).unwrap();
        assert_eq!(rolling.len(), 5);
        assert!(rolling[0].is_none());
        assert!(rolling[1].is_none());
        let expected = volatility(&returns[0..3], 365).unwrap();
        assert!((rolling[2].unwrap() - expected).abs() < 1e-12);
    }
}
