use crate::covariance::{annualized_covariance, portfolio_variance};
use crate::error::PortfolioError;
use analytics::{MetricParams, align, compute_returns, stats};
use core_types::{AssetSeries, ReturnKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LEARNING_RATE: f64 = 0.01;
const ITERATIONS: usize = 1000;

/// What the weight search maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Maximize (expected return - risk-free rate) / volatility.
    MaxSharpe,
    /// Minimize portfolio variance outright.
    MinVariance,
}

/// Per-asset weight bounds. Weights always sum to 1 on top of these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub min_weight: f64,
    pub max_weight: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_weight: 0.0,
            max_weight: 1.0,
        }
    }
}

/// One asset's share of the optimized allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetWeight {
    pub symbol: String,
    pub weight: f64,
}

/// Searches for portfolio weights by projected gradient ascent.
///
/// Expected returns and the covariance matrix are estimated from the aligned
/// histories; each step moves along the objective's gradient and projects
/// back onto the constraint set (per-asset bounds, weights summing to 1).
pub fn optimize(
    symbols: &[String],
    history: &HashMap<String, AssetSeries>,
    objective: Objective,
    constraints: &Constraints,
    params: &MetricParams,
) -> Result<Vec<AssetWeight>, PortfolioError> {
    if symbols.is_empty() {
        return Err(PortfolioError::EmptyPortfolio);
    }
    validate_constraints(symbols.len(), constraints)?;

    let mut series_list = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let series = history
            .get(symbol)
            .ok_or_else(|| PortfolioError::MissingPriceData {
                symbol: symbol.clone(),
            })?;
        series_list.push(series.clone());
    }

    let aligned = align(&series_list)?;
    let returns = aligned
        .iter()
        .map(|s| compute_returns(s, ReturnKind::Simple))
        .collect::<Result<Vec<_>, _>>()?;

    let mut expected = Vec::with_capacity(returns.len());
    for series in &returns {
        expected.push(stats::annualized_return(
            &series.returns,
            params.periods_per_year,
        )?);
    }
    let (_, _, sigma) = annualized_covariance(&returns, params.periods_per_year)?;

    let n = symbols.len();
    let mut weights = vec![1.0 / n as f64; n];
    project(&mut weights, constraints);

    for _ in 0..ITERATIONS {
        let gradient = match objective {
            Objective::MinVariance => {
                // d/dw (w' Sigma w) = 2 Sigma w; descend.
                let sw = mat_vec(&sigma, &weights);
                sw.iter().map(|v| -2.0 * v).collect::<Vec<f64>>()
            }
            Objective::MaxSharpe => {
                let variance = portfolio_variance(&weights, &sigma);
                let vol = variance.sqrt();
                if vol < 1e-10 {
                    break;
                }
                let excess = dot(&weights, &expected) - params.risk_free_rate;
                let sw = mat_vec(&sigma, &weights);
                (0..n)
                    .map(|i| (expected[i] * vol - excess * sw[i] / vol) / variance)
                    .collect()
            }
        };

        for i in 0..n {
            weights[i] += LEARNING_RATE * gradient[i];
        }
        project(&mut weights, constraints);
    }

    tracing::debug!(?objective, assets = n, "weight search finished");

    Ok(symbols
        .iter()
        .zip(weights)
        .map(|(symbol, weight)| AssetWeight {
            symbol: symbol.clone(),
            weight,
        })
        .collect())
}

fn validate_constraints(n: usize, constraints: &Constraints) -> Result<(), PortfolioError> {
    let Constraints {
        min_weight,
        max_weight,
    } = *constraints;

    if !(min_weight.is_finite() && max_weight.is_finite()) {
        return Err(PortfolioError::InfeasibleConstraints {
            reason: "weight bounds must be finite".to_string(),
        });
    }
    if min_weight < 0.0 || max_weight > 1.0 || min_weight > max_weight {
        return Err(PortfolioError::InfeasibleConstraints {
            reason: format!(
                "bounds must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                min_weight, max_weight
            ),
        });
    }
    // Weights must be able to sum to exactly 1 within the bounds.
    let n = n as f64;
    if n * min_weight > 1.0 || n * max_weight < 1.0 {
        return Err(PortfolioError::InfeasibleConstraints {
            reason: format!(
                "{} assets cannot sum to 1 with bounds [{}, {}]",
                n, min_weight, max_weight
            ),
        });
    }
    Ok(())
}

/// Projects weights onto the feasible set: clamp to the per-asset bounds,
/// then spread the remaining mass over the assets that are not pinned at a
/// bound until the sum reaches 1.
fn project(weights: &mut [f64], constraints: &Constraints) {
    for w in weights.iter_mut() {
        *w = w.clamp(constraints.min_weight, constraints.max_weight);
    }

    for _ in 0..64 {
        let sum: f64 = weights.iter().sum();
        let diff = 1.0 - sum;
        if diff.abs() < 1e-12 {
            break;
        }
        let free: Vec<usize> = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| {
                if diff > 0.0 {
                    **w < constraints.max_weight
                } else {
                    **w > constraints.min_weight
                }
            })
            .map(|(i, _)| i)
            .collect();
        if free.is_empty() {
            break;
        }
        let step = diff / free.len() as f64;
        for i in free {
            weights[i] =
                (weights[i] + step).clamp(constraints.min_weight, constraints.max_weight);
        }
    }
}

fn mat_vec(matrix: &[Vec<f64>], vector: &[f64]) -> Vec<f64> {
    matrix.iter().map(|row| dot(row, vector)).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

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

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn min_variance_splits_a_perfect_hedge_evenly() {
        // B's moves mirror A's with equal magnitude, so the minimum-variance
        // allocation is an even split that nearly cancels all risk.
        let mut history = HashMap::new();
        history.insert(
            "A".to_string(),
            series("A", &[100.0, 110.0, 99.0, 108.9]),
        );
        history.insert(
            "B".to_string(),
            series("B", &[100.0, 90.0, 99.0, 89.1]),
        );

        let weights = optimize(
            &symbols(&["A", "B"]),
            &history,
            Objective::MinVariance,
            &Constraints::default(),
            &params(),
        )
        .unwrap();

        let sum: f64 = weights.iter().map(|w| w.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for w in &weights {
            assert!((w.weight - 0.5).abs() < 0.01, "{}: {}", w.symbol, w.weight);
        }
    }

    #[test]
    fn max_sharpe_respects_the_upper_bound() {
        // A trends up strongly; unconstrained max-Sharpe would go all-in.
        let mut history = HashMap::new();
        history.insert(
            "A".to_string(),
            series("A", &[100.0, 103.0, 106.0, 110.0, 113.0, 117.0]),
        );
        history.insert(
            "B".to_string(),
            series("B", &[100.0, 99.0, 101.0, 100.0, 102.0, 101.0]),
        );

        let constraints = Constraints {
            min_weight: 0.0,
            max_weight: 0.6,
        };
        let weights = optimize(
            &symbols(&["A", "B"]),
            &history,
            Objective::MaxSharpe,
            &constraints,
            &params(),
        )
        .unwrap();

        let sum: f64 = weights.iter().map(|w| w.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for w in &weights {
            assert!(w.weight <= 0.6 + 1e-9);
            assert!(w.weight >= -1e-9);
        }
        // The trending asset should sit at its cap.
        assert!((weights[0].weight - 0.6).abs() < 1e-6);
    }

    #[test]
    fn infeasible_bounds_are_rejected() {
        let mut history = HashMap::new();
        for name in ["A", "B", "C"] {
            history.insert(name.to_string(), series(name, &[100.0, 101.0, 102.0]));
        }

        let constraints = Constraints {
            min_weight: 0.5,
            max_weight: 1.0,
        };
        let err = optimize(
            &symbols(&["A", "B", "C"]),
            &history,
            Objective::MinVariance,
            &constraints,
            &params(),
        )
        .unwrap_err();
        assert!(matches!(err, PortfolioError::InfeasibleConstraints { .. }));
    }

    #[test]
    fn missing_history_is_reported_with_the_symbol() {
        let mut history = HashMap::new();
        history.insert("A".to_string(), series("A", &[100.0, 101.0, 102.0]));

        let err = optimize(
            &symbols(&["A", "B"]),
            &history,
            Objective::MinVariance,
            &Constraints::default(),
            &params(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::MissingPriceData { symbol } if symbol == "B"
        ));
    }

    #[test]
    fn single_asset_gets_full_weight() {
        let mut history = HashMap::new();
        history.insert("A".to_string(), series("A", &[100.0, 101.0, 99.0, 102.0]));

        let weights = optimize(
            &symbols(&["A"]),
            &history,
            Objective::MaxSharpe,
            &Constraints::default(),
            &params(),
        )
        .unwrap();
        assert_eq!(weights.len(), 1);
        assert!((weights[0].weight - 1.0).abs() < 1e-12);
    }
}
