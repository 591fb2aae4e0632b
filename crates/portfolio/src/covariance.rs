use crate::error::PortfolioError;
use analytics::stats;
use core_types::ReturnSeries;
use correlation::CorrelationMatrix;

/// Annualized volatilities and the covariance matrix for a set of aligned
/// return series.
///
/// `sigma[i][j] = rho_ij * vol_i * vol_j`. An undefined correlation can only
/// arise here from a zero-variance side (alignment guarantees full overlap),
/// and the covariance against a constant series is genuinely zero, so those
/// cells collapse to 0.0 rather than staying undefined.
pub(crate) fn annualized_covariance(
    returns: &[ReturnSeries],
    periods_per_year: u32,
) -> Result<(Vec<f64>, CorrelationMatrix, Vec<Vec<f64>>), PortfolioError> {
    let mut vols = Vec::with_capacity(returns.len());
    for series in returns {
        vols.push(stats::volatility(&series.returns, periods_per_year)?);
    }

    let rho = correlation::matrix(returns)?;
    let n = returns.len();
    let mut sigma = vec![vec![0.0; n]; n];
    for i in 0..n {
        sigma[i][i] = vols[i] * vols[i];
        for j in (i + 1)..n {
            let cell = rho.values[i][j]
                .map(|r| r * vols[i] * vols[j])
                .unwrap_or(0.0);
            sigma[i][j] = cell;
            sigma[j][i] = cell;
        }
    }

    Ok((vols, rho, sigma))
}

/// Quadratic form `w' * sigma * w`, floored at zero against rounding noise.
pub(crate) fn portfolio_variance(weights: &[f64], sigma: &[Vec<f64>]) -> f64 {
    let mut variance = 0.0;
    for i in 0..weights.len() {
        for j in 0..weights.len() {
            variance += weights[i] * sigma[i][j] * weights[j];
        }
    }
    variance.max(0.0)
}
