use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use core_types::{AssetSeries, ReturnKind, ReturnSeries};
use std::collections::HashMap;

/// Derives a return series from a price series.
///
/// Simple returns are `p_t / p_{t-1} - 1`; log returns are
/// `ln(p_t / p_{t-1})`. A series needs at least two prices, and log returns
/// additionally require every price to be strictly positive. Simple returns
/// reject non-positive prices as well: a zero denominator would produce an
/// infinite return and poison every statistic downstream.
pub fn compute_returns(
    series: &AssetSeries,
    kind: ReturnKind,
) -> Result<ReturnSeries, AnalyticsError> {
    if series.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            context: series.symbol.clone(),
            needed: 2,
            got: series.len(),
        });
    }
    for (index, price) in series.prices.iter().enumerate() {
        if !price.is_finite() || *price <= 0.0 {
            return Err(AnalyticsError::InvalidPrice {
                symbol: series.symbol.clone(),
                index,
                price: *price,
            });
        }
    }

    let returns = series
        .prices
        .windows(2)
        .map(|w| match kind {
            ReturnKind::Simple => w[1] / w[0] - 1.0,
            ReturnKind::Log => (w[1] / w[0]).ln(),
        })
        .collect();

    Ok(ReturnSeries {
        symbol: series.symbol.clone(),
        timestamps: series.timestamps[1..].to_vec(),
        returns,
        kind,
    })
}

/// Restricts a list of series to their common timestamps (inner join).
///
/// The output preserves input order and every returned series shares the
/// same timestamp index. Fails if fewer than two timestamps survive the
/// intersection, since no return can be computed from the result.
pub fn align(series_list: &[AssetSeries]) -> Result<Vec<AssetSeries>, AnalyticsError> {
    if series_list.is_empty() {
        return Ok(Vec::new());
    }

    // Count how many series each timestamp appears in. Timestamps are unique
    // within a series, so a count equal to the series count means "in all".
    let mut seen: HashMap<DateTime<Utc>, usize> = HashMap::new();
    for series in series_list {
        for t in &series.timestamps {
            *seen.entry(*t).or_insert(0) += 1;
        }
    }

    let mut common: Vec<DateTime<Utc>> = seen
        .into_iter()
        .filter(|(_, count)| *count == series_list.len())
        .map(|(t, _)| t)
        .collect();
    common.sort_unstable();

    if common.len() < 2 {
        return Err(AnalyticsError::InsufficientOverlap {
            got: common.len(),
            needed: 2,
        });
    }

    let aligned = series_list
        .iter()
        .map(|series| {
            let by_timestamp: HashMap<&DateTime<Utc>, f64> = series
                .timestamps
                .iter()
                .zip(series.prices.iter().copied())
                .collect();
            let prices = common.iter().map(|t| by_timestamp[t]).collect();
            // Re-validation cannot fail: common is sorted, unique, and len >= 2.
            AssetSeries::new(series.symbol.clone(), common.clone(), prices)
                .expect("aligned series preserves invariants")
        })
        .collect();

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn series(symbol: &str, days: &[u32], prices: &[f64]) -> AssetSeries {
        AssetSeries::new(
            symbol,
            days.iter().map(|d| ts(*d)).collect(),
            prices.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn simple_returns_match_hand_calculation() {
        let s = series("A", &[1, 2, 3], &[100.0, 110.0, 99.0]);
        let r = compute_returns(&s, ReturnKind::Simple).unwrap();
        assert_eq!(r.len(), 2);
        assert!((r.returns[0] - 0.10).abs() < 1e-12);
        assert!((r.returns[1] - (-0.10)).abs() < 1e-12);
        assert_eq!(r.timestamps, vec![ts(2), ts(3)]);
    }

    #[test]
    fn returns_round_trip_reconstructs_prices() {
        let s = series("A", &[1, 2, 3, 4, 5], &[100.0, 104.2, 99.8, 101.3, 108.9]);

        let simple = compute_returns(&s, ReturnKind::Simple).unwrap();
        let mut price = s.prices[0];
        for (i, r) in simple.returns.iter().enumerate() {
            price *= 1.0 + r;
            assert!((price - s.prices[i + 1]).abs() < 1e-9);
        }

        let log = compute_returns(&s, ReturnKind::Log).unwrap();
        let mut price = s.prices[0];
        for (i, r) in log.returns.iter().enumerate() {
            price *= r.exp();
            assert!((price - s.prices[i + 1]).abs() < 1e-9);
        }
    }

    #[test]
    fn single_point_series_is_insufficient() {
        let s = series("A", &[1], &[100.0]);
        let err = compute_returns(&s, ReturnKind::Simple).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData { needed: 2, got: 1, .. }
        ));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let s = series("A", &[1, 2, 3], &[100.0, 0.0, 105.0]);
        let err = compute_returns(&s, ReturnKind::Log).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPrice { index: 1, .. }));

        let err = compute_returns(&s, ReturnKind::Simple).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPrice { index: 1, .. }));
    }

    #[test]
    fn align_takes_timestamp_intersection() {
        let a = series("A", &[1, 2, 3, 4], &[1.0, 2.0, 3.0, 4.0]);
        let b = series("B", &[2, 3, 4, 5], &[20.0, 30.0, 40.0, 50.0]);

        let aligned = align(&[a, b]).unwrap();
        assert_eq!(aligned[0].timestamps, vec![ts(2), ts(3), ts(4)]);
        assert_eq!(aligned[0].prices, vec![2.0, 3.0, 4.0]);
        assert_eq!(aligned[1].prices, vec![20.0, 30.0, 40.0]);
        // Input order preserved.
        assert_eq!(aligned[0].symbol, "A");
        assert_eq!(aligned[1].symbol, "B");
    }

    #[test]
    fn align_with_tiny_overlap_fails() {
        let a = series("A", &[1, 2], &[1.0, 2.0]);
        let b = series("B", &[2, 3], &[20.0, 30.0]);
        let err = align(&[a, b]).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientOverlap { got: 1, needed: 2 }
        ));
    }
}
