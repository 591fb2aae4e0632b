use chrono::{DateTime, Utc};
use core_types::ReturnSeries;

/// Pearson correlation between two return series over their timestamp
/// overlap.
///
/// `None` when fewer than two paired observations exist or when either
/// side has zero variance over the overlap: the coefficient is undefined
/// there, which callers must not confuse with a correlation of zero.
pub fn pairwise(a: &ReturnSeries, b: &ReturnSeries) -> Option<f64> {
    let (_, xs, ys) = join_on_timestamps(a, b);
    pearson(&xs, &ys)
}

/// Inner-joins two return series on their timestamps.
///
/// Timestamps within a series are strictly increasing, so a linear
/// two-pointer merge suffices.
pub(crate) fn join_on_timestamps(
    a: &ReturnSeries,
    b: &ReturnSeries,
) -> (Vec<DateTime<Utc>>, Vec<f64>, Vec<f64>) {
    let mut timestamps = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a.timestamps[i].cmp(&b.timestamps[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                timestamps.push(a.timestamps[i]);
                xs.push(a.returns[i]);
                ys.push(b.returns[j]);
                i += 1;
                j += 1;
            }
        }
    }

    (timestamps, xs, ys)
}

/// Two-pass Pearson coefficient over paired slices.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    if x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for k in 0..x.len() {
        let dx = x[k] - mean_x;
        let dy = y[k] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{AssetSeries, ReturnKind};

    fn returns_of(symbol: &str, prices: &[f64]) -> ReturnSeries {
        use chrono::TimeZone;
        let timestamps = (0..prices.len())
            .map(|i| {
                chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64)
            })
            .collect();
        let series = AssetSeries::new(symbol, timestamps, prices.to_vec()).unwrap();
        analytics_compute(&series)
    }

    // Local simple-return derivation to keep this crate's tests free of a
    // dev-dependency cycle with the analytics crate.
    fn analytics_compute(series: &AssetSeries) -> ReturnSeries {
        ReturnSeries {
            symbol: series.symbol.clone(),
            timestamps: series.timestamps[1..].to_vec(),
            returns: series.prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect(),
            kind: ReturnKind::Simple,
        }
    }

    #[test]
    fn self_correlation_is_one() {
        let a = returns_of("A", &[100.0, 105.0, 98.0, 104.0, 110.0]);
        let corr = pairwise(&a, &a).unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exactly_inverse_moves_correlate_to_minus_one() {
        // B's return at every step is the exact negation of A's, so the
        // coefficient is -1 up to rounding.
        let mut a = returns_of("A", &[100.0, 105.0, 98.0, 104.0]);
        let mut b = a.clone();
        b.symbol = "B".to_string();
        a.returns = vec![0.10, -0.05, 0.20];
        b.returns = vec![-0.10, 0.05, -0.20];

        let corr = pairwise(&a, &b).unwrap();
        assert!((corr - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn steady_opposite_trends_have_degenerate_correlation() {
        // A compounds +10% each step, B -10% each step. Both return series
        // are constant, so the coefficient is undefined rather than -1.
        let a = returns_of("A", &[100.0, 110.0, 121.0]);
        let b = returns_of("B", &[50.0, 45.0, 40.5]);
        assert_eq!(pairwise(&a, &b), None);
    }

    #[test]
    fn constant_series_is_undefined_not_zero() {
        let a = returns_of("A", &[100.0, 100.0, 100.0, 100.0]);
        let b = returns_of("B", &[50.0, 55.0, 52.0, 58.0]);
        assert_eq!(pairwise(&a, &b), None);
    }

    #[test]
    fn single_overlapping_point_is_undefined() {
        let mut a = returns_of("A", &[100.0, 105.0, 98.0]);
        let b = returns_of("B", &[50.0, 55.0, 52.0]);
        // Shift A's timestamps so only one coincides with B's.
        a.timestamps[0] = b.timestamps[1];
        a.timestamps[1] = b.timestamps[1] + chrono::Duration::hours(1);
        a.timestamps[2] = b.timestamps[1] + chrono::Duration::hours(2);
        assert_eq!(pairwise(&a, &b), None);
    }

    #[test]
    fn join_skips_unmatched_timestamps() {
        let a = returns_of("A", &[100.0, 105.0, 98.0, 104.0]);
        let mut b = returns_of("B", &[50.0, 55.0, 52.0, 58.0]);
        b.timestamps[1] = b.timestamps[1] + chrono::Duration::hours(6);

        let (timestamps, xs, ys) = join_on_timestamps(&a, &b);
        assert_eq!(timestamps.len(), 2);
        assert_eq!(xs.len(), 2);
        assert_eq!(ys.len(), 2);
    }
}
