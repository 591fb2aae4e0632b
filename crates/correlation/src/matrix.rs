use crate::error::CorrelationError;
use crate::pairwise::pairwise;
use core_types::ReturnSeries;
use serde::{Deserialize, Serialize};

/// A symmetric correlation matrix over a set of assets.
///
/// Symbol order follows the input order without sorting, so callers can rely on
/// stable row/column positions. `None` cells are mathematically undefined
/// (zero variance or insufficient overlap), not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// An asset pair whose correlation magnitude crossed a reporting threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrongPair {
    pub symbol_a: String,
    pub symbol_b: String,
    pub value: f64,
}

impl CorrelationMatrix {
    /// Looks up a cell by symbol pair.
    ///
    /// The outer `None` means a symbol is not in the matrix at all; the inner
    /// `None` means both symbols are present but their correlation is
    /// mathematically undefined.
    pub fn get(&self, a: &str, b: &str) -> Option<Option<f64>> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// Mean of the defined cells above the diagonal, or `None` if every
    /// off-diagonal cell is undefined.
    pub fn mean_off_diagonal(&self) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 0..self.symbols.len() {
            for j in (i + 1)..self.symbols.len() {
                if let Some(value) = self.values[i][j] {
                    sum += value;
                    count += 1;
                }
            }
        }
        (count > 0).then(|| sum / count as f64)
    }

    /// All pairs with `|value| > threshold`, in row-major order.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<StrongPair> {
        let mut pairs = Vec::new();
        for i in 0..self.symbols.len() {
            for j in (i + 1)..self.symbols.len() {
                if let Some(value) = self.values[i][j] {
                    if value.abs() > threshold {
                        pairs.push(StrongPair {
                            symbol_a: self.symbols[i].clone(),
                            symbol_b: self.symbols[j].clone(),
                            value,
                        });
                    }
                }
            }
        }
        pairs
    }
}

/// Computes the full correlation matrix for a list of return series.
///
/// Each unordered pair is computed once and mirrored; the diagonal is fixed
/// to 1.0. Duplicate symbols are rejected: a matrix with two identical row
/// labels would be ambiguous to every consumer.
pub fn matrix(series_list: &[ReturnSeries]) -> Result<CorrelationMatrix, CorrelationError> {
    let mut symbols = Vec::with_capacity(series_list.len());
    for series in series_list {
        if symbols.contains(&series.symbol) {
            return Err(CorrelationError::DuplicateSymbol {
                symbol: series.symbol.clone(),
            });
        }
        symbols.push(series.symbol.clone());
    }

    let n = series_list.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let cell = pairwise(&series_list[i], &series_list[j]);
            values[i][j] = cell;
            values[j][i] = cell;
        }
    }

    Ok(CorrelationMatrix { symbols, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{AssetSeries, ReturnKind};

    fn returns_of(symbol: &str, prices: &[f64]) -> ReturnSeries {
        let timestamps = (0..prices.len())
            .map(|i| {
                chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64)
            })
            .collect::<Vec<_>>();
        let series = AssetSeries::new(symbol, timestamps, prices.to_vec()).unwrap();
        ReturnSeries {
            symbol: series.symbol.clone(),
            timestamps: series.timestamps[1..].to_vec(),
            returns: series.prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect(),
            kind: ReturnKind::Simple,
        }
    }

    #[test]
    fn diagonal_is_one_and_matrix_is_symmetric() {
        let list = vec![
            returns_of("A", &[100.0, 105.0, 102.0, 110.0, 108.0]),
            returns_of("B", &[50.0, 52.5, 51.0, 55.0, 54.0]),
            returns_of("C", &[120.0, 115.0, 118.0, 110.0, 112.0]),
        ];
        let m = matrix(&list).unwrap();

        for i in 0..3 {
            assert_eq!(m.values[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(m.values[i][j], m.values[j][i]);
            }
        }
        // B tracks A exactly (B = A / 2), C moves against A.
        assert!(m.get("A", "B").unwrap().unwrap() > 0.99);
        assert!(m.get("A", "C").unwrap().unwrap() < 0.0);
    }

    #[test]
    fn symbol_order_follows_input_without_sorting() {
        let list = vec![
            returns_of("ZEC", &[10.0, 11.0, 10.5]),
            returns_of("AAVE", &[20.0, 19.0, 21.0]),
        ];
        let m = matrix(&list).unwrap();
        assert_eq!(m.symbols, vec!["ZEC".to_string(), "AAVE".to_string()]);
    }

    #[test]
    fn zero_variance_cell_is_undefined_but_diagonal_stays_one() {
        let list = vec![
            returns_of("FLAT", &[100.0, 100.0, 100.0, 100.0]),
            returns_of("B", &[50.0, 55.0, 52.0, 58.0]),
        ];
        let m = matrix(&list).unwrap();
        assert_eq!(m.get("FLAT", "B"), Some(None));
        assert_eq!(m.get("FLAT", "FLAT"), Some(Some(1.0)));
        assert_eq!(m.mean_off_diagonal(), None);
    }

    #[test]
    fn lookup_distinguishes_unknown_symbol_from_undefined_cell() {
        let list = vec![
            returns_of("FLAT", &[100.0, 100.0, 100.0, 100.0]),
            returns_of("B", &[50.0, 55.0, 52.0, 58.0]),
        ];
        let m = matrix(&list).unwrap();
        // Symbol missing from the matrix entirely.
        assert_eq!(m.get("DOGE", "B"), None);
        assert_eq!(m.get("B", "DOGE"), None);
        // Both symbols present, correlation undefined.
        assert_eq!(m.get("FLAT", "B"), Some(None));
    }

    #[test]
    fn duplicate_symbols_are_rejected() {
        let list = vec![
            returns_of("A", &[100.0, 105.0, 102.0]),
            returns_of("A", &[50.0, 52.5, 51.0]),
        ];
        assert!(matches!(
            matrix(&list),
            Err(CorrelationError::DuplicateSymbol { .. })
        ));
    }

    #[test]
    fn strong_pairs_reports_large_magnitudes() {
        let list = vec![
            returns_of("A", &[100.0, 105.0, 102.0, 110.0, 108.0]),
            returns_of("B", &[50.0, 52.5, 51.0, 55.0, 54.0]),
        ];
        let m = matrix(&list).unwrap();
        let pairs = m.strong_pairs(0.7);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].symbol_a, "A");
        assert_eq!(pairs[0].symbol_b, "B");
    }
}
