use crate::error::MarketDataError;
use chrono::{DateTime, Utc};
use core_types::AssetSeries;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// The external collaborator that supplies historical prices.
///
/// Implementations own all I/O concerns (HTTP clients, caching, retries,
/// backoff). The analytics core only ever sees the validated result.
pub trait MarketDataSource: Send + Sync {
    /// Fetches the price history for `symbol` between `start` and `end`
    /// (inclusive).
    fn fetch_price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AssetSeries, MarketDataError>;
}

/// On-disk shape of a fixture file: a map of symbol to price points.
#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(flatten)]
    series: HashMap<String, Vec<FixturePoint>>,
}

#[derive(Debug, Deserialize)]
struct FixturePoint {
    timestamp: DateTime<Utc>,
    price: f64,
}

/// A `MarketDataSource` backed by a JSON file of pre-fetched prices.
///
/// This is what the CLI uses and what integration tests build on; it stands
/// in for the live data-collection service that the deployed system talks to.
#[derive(Debug)]
pub struct FixtureDataSource {
    series: HashMap<String, AssetSeries>,
}

impl FixtureDataSource {
    /// Loads and validates all series from a fixture file.
    pub fn from_file(path: &Path) -> Result<Self, MarketDataError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MarketDataError::DataSourceUnavailable {
                reason: format!("could not read '{}': {}", path.display(), e),
            }
        })?;
        let parsed: FixtureFile =
            serde_json::from_str(&raw).map_err(|e| MarketDataError::DataSourceUnavailable {
                reason: format!("could not parse '{}': {}", path.display(), e),
            })?;

        let mut series = HashMap::new();
        for (symbol, points) in parsed.series {
            let timestamps = points.iter().map(|p| p.timestamp).collect();
            let prices = points.iter().map(|p| p.price).collect();
            let validated = AssetSeries::new(symbol.clone(), timestamps, prices)?;
            tracing::debug!(symbol = %symbol, points = validated.len(), "loaded fixture series");
            series.insert(symbol, validated);
        }

        Ok(Self { series })
    }

    /// Builds a source directly from validated series. Intended for tests.
    pub fn from_series(list: Vec<AssetSeries>) -> Self {
        let series = list.into_iter().map(|s| (s.symbol.clone(), s)).collect();
        Self { series }
    }
}

impl MarketDataSource for FixtureDataSource {
    fn fetch_price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AssetSeries, MarketDataError> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;

        let windowed = series.tail_from(start);
        let until = windowed.timestamps.partition_point(|t| *t <= end);
        AssetSeries::new(
            symbol,
            windowed.timestamps[..until].to_vec(),
            windowed.prices[..until].to_vec(),
        )
        .map_err(MarketDataError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn fetch_windows_by_start_and_end() {
        let series = AssetSeries::new(
            "ETH",
            vec![ts(1), ts(2), ts(3), ts(4), ts(5)],
            vec![2000.0, 2100.0, 2050.0, 2200.0, 2150.0],
        )
        .unwrap();
        let source = FixtureDataSource::from_series(vec![series]);

        let fetched = source.fetch_price_history("ETH", ts(2), ts(4)).unwrap();
        assert_eq!(fetched.prices, vec![2100.0, 2050.0, 2200.0]);
    }

    #[test]
    fn fetch_unknown_symbol_fails() {
        let source = FixtureDataSource::from_series(vec![]);
        let err = source
            .fetch_price_history("BTC", ts(1), ts(5))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownSymbol { .. }));
    }
}
