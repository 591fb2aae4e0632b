use crate::error::MarketDataError;
use chrono::{DateTime, Duration, Utc};
use core_types::{AssetSeries, Timeframe};
use std::collections::HashMap;

/// An in-memory collection of validated price series, keyed by symbol.
///
/// The store is a passive container: it holds whatever a `MarketDataSource`
/// produced and hands out timeframe-restricted views. It never fetches.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: HashMap<String, AssetSeries>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a series, replacing any previous history for the same symbol.
    pub fn insert(&mut self, series: AssetSeries) {
        self.series.insert(series.symbol.clone(), series);
    }

    pub fn get(&self, symbol: &str) -> Option<&AssetSeries> {
        self.series.get(symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Returns the history for `symbol` restricted to `timeframe`, measured
    /// back from the last observation in the series.
    pub fn history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<AssetSeries, MarketDataError> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;

        Ok(restrict(series, timeframe))
    }
}

/// Slices a series to the trailing window implied by `timeframe`.
pub fn restrict(series: &AssetSeries, timeframe: Timeframe) -> AssetSeries {
    match timeframe.as_days() {
        None => series.clone(),
        Some(days) => {
            // Anchor on the series' own last timestamp rather than wall-clock
            // time, so the same input always yields the same slice.
            let end: DateTime<Utc> = *series.timestamps.last().unwrap();
            series.tail_from(end - Duration::days(days))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn daily_series(symbol: &str, days: u32, start_price: f64) -> AssetSeries {
        let timestamps = (1..=days)
            .map(|d| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap())
            .collect();
        let prices = (0..days).map(|d| start_price + d as f64).collect();
        AssetSeries::new(symbol, timestamps, prices).unwrap()
    }

    #[test]
    fn history_for_unknown_symbol_fails() {
        let store = SeriesStore::new();
        let err = store.history("BTC", Timeframe::ThirtyDays).unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownSymbol { .. }));
    }

    #[test]
    fn history_restricts_to_trailing_window() {
        let mut store = SeriesStore::new();
        store.insert(daily_series("BTC", 30, 100.0));

        let week = store.history("BTC", Timeframe::SevenDays).unwrap();
        // Last observation is day 30; a 7-day window keeps days 23..=30.
        assert_eq!(week.len(), 8);
        assert_eq!(week.last_price(), 129.0);

        let full = store.history("BTC", Timeframe::Max).unwrap();
        assert_eq!(full.len(), 30);
    }
}
