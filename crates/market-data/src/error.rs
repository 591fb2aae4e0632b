use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No price history available for symbol '{symbol}'")]
    UnknownSymbol { symbol: String },

    #[error("Data source unavailable: {reason}")]
    DataSourceUnavailable { reason: String },

    #[error("Rejected invalid series from data source: {0}")]
    InvalidSeries(#[from] core_types::CoreError),
}
