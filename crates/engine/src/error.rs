use thiserror::Error;

/// The error type surfaced by [`crate::AnalysisService`].
///
/// Every variant wraps the specific error of the layer that failed, so a
/// caller can always tell a data problem from a math problem.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    MarketData(#[from] market_data::MarketDataError),

    #[error(transparent)]
    Analytics(#[from] analytics::AnalyticsError),

    #[error(transparent)]
    Correlation(#[from] correlation::CorrelationError),

    #[error(transparent)]
    Portfolio(#[from] portfolio::PortfolioError),
}
