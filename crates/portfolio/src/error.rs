use analytics::AnalyticsError;
use correlation::CorrelationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Portfolio has no positions")]
    EmptyPortfolio,

    #[error("No price history available for '{symbol}'")]
    MissingPriceData { symbol: String },

    #[error("Portfolio has zero market value; weights are undefined")]
    ZeroPortfolioValue,

    #[error("Price {price} for '{symbol}' is not representable as a decimal")]
    NonRepresentablePrice { symbol: String, price: f64 },

    #[error("Invalid price for '{symbol}': must be positive")]
    InvalidPrice { symbol: String },

    #[error("Invalid weight for '{symbol}': {reason}")]
    InvalidWeight { symbol: String, reason: String },

    #[error("Infeasible constraints: {reason}")]
    InfeasibleConstraints { reason: String },

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}
