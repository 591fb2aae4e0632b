use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data for '{context}': need at least {needed} points, got {got}")]
    InsufficientData {
        context: String,
        needed: usize,
        got: usize,
    },

    #[error("Invalid price {price} for '{symbol}' at index {index}")]
    InvalidPrice {
        symbol: String,
        index: usize,
        price: f64,
    },

    #[error("Series overlap too small: only {got} common timestamps, need at least {needed}")]
    InsufficientOverlap { got: usize, needed: usize },

    #[error("Non-finite return for '{context}' at index {index}")]
    InvalidInput { context: String, index: usize },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}
