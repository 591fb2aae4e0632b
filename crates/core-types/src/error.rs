use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Series for '{symbol}' is empty")]
    EmptySeries { symbol: String },

    #[error("Series for '{symbol}' has {timestamps} timestamps but {prices} prices")]
    LengthMismatch {
        symbol: String,
        timestamps: usize,
        prices: usize,
    },

    #[error("Timestamps for '{symbol}' are not strictly increasing at index {index}")]
    NonMonotonicTimestamps { symbol: String, index: usize },

    #[error("Portfolio contains more than one position for '{symbol}'")]
    DuplicatePosition { symbol: String },

    #[error("Invalid position for '{symbol}': {reason}")]
    InvalidPosition { symbol: String, reason: String },
}
