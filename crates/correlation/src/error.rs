use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Duplicate symbol '{symbol}' in correlation matrix input")]
    DuplicateSymbol { symbol: String },
}
