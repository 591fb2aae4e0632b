//! # Correlation Engine
//!
//! Pairwise Pearson correlation, full correlation matrices, and
//! rolling-window correlation over return series.
//!
//! A correlation can be *undefined*: when two series share fewer than two
//! observations, or when either has zero variance, the coefficient does not
//! exist mathematically. This crate reports that state as `None`, never as
//! `0.0` (which would claim "uncorrelated") and never as an error (the input
//! is valid, the quantity just is not defined for it).
//!
//! All formulas are two-pass (mean first, then deviations) to avoid
//! catastrophic cancellation when series with very different magnitudes are
//! compared.

pub mod error;
pub mod matrix;
pub mod pairwise;
pub mod rolling;

// Re-export the key components to create a clean, public-facing API.
pub use error::CorrelationError;
pub use matrix::{CorrelationMatrix, StrongPair, matrix};
pub use pairwise::pairwise;
pub use rolling::{RollingCorrelation, rolling};
