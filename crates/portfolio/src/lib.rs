//! # Portfolio Analyzer
//!
//! Valuation, risk analysis, weight optimization, and rebalancing for
//! multi-asset portfolios.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure computation over inputs the caller fetched.
//!   Portfolios are built per request and never persisted here.
//! - **Exact money, float statistics:** Position quantities, cost basis, and
//!   every market value are `Decimal`; return and risk statistics convert to
//!   `f64` at the analytics seam.
//! - **No partial aggregates:** A report either covers every position or the
//!   whole request fails (for example on a missing price history).
//! - **Co-movement matters:** Portfolio volatility is the covariance
//!   composition `w' * Sigma * w` built from the correlation matrix, so a
//!   hedged book reports low risk even when its legs are individually wild.
//!
//! ## Public API
//!
//! - `PortfolioAnalyzer::analyze`: the full [`PortfolioReport`].
//! - `optimize`: projected-gradient weight search (`MaxSharpe` or
//!   `MinVariance`) under per-asset bounds.
//! - `rebalance`: materiality-filtered trades from current to target weights.

pub mod analyzer;
mod covariance;
pub mod error;
pub mod optimizer;
pub mod rebalance;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use analyzer::PortfolioAnalyzer;
pub use error::PortfolioError;
pub use optimizer::{AssetWeight, Constraints, Objective, optimize};
pub use rebalance::{TradeRecommendation, TradeSide, rebalance};
pub use report::{PortfolioReport, PositionReport};
