//! # Analytics Engine
//!
//! This crate provides the numerical heart of the system: deriving returns
//! from price series and computing performance and risk statistics from them.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems and depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function is a deterministic mapping
//!   from already-fetched input to output. There is no shared mutable state,
//!   no I/O, and no silent inference: annualization constants and risk-free
//!   rates are always explicit parameters.
//! - **Undefined is not zero:** Quantities that are mathematically undefined
//!   (a Sharpe ratio with zero volatility, a Sortino ratio with no downside)
//!   are reported as `None`, never coerced to `0.0` and never an error.
//!
//! ## Public API
//!
//! - `returns`: simple/log return derivation and timestamp alignment.
//! - `stats`: volatility, Sharpe, Sortino, drawdown, Calmar, VaR/CVaR.
//! - `metrics`: the `PerformanceMetrics` report composed from the above.
//! - `indicators`: SMA/EMA/RSI/MACD/Bollinger and the `TechnicalSnapshot`.
//! - `AnalyticsError`: the specific error types returned by this crate.

pub mod error;
pub mod indicators;
pub mod metrics;
pub mod returns;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use indicators::{IndicatorParams, Momentum, TechnicalSnapshot, Trend, technical_snapshot};
pub use metrics::{MetricParams, MetricWarning, PerformanceMetrics, performance_metrics};
pub use returns::{align, compute_returns};
