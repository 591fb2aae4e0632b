//! # Analysis Engine
//!
//! The orchestration layer that ties the system together. `AnalysisService`
//! owns a `MarketDataSource` and an in-memory series store, and exposes every
//! operation the outer surfaces (CLI, servers) need: per-asset performance,
//! comparative summaries, technical indicator snapshots, correlation
//! analysis, portfolio valuation, weight optimization, and rebalancing
//! plans.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Orchestration:** This crate does no math of its own. It
//!   fetches, slices by timeframe, resolves configuration (annualization per
//!   asset class, risk parameters), and delegates to the Layer 1 crates.
//! - **Fail whole, not partial:** A multi-asset request either answers for
//!   every asset or returns the first error. No summary ever silently drops
//!   a symbol.
//! - **Parallel where it pays:** Independent per-asset reports fan out over
//!   `rayon`; everything else is cheap enough to stay sequential.

pub mod error;
pub mod service;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use error::EngineError;
pub use service::AnalysisService;
pub use summary::ComparativeSummary;
