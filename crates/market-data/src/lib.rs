//! # Market Data Access
//!
//! This crate is the boundary between the pure analytics core and the
//! outside world. The analytics crates never perform I/O; they receive
//! already-fetched, already-validated series through the types defined here.
//!
//! - `MarketDataSource`: the trait an external collaborator implements to
//!   supply price history. Retries and backoff are the collaborator's
//!   responsibility, not ours.
//! - `FixtureDataSource`: a file-backed source used by the CLI and tests.
//! - `SeriesStore`: an in-memory map of validated series, sliceable by
//!   timeframe.

pub mod error;
pub mod source;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use error::MarketDataError;
pub use source::{FixtureDataSource, MarketDataSource};
pub use store::SeriesStore;
